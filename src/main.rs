use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use concierge_gateway::{ApiServer, Config};

/// Concierge - chat and voice gateway for assistant front ends
#[derive(Parser)]
#[command(name = "concierge", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "CONCIERGE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "CONCIERGE_PORT")]
    port: Option<u16>,

    /// Directory holding the web UI
    #[arg(long, env = "CONCIERGE_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,concierge_gateway=info",
        1 => "info,concierge_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.static_dir.is_some() {
        config.server.static_dir = cli.static_dir;
    }
    tracing::debug!(?config, "loaded configuration");

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "starting concierge gateway"
    );
    log_services(&config);

    ApiServer::new(config)?.run().await?;
    Ok(())
}

/// Report which vendors have credentials
fn log_services(config: &Config) {
    let services = [
        ("weather", config.weather.api_key.is_some()),
        ("news", config.news.api_key.is_some()),
        ("chat backend", config.chat.password.is_some() && !config.chat.username.is_empty()),
        ("Azure STT", config.azure_speech.api_key.is_some()),
        ("ElevenLabs TTS", config.elevenlabs.api_key.is_some()),
    ];

    for (service, configured) in services {
        if configured {
            tracing::info!(service, "configured");
        } else {
            tracing::warn!(service, "not configured");
        }
    }
}
