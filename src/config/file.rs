//! TOML configuration file loading
//!
//! Supports `~/.config/concierge/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConciergeConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// `OpenWeatherMap` configuration
    #[serde(default)]
    pub weather: WeatherFileConfig,

    /// Wikipedia configuration
    #[serde(default)]
    pub wikipedia: WikipediaFileConfig,

    /// News API configuration
    #[serde(default)]
    pub news: NewsFileConfig,

    /// Remote conversational backend configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// `ElevenLabs` text-to-speech configuration
    #[serde(default)]
    pub elevenlabs: ElevenLabsFileConfig,

    /// Azure speech-to-text configuration
    #[serde(default)]
    pub azure_speech: AzureSpeechFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Bind address
    pub host: Option<String>,

    /// API server port
    pub port: Option<u16>,

    /// Directory holding the web UI
    pub static_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WikipediaFileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Upper bound on `pageSize` sent to the News API
    pub page_size: Option<u32>,
    #[serde(default)]
    pub financial: FinancialNewsFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialNewsFileConfig {
    pub enabled: Option<bool>,
    /// Source names; `.com` is appended when building the domain filter
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    pub url: Option<String>,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub keycloak_url: Option<String>,
    pub realm: Option<String>,
    pub client_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Verify the backend's TLS certificate
    pub tls_verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ElevenLabsFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_voice_id: Option<String>,
    pub model_id: Option<String>,
    /// Synthesis start and stall timeout
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AzureSpeechFileConfig {
    pub api_key: Option<String>,
    pub region: Option<String>,
    /// Full recognition endpoint, overriding the region-derived one
    pub endpoint: Option<String>,
    pub language: Option<String>,
    /// Path to the ffmpeg binary used for transcoding uploads
    pub ffmpeg: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConciergeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConciergeConfigFile {
    let Some(path) = config_file_path() else {
        return ConciergeConfigFile::default();
    };

    if !path.exists() {
        return ConciergeConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConciergeConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConciergeConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the contents are not valid TOML for this schema
pub fn parse_config(content: &str) -> crate::Result<ConciergeConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path
///
/// `CONCIERGE_CONFIG` wins; otherwise `~/.config/concierge/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CONCIERGE_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("concierge").join("config.toml"))
}
