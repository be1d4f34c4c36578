//! HTTP API server for Concierge gateway

mod chat;
mod error;
pub mod health;
mod news;
mod params;
mod voice;
mod weather;
mod wikipedia;

pub use error::ApiError;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::integrations::{NewsClient, RevinciClient, WeatherClient, WikipediaClient};
use crate::sessions::SessionStore;
use crate::voice::{SpeechToText, TextToSpeech};
use crate::Result;

/// Shared state for API handlers
#[derive(Debug)]
pub struct ApiState {
    pub weather: WeatherClient,
    pub wikipedia: WikipediaClient,
    pub news: NewsClient,
    /// Conversational backend behind `/api/chat`
    pub chat: RevinciClient,
    /// Session to backend conversation-id map
    pub sessions: SessionStore,
    pub stt: SpeechToText,
    pub tts: TextToSpeech,
}

impl ApiState {
    /// Build vendor clients from configuration
    ///
    /// Server settings in `config` are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            weather: WeatherClient::new(config.weather),
            wikipedia: WikipediaClient::new(config.wikipedia),
            news: NewsClient::new(config.news),
            chat: RevinciClient::new(config.chat)?,
            sessions: SessionStore::new(),
            stt: SpeechToText::new(config.azure_speech),
            tts: TextToSpeech::new(config.elevenlabs)?,
        })
    }
}

/// Build the API router (no static files)
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        .merge(chat::router(state.clone()))
        .merge(voice::router(state.clone()))
        .merge(weather::router(state.clone()))
        .merge(wikipedia::router(state.clone()))
        .merge(news::router(state.clone()));

    Router::new()
        .nest("/api", api)
        .merge(health::router(state))
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create a server from configuration
    ///
    /// # Errors
    ///
    /// Returns error if vendor clients cannot be built
    pub fn new(mut config: Config) -> Result<Self> {
        let server = std::mem::take(&mut config.server);
        Ok(Self {
            state: Arc::new(ApiState::new(config)?),
            host: server.host,
            port: server.port,
            static_dir: server.static_dir,
        })
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = router(self.state.clone());

        // Web UI
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server on {addr}: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
