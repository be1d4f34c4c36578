//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Service status response
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub weather_api: &'static str,
    pub wikipedia_api: &'static str,
    pub news_api: &'static str,
    pub azure_stt: &'static str,
    pub elevenlabs_tts: &'static str,
    pub chat_backend: &'static str,
    /// Sessions with a backend conversation
    pub active_sessions: usize,
}

/// Build health router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(status))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

const fn configured(flag: bool) -> &'static str {
    if flag { "configured" } else { "not configured" }
}

async fn status(State(state): State<Arc<ApiState>>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "healthy",
        service: "Conversational AI Assistant",
        weather_api: configured(state.weather.is_configured()),
        wikipedia_api: "available",
        news_api: configured(state.news.is_configured()),
        azure_stt: configured(state.stt.is_configured()),
        elevenlabs_tts: configured(state.tts.is_configured()),
        chat_backend: configured(state.chat.is_configured()),
        active_sessions: state.sessions.len().await,
    })
}
