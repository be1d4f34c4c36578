//! Voice API endpoints for speech-to-text and text-to-speech

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, params::present};
use crate::voice::VoiceCatalog;

/// Largest accepted recording
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const AUDIO_REQUIRED: &str = "Audio file is required";

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/stt",
            post(transcribe).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/tts", post(synthesize))
        .route("/voices", get(voices))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub text: String,
}

/// Transcribe a multipart `audio` upload
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::BadRequest(AUDIO_REQUIRED))?;

    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest(AUDIO_REQUIRED))?
    {
        if field.name() == Some("audio") {
            let bytes = field.bytes().await.map_err(|e| {
                tracing::warn!(error = %e, "failed to read audio upload");
                ApiError::BadRequest(AUDIO_REQUIRED)
            })?;
            audio = Some(bytes);
            break;
        }
    }

    let audio = audio.ok_or(ApiError::BadRequest(AUDIO_REQUIRED))?;
    tracing::debug!(bytes = audio.len(), "received recording");

    let text = state.stt.transcribe(&audio).await.map_err(ApiError::Vendor)?;

    Ok(Json(TranscribeResponse {
        success: true,
        text,
    }))
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
}

/// Stream synthesized speech as MP3
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let text = present(request.text).ok_or(ApiError::BadRequest("Text is required"))?;
    let voice_id = present(request.voice_id);

    let audio = state
        .tts
        .stream(&text, voice_id.as_deref())
        .await
        .map_err(ApiError::Vendor)?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], Body::from_stream(audio)).into_response())
}

/// Voices grouped by gender
async fn voices(State(state): State<Arc<ApiState>>) -> Json<VoiceCatalog> {
    Json(state.tts.voice_catalog().await)
}
