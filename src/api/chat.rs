//! Chat endpoints
//!
//! Messages are relayed to the conversational backend. The gateway only
//! tracks which backend conversation each caller session belongs to.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, params::present};
use crate::sessions::DEFAULT_SESSION;

/// Chat request; `user_input`/`conversation_id` are accepted as aliases
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_input: Option<String>,
    pub session_id: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
}

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/opportunity", post(chat))
        .route("/clear", post(clear))
        .with_state(state)
}

async fn chat(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let message = present(request.message)
        .or_else(|| present(request.user_input))
        .ok_or(ApiError::BadRequest("Message is required"))?;
    let session_id = present(request.session_id)
        .or_else(|| present(request.conversation_id))
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let conversation_id = state.sessions.conversation_id(&session_id).await;

    let reply = state
        .chat
        .query(&message, &conversation_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, session_id = %session_id, "chat backend failed");
            ApiError::BadGateway("Failed to get a response. Please try again.")
        })?;

    state
        .sessions
        .record(&session_id, reply.conversation_id)
        .await;

    Ok(Json(ChatResponse {
        response: reply.content,
        session_id,
    }))
}

/// Acknowledge a reset; history lives in the backend, so nothing is dropped
async fn clear(
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(
        session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION),
        "conversation cleared"
    );

    Ok(Json(ClearResponse {
        message: "Conversation cleared successfully",
    }))
}
