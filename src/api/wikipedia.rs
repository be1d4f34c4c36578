//! Wikipedia endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use super::{ApiError, ApiState, params};
use crate::integrations::WikiSummary;

const DEFAULT_SENTENCES: i64 = 3;

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/wikipedia", get(summary))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct WikipediaParams {
    pub query: Option<String>,
    pub sentences: Option<String>,
}

async fn summary(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<WikipediaParams>,
) -> Result<Json<WikiSummary>, ApiError> {
    let sentences = params::integer(
        query.sentences.as_deref(),
        DEFAULT_SENTENCES,
        "Sentences parameter must be a number",
    )?;
    let search = params::present(query.query)
        .ok_or(ApiError::BadRequest("Query parameter is required"))?;
    let sentences: u8 = params::within(sentences, 1..=10, "Sentences must be between 1 and 10")?;

    let page = state
        .wikipedia
        .summary(&search, sentences)
        .await
        .map_err(ApiError::Lookup)?;

    Ok(Json(page))
}
