//! News endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use super::{ApiError, ApiState, params};
use crate::integrations::{FinancialNewsPage, NewsPage, NewsQuery};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_COUNTRY: &str = "us";

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/news", get(general))
        .route("/financial-news", get(financial))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinancialNewsParams {
    pub query: Option<String>,
    pub page_size: Option<String>,
}

fn page_size(raw: Option<&str>) -> Result<u32, ApiError> {
    let n = params::integer(raw, DEFAULT_PAGE_SIZE, "Page size must be a number")?;
    params::within(n, 1..=100, "Page size must be between 1 and 100")
}

async fn general(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<NewsParams>,
) -> Result<Json<NewsPage>, ApiError> {
    let request = NewsQuery {
        page_size: page_size(query.page_size.as_deref())?,
        query: params::present(query.query),
        category: params::present(query.category),
        country: query.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
    };

    let page = state.news.general(&request).await.map_err(ApiError::Lookup)?;
    Ok(Json(page))
}

async fn financial(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FinancialNewsParams>,
) -> Result<Json<FinancialNewsPage>, ApiError> {
    let page_size = page_size(query.page_size.as_deref())?;
    let search = params::present(query.query);

    let page = state
        .news
        .financial(search.as_deref(), page_size)
        .await
        .map_err(ApiError::Lookup)?;

    Ok(Json(page))
}
