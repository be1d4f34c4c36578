//! Weather endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, params};
use crate::integrations::{CurrentWeather, ForecastDay};

const DEFAULT_FORECAST_DAYS: i64 = 5;
const CITY_REQUIRED: &str = "City parameter is required";

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/weather", get(current))
        .route("/forecast", get(forecast))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub city: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub data: Vec<ForecastDay>,
    pub city: String,
}

async fn current(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<CurrentWeather>, ApiError> {
    let city = params::present(params.city).ok_or(ApiError::BadRequest(CITY_REQUIRED))?;

    let weather = state.weather.current(&city).await.map_err(ApiError::Lookup)?;
    Ok(Json(weather))
}

async fn forecast(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ForecastParams>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let days = params::integer(
        query.days.as_deref(),
        DEFAULT_FORECAST_DAYS,
        "Days parameter must be a number",
    )?;
    let city = params::present(query.city).ok_or(ApiError::BadRequest(CITY_REQUIRED))?;
    let days: usize = params::within(days, 1..=5, "Days must be between 1 and 5")?;

    let forecast = state
        .weather
        .forecast(&city, days)
        .await
        .map_err(ApiError::Lookup)?;

    Ok(Json(ForecastResponse {
        success: true,
        data: forecast.days,
        city: forecast.city,
    }))
}
