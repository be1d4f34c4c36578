//! `OpenWeatherMap` integration
//!
//! Current conditions and a daily forecast, projected into the flat shapes
//! served by `/api/weather` and `/api/forecast`.

use std::time::Duration;

use chrono::{DateTime, Local};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::WeatherConfig;
use crate::error::{ServiceError, TransportMessages};

/// Forecast entries are three hours apart, so one reading per day is every 8th
const READINGS_PER_DAY: usize = 8;
const MAX_READINGS: usize = 40;

const CURRENT_ERRORS: TransportMessages = TransportMessages {
    timeout: Some("Weather service timeout"),
    connect: Some("Unable to connect to weather service"),
    other: "Weather API error",
};

const FORECAST_ERRORS: TransportMessages = TransportMessages {
    timeout: None,
    connect: None,
    other: "Forecast API error",
};

/// Client for the `OpenWeatherMap` 2.5 API
#[derive(Debug)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    timeout: Duration,
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    pub pressure: i64,
    pub description: String,
    pub main_condition: String,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub clouds: i64,
    /// Metres, or `"N/A"` when the station does not report it
    pub visibility: serde_json::Value,
    /// Local `HH:MM:SS`
    pub sunrise: String,
    /// Local `HH:MM:SS`
    pub sunset: String,
    /// Local `YYYY-MM-DD HH:MM:SS` of the observation
    pub timestamp: String,
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Weekday name
    pub day: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub humidity: i64,
    pub wind_speed: f64,
    pub clouds: i64,
}

/// Forecast for a city
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    sys: OwmSys,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
    clouds: OwmClouds,
    visibility: Option<i64>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
    #[serde(default)]
    pressure: i64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    deg: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: i64,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
    clouds: OwmClouds,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    name: String,
}

impl WeatherClient {
    /// Create a weather client from configuration
    #[must_use]
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
            timeout: config.timeout,
        }
    }

    /// Whether an API key is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current conditions for `city`
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] worded for callers: unknown city, bad key,
    /// timeout, unreachable service or malformed response
    pub async fn current(&self, city: &str) -> Result<CurrentWeather, ServiceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("Weather API key not configured"))?;

        let url = format!("{}/weather", self.base_url);
        tracing::debug!(city, "fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", api_key.expose_secret()),
                ("units", "metric"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "weather request failed");
                CURRENT_ERRORS.classify(&e)
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(ServiceError::Rejected(format!("City \"{city}\" not found")));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(ServiceError::Rejected("Invalid API key".to_string()));
            }
            status => {
                tracing::warn!(status = %status, "weather API error");
                return Err(ServiceError::Rejected(
                    "Unable to fetch weather data".to_string(),
                ));
            }
        }

        let data: OwmCurrent = response
            .json()
            .await
            .map_err(|e| CURRENT_ERRORS.classify(&e))?;

        project_current(data).map_err(|e| CURRENT_ERRORS.other(e))
    }

    /// Fetch a daily forecast of `days` days (1 to 5) for `city`
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the key is missing or the forecast is unavailable
    pub async fn forecast(&self, city: &str, days: usize) -> Result<Forecast, ServiceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("Weather API key not configured"))?;

        let url = format!("{}/forecast", self.base_url);
        let count = (days * READINGS_PER_DAY).min(MAX_READINGS).to_string();
        tracing::debug!(city, days, "fetching forecast");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", api_key.expose_secret()),
                ("units", "metric"),
                ("cnt", count.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FORECAST_ERRORS.classify(&e))?;

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), "forecast API error");
            return Err(ServiceError::Rejected("Forecast not available".to_string()));
        }

        let data: OwmForecast = response
            .json()
            .await
            .map_err(|e| FORECAST_ERRORS.classify(&e))?;

        project_forecast(data, days).map_err(|e| FORECAST_ERRORS.other(e))
    }
}

fn project_current(data: OwmCurrent) -> Result<CurrentWeather, String> {
    let condition = data
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| "response has no weather conditions".to_string())?;

    Ok(CurrentWeather {
        city: data.name,
        country: data.sys.country,
        temperature: data.main.temp,
        feels_like: data.main.feels_like,
        temp_min: data.main.temp_min,
        temp_max: data.main.temp_max,
        humidity: data.main.humidity,
        pressure: data.main.pressure,
        description: condition.description,
        main_condition: condition.main,
        wind_speed: data.wind.speed,
        wind_deg: data.wind.deg.unwrap_or(0),
        clouds: data.clouds.all,
        visibility: data
            .visibility
            .map_or_else(|| serde_json::Value::from("N/A"), serde_json::Value::from),
        sunrise: format_local(data.sys.sunrise, "%H:%M:%S")?,
        sunset: format_local(data.sys.sunset, "%H:%M:%S")?,
        timestamp: format_local(data.dt, "%Y-%m-%d %H:%M:%S")?,
    })
}

fn project_forecast(data: OwmForecast, days: usize) -> Result<Forecast, String> {
    let days = data
        .list
        .into_iter()
        .step_by(READINGS_PER_DAY)
        .take(days)
        .map(|item| {
            let condition = item
                .weather
                .into_iter()
                .next()
                .ok_or_else(|| "forecast entry has no weather conditions".to_string())?;

            Ok(ForecastDay {
                date: format_local(item.dt, "%Y-%m-%d")?,
                day: format_local(item.dt, "%A")?,
                temperature: item.main.temp,
                temp_min: item.main.temp_min,
                temp_max: item.main.temp_max,
                description: condition.description,
                humidity: item.main.humidity,
                wind_speed: item.wind.speed,
                clouds: item.clouds.all,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(Forecast {
        city: data.city.name,
        days,
    })
}

/// Render a unix timestamp in the server's local timezone
pub(crate) fn format_local(timestamp: i64, format: &str) -> Result<String, String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&Local).format(format).to_string())
        .ok_or_else(|| format!("timestamp {timestamp} out of range"))
}
