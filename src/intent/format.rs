//! Prompt context blocks built from lookup results

use chrono::DateTime;

use crate::error::ServiceError;
use crate::integrations::{Article, CurrentWeather, FinancialNewsPage, NewsPage, WikiSummary};

/// Articles listed in a news block
const MAX_ARTICLES: usize = 5;

/// Characters of an article description kept in a news block
const DESCRIPTION_CHARS: usize = 200;

/// Placeholder description the news client fills in for missing ones
const NO_DESCRIPTION: &str = "No description";

/// The news fields a prompt block needs, for either feed
#[derive(Debug, Clone, Copy)]
pub struct NewsDigest<'a> {
    pub articles: &'a [Article],
    pub total_results: u64,
    pub query: Option<&'a str>,
    /// `general` or `financial`
    pub kind: &'a str,
}

impl<'a> From<&'a NewsPage> for NewsDigest<'a> {
    fn from(page: &'a NewsPage) -> Self {
        Self {
            articles: &page.articles,
            total_results: page.total_results,
            query: page.query.as_deref(),
            kind: "general",
        }
    }
}

impl<'a> From<&'a FinancialNewsPage> for NewsDigest<'a> {
    fn from(page: &'a FinancialNewsPage) -> Self {
        Self {
            articles: &page.articles,
            total_results: page.total_results,
            query: page.query.as_deref(),
            kind: page.kind,
        }
    }
}

/// Weather block for a prompt
#[must_use]
pub fn format_weather(result: Result<&CurrentWeather, &ServiceError>) -> String {
    let w = match result {
        Ok(w) => w,
        Err(e) => return format!("[Weather information unavailable: {e}]"),
    };

    let visibility = match &w.visibility {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    format!(
        "\n[Real-time Weather Data for {city}, {country}]:\n\
         - Current Temperature: {temp}°C (Feels like: {feels}°C)\n\
         - Conditions: {description} ({main})\n\
         - Temperature Range: {min}°C to {max}°C\n\
         - Humidity: {humidity}%\n\
         - Wind: {wind} m/s\n\
         - Cloud Coverage: {clouds}%\n\
         - Visibility: {visibility}m\n\
         - Pressure: {pressure} hPa\n\
         - Sunrise: {sunrise} | Sunset: {sunset}\n\
         - Last Updated: {timestamp}\n\
         \n\
         Please provide a natural, helpful, and conversational response based on this weather data.\n",
        city = w.city,
        country = w.country,
        temp = w.temperature,
        feels = w.feels_like,
        description = capitalize(&w.description),
        main = w.main_condition,
        min = w.temp_min,
        max = w.temp_max,
        humidity = w.humidity,
        wind = w.wind_speed,
        clouds = w.clouds,
        pressure = w.pressure,
        sunrise = w.sunrise,
        sunset = w.sunset,
        timestamp = w.timestamp,
    )
}

/// Wikipedia block for a prompt
#[must_use]
pub fn format_wikipedia(result: Result<&WikiSummary, &ServiceError>) -> String {
    match result {
        Ok(page) => format!(
            "\n[Wikipedia Information]:\n\
             Title: {}\n\
             Summary: {}\n\
             Source: {}\n\
             \n\
             Please provide a natural, conversational response based on this Wikipedia information.\n",
            page.title, page.summary, page.url
        ),
        Err(e) => format!("[Wikipedia information unavailable: {e}]"),
    }
}

/// News block for a prompt, listing at most five articles
#[must_use]
pub fn format_news(result: Result<NewsDigest<'_>, &ServiceError>) -> String {
    let digest = match result {
        Ok(d) => d,
        Err(e) => return format!("[News information unavailable: {e}]"),
    };

    let mut out = String::from("\n[Latest News Articles");
    if let Some(query) = digest.query {
        out.push_str(&format!(" about '{query}'"));
    }
    out.push_str(&format!(" - {}]:\n\n", capitalize(digest.kind)));

    for (i, article) in digest.articles.iter().take(MAX_ARTICLES).enumerate() {
        out.push_str(&format!("{}. {}\n   Source: {}", i + 1, article.title, article.source));
        if let Some(date) = published_date(&article.published_at) {
            out.push_str(&format!(" | {date}"));
        }
        out.push('\n');

        if !article.description.is_empty() && article.description != NO_DESCRIPTION {
            let excerpt: String = article.description.chars().take(DESCRIPTION_CHARS).collect();
            out.push_str(&format!("   {excerpt}...\n"));
        }
        out.push_str(&format!("   URL: {}\n\n", article.url));
    }

    out.push_str(&format!("Total articles found: {}\n\n", digest.total_results));
    out.push_str("Please provide a natural summary of these news articles.\n");
    out
}

/// `January 05, 2024` from an RFC 3339 timestamp
fn published_date(published_at: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(published_at)
        .ok()
        .map(|dt| dt.format("%B %d, %Y").to_string())
}

/// First character uppercased, the rest lowercased
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
