//! News API integration
//!
//! General headlines (optionally filtered by query or category) and a
//! financial feed restricted to business outlets.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::{FinancialNewsConfig, NewsConfig};
use crate::error::{ServiceError, TransportMessages};

const TIMEOUT: Duration = Duration::from_secs(10);

const FINANCE_TERMS: &str = "stock OR market OR finance OR business OR economy";
const FINANCE_DEFAULT_QUERY: &str = "stock market OR finance OR business OR economy";

/// Caller-facing wording for one feed
struct FeedMessages {
    request_failed: &'static str,
    fetch_failed: &'static str,
    empty: &'static str,
    transport: TransportMessages,
}

const GENERAL: FeedMessages = FeedMessages {
    request_failed: "News API request failed",
    fetch_failed: "Failed to fetch news",
    empty: "No news articles found",
    transport: TransportMessages {
        timeout: Some("News API timeout"),
        connect: Some("Unable to connect to News API"),
        other: "News API error",
    },
};

const FINANCIAL: FeedMessages = FeedMessages {
    request_failed: "Financial news API request failed",
    fetch_failed: "Failed to fetch financial news",
    empty: "No financial news articles found",
    transport: TransportMessages {
        timeout: Some("Financial news API timeout"),
        connect: None,
        other: "Financial news API error",
    },
};

/// Client for newsapi.org v2
#[derive(Debug)]
pub struct NewsClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    page_size_cap: u32,
    financial: FinancialNewsConfig,
}

/// A news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub source: String,
    pub author: String,
    pub url: String,
    pub published_at: String,
    pub image_url: String,
}

/// General news result
#[derive(Debug, Clone, Serialize)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_results: u64,
    pub query: Option<String>,
    pub category: Option<String>,
}

/// Financial news result
#[derive(Debug, Clone, Serialize)]
pub struct FinancialNewsPage {
    pub articles: Vec<Article>,
    pub total_results: u64,
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Parameters for a general news lookup
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    /// Free-text search; switches from top headlines to `/everything`
    pub query: Option<String>,
    /// Headline category (business, sports, ...)
    pub category: Option<String>,
    /// Two-letter country code for headlines
    pub country: String,
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    status: String,
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    source: Option<RawSource>,
    author: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    message: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| "No title".to_string()),
            description: raw
                .description
                .unwrap_or_else(|| "No description".to_string()),
            source: raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            author: raw.author.unwrap_or_else(|| "Unknown".to_string()),
            url: raw.url.unwrap_or_default(),
            published_at: raw.published_at.unwrap_or_default(),
            image_url: raw.url_to_image.unwrap_or_default(),
        }
    }
}

impl NewsClient {
    /// Create a news client from configuration
    #[must_use]
    pub fn new(config: NewsConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
            page_size_cap: config.page_size,
            financial: config.financial,
        }
    }

    /// Whether an API key is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch general news
    ///
    /// With a query this searches all articles by recency; without one it
    /// returns top headlines for the country and optional category.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the key is missing, the API rejects the
    /// request or no articles come back
    pub async fn general(&self, request: &NewsQuery) -> Result<NewsPage, ServiceError> {
        let api_key = self.api_key()?;
        let page_size = self.capped(request.page_size);

        let (path, mut params) = if let Some(query) = &request.query {
            (
                "everything",
                vec![
                    ("q", query.clone()),
                    ("sortBy", "publishedAt".to_string()),
                    ("language", "en".to_string()),
                ],
            )
        } else {
            let mut params = vec![("country", request.country.clone())];
            if let Some(category) = &request.category {
                params.push(("category", category.clone()));
            }
            ("top-headlines", params)
        };
        params.push(("apiKey", api_key.expose_secret().to_string()));
        params.push(("pageSize", page_size));

        let (articles, total_results) = self
            .fetch(path, &params, request.page_size, &GENERAL)
            .await?;

        Ok(NewsPage {
            articles,
            total_results,
            query: request.query.clone(),
            category: request.category.clone(),
        })
    }

    /// Fetch business and market news, optionally narrowed by `query`
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the key is missing, the feed is disabled,
    /// the API rejects the request or no articles come back
    pub async fn financial(
        &self,
        query: Option<&str>,
        page_size: u32,
    ) -> Result<FinancialNewsPage, ServiceError> {
        let api_key = self.api_key()?;

        if !self.financial.enabled {
            return Err(ServiceError::Rejected(
                "Financial news is disabled".to_string(),
            ));
        }

        let mut params = vec![
            ("q", financial_query(query)),
            ("apiKey", api_key.expose_secret().to_string()),
            ("pageSize", self.capped(page_size)),
            ("sortBy", "publishedAt".to_string()),
            ("language", "en".to_string()),
        ];
        if let Some(domains) = financial_domains(&self.financial.sources) {
            params.push(("domains", domains));
        }

        let (articles, total_results) = self
            .fetch("everything", &params, page_size, &FINANCIAL)
            .await?;

        Ok(FinancialNewsPage {
            articles,
            total_results,
            query: query.map(String::from),
            kind: "financial",
        })
    }

    fn api_key(&self) -> Result<&SecretString, ServiceError> {
        self.api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("News API key not configured"))
    }

    fn capped(&self, page_size: u32) -> String {
        page_size.min(self.page_size_cap).to_string()
    }

    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, String)],
        page_size: u32,
        messages: &FeedMessages,
    ) -> Result<(Vec<Article>, u64), ServiceError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(path, "fetching news");

        let response = self
            .client
            .get(&url)
            .query(params)
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "news request failed");
                messages.transport.classify(&e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response
                .json::<RawError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| messages.request_failed.to_string());
            tracing::warn!(status = %status, message = %message, "news API error");
            return Err(ServiceError::Rejected(message));
        }

        let page: RawPage = response
            .json()
            .await
            .map_err(|e| messages.transport.classify(&e))?;

        project_page(page, page_size, messages)
    }
}

fn project_page(
    page: RawPage,
    page_size: u32,
    messages: &FeedMessages,
) -> Result<(Vec<Article>, u64), ServiceError> {
    if page.status != "ok" {
        return Err(ServiceError::Rejected(messages.fetch_failed.to_string()));
    }
    if page.articles.is_empty() {
        return Err(ServiceError::Rejected(messages.empty.to_string()));
    }

    let articles: Vec<Article> = page
        .articles
        .into_iter()
        .take(page_size as usize)
        .map(Article::from)
        .collect();
    let total = page.total_results.unwrap_or(articles.len() as u64);

    Ok((articles, total))
}

/// Build the `q` parameter for the financial feed
fn financial_query(query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{q} AND ({FINANCE_TERMS})"),
        None => FINANCE_DEFAULT_QUERY.to_string(),
    }
}

/// Build the `domains` filter from source names
fn financial_domains(sources: &[String]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    Some(
        sources
            .iter()
            .map(|s| format!("{s}.com"))
            .collect::<Vec<_>>()
            .join(","),
    )
}
