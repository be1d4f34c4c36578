//! Wikipedia summary lookup via the `MediaWiki` action API
//!
//! A lookup is two requests: a full-text search for the best matching title,
//! then a plain-text intro extract for that title.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::config::WikipediaConfig;
use crate::error::{ServiceError, TransportMessages};

/// Page id `MediaWiki` reports for titles that don't exist
const MISSING_PAGE_ID: &str = "-1";

const ERRORS: TransportMessages = TransportMessages {
    timeout: Some("Wikipedia request timeout"),
    connect: Some("Unable to connect to Wikipedia"),
    other: "Wikipedia API error",
};

/// Client for Wikipedia lookups
#[derive(Debug)]
pub struct WikipediaClient {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

/// Article summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiSummary {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub page_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    pages: BTreeMap<String, PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    title: String,
    extract: Option<String>,
    fullurl: Option<String>,
}

impl WikipediaClient {
    /// Create a Wikipedia client from configuration
    #[must_use]
    pub fn new(config: WikipediaConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url,
            user_agent: config.user_agent,
            timeout: config.timeout,
        }
    }

    /// Look up the article best matching `query`, with an intro of `sentences` sentences
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if nothing matches or the API fails
    pub async fn summary(&self, query: &str, sentences: u8) -> Result<WikiSummary, ServiceError> {
        let title = self.best_title(query).await?;
        tracing::debug!(query, title = %title, "wikipedia search hit");

        let sentences = sentences.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("titles", title.as_str()),
                ("format", "json"),
                ("inprop", "url"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ERRORS.classify(&e))?;

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), "wikipedia extract failed");
            return Err(ServiceError::Rejected(
                "Failed to fetch Wikipedia content".to_string(),
            ));
        }

        let data: ExtractResponse = response.json().await.map_err(|e| ERRORS.classify(&e))?;
        project_page(data)
    }

    /// Search for the single best matching page title
    async fn best_title(&self, query: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(&self.base_url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", "1"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "wikipedia search request failed");
                ERRORS.classify(&e)
            })?;

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), "wikipedia search failed");
            return Err(ServiceError::Rejected("Wikipedia search failed".to_string()));
        }

        let data: SearchResponse = response.json().await.map_err(|e| ERRORS.classify(&e))?;

        data.query
            .search
            .into_iter()
            .next()
            .map(|hit| hit.title)
            .ok_or_else(|| {
                ServiceError::Rejected(format!("No Wikipedia article found for \"{query}\""))
            })
    }
}

fn project_page(data: ExtractResponse) -> Result<WikiSummary, ServiceError> {
    let (page_id, page) = data
        .query
        .pages
        .into_iter()
        .next()
        .ok_or_else(|| ERRORS.other("response has no pages"))?;

    if page_id == MISSING_PAGE_ID {
        return Err(ServiceError::Rejected("Wikipedia page not found".to_string()));
    }

    Ok(WikiSummary {
        title: page.title,
        summary: page
            .extract
            .unwrap_or_else(|| "No summary available".to_string()),
        url: page.fullurl.unwrap_or_default(),
        page_id,
    })
}
