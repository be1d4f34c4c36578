//! Remote conversational backend
//!
//! Forwards a user's message together with the backend's conversation id and
//! returns the reply plus the (possibly new) conversation id.

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use super::keycloak::TokenCache;
use crate::config::ChatBackendConfig;
use crate::error::ServiceError;
use crate::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the opportunity query endpoint
#[derive(Debug)]
pub struct RevinciClient {
    client: Client,
    url: String,
    user_id: String,
    tenant_id: String,
    tokens: TokenCache,
}

/// A reply from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    user_id: &'a str,
    user_input: &'a str,
    conversation_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    conversation_id: String,
}

impl RevinciClient {
    /// Create a backend client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(mut config: ChatBackendConfig) -> Result<Self> {
        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for chat backend");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.tls_verify)
            .build()
            .map_err(|e| Error::Config(format!("failed to create chat backend client: {e}")))?;

        let password = config.password.take();
        let tokens = TokenCache::new(client.clone(), &config, password);

        Ok(Self {
            client,
            url: config.url,
            user_id: config.user_id,
            tenant_id: config.tenant_id,
            tokens,
        })
    }

    /// Whether backend credentials are configured
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.tokens.is_configured()
    }

    /// Send `user_input` within `conversation_id` (empty to start a new conversation)
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if authentication or the query fails
    pub async fn query(
        &self,
        user_input: &str,
        conversation_id: &str,
    ) -> std::result::Result<ChatReply, ServiceError> {
        let token = self.tokens.bearer().await?;

        tracing::debug!(url = %self.url, conversation_id, "querying chat backend");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .header("tenant-id", &self.tenant_id)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&QueryRequest {
                user_id: &self.user_id,
                user_input,
                conversation_id,
            })
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat backend request failed");
                ServiceError::Other(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat backend error");
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message: format!("Status {}", status.as_u16()),
            });
        }

        let reply: QueryResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Other(e.to_string()))?;

        Ok(ChatReply {
            content: reply.content,
            conversation_id: reply.conversation_id,
        })
    }
}
