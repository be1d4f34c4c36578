//! Keycloak bearer token cache
//!
//! Tokens come from the realm's password grant and are reused until they are
//! within a minute of expiring. The cache lock is held across a refresh so
//! concurrent callers wait for one token request instead of each issuing
//! their own.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::ChatBackendConfig;
use crate::error::ServiceError;

const TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh tokens this many seconds before they expire
const REFRESH_MARGIN_SECS: u64 = 60;

/// Lifetime assumed when the token response omits `expires_in`
const DEFAULT_EXPIRES_IN: u64 = 300;

/// Cached token info
#[derive(Debug)]
struct TokenInfo {
    access_token: String,
    expires_at: u64,
}

impl TokenInfo {
    const fn is_fresh(&self, now: u64) -> bool {
        self.expires_at.saturating_sub(now) > REFRESH_MARGIN_SECS
    }
}

/// Token response from Keycloak
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Lazily refreshed bearer token for the conversational backend
#[derive(Debug)]
pub struct TokenCache {
    client: Client,
    token_url: String,
    client_id: String,
    username: String,
    password: Option<SecretString>,
    cached: Mutex<Option<TokenInfo>>,
}

impl TokenCache {
    /// Create a token cache for the configured realm
    #[must_use]
    pub fn new(client: Client, config: &ChatBackendConfig, password: Option<SecretString>) -> Self {
        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            config.keycloak_url.trim_end_matches('/'),
            config.realm
        );

        Self {
            client,
            token_url,
            client_id: config.client_id.clone(),
            username: config.username.clone(),
            password,
            cached: Mutex::new(None),
        }
    }

    /// Whether credentials are configured
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && self.password.is_some()
    }

    /// Return a valid bearer token, refreshing it first if needed
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the token request fails
    pub async fn bearer(&self) -> Result<String, ServiceError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(unix_now())) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self) -> Result<TokenInfo, ServiceError> {
        let password = self
            .password
            .as_ref()
            .ok_or(ServiceError::NotConfigured("Chat backend credentials not configured"))?;

        tracing::debug!(url = %self.token_url, "requesting bearer token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.client_id.as_str()),
                ("username", self.username.as_str()),
                ("password", password.expose_secret()),
            ])
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "token request failed");
                ServiceError::Other(format!("token request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "token request rejected");
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message: format!("token request failed: {status}"),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Other(format!("token parse error: {e}")))?;

        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        tracing::info!(expires_in, "bearer token refreshed");

        Ok(TokenInfo {
            access_token: token.access_token,
            expires_at: unix_now() + expires_in,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
