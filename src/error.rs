//! Error types for Concierge gateway

use thiserror::Error;

/// Result type alias for Concierge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Concierge gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Third-party service failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure reported by a vendor integration
///
/// The display text is the message returned to API callers, so each
/// integration words it for its own service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Credentials for the service are missing
    #[error("{0}")]
    NotConfigured(&'static str),

    /// The service answered but had nothing usable (unknown city, no articles, bad key)
    #[error("{0}")]
    Rejected(String),

    /// The service answered with a status the caller should see
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The request timed out
    #[error("{0}")]
    Timeout(String),

    /// The service could not be reached
    #[error("{0}")]
    Unreachable(String),

    /// Anything else (malformed payloads, local failures)
    #[error("{0}")]
    Other(String),
}

/// Caller-facing wording for transport failures of one service
#[derive(Debug, Clone, Copy)]
pub struct TransportMessages {
    /// Message for timeouts; `None` falls through to `other`
    pub timeout: Option<&'static str>,
    /// Message for connection failures; `None` falls through to `other`
    pub connect: Option<&'static str>,
    /// Prefix for every other failure, rendered as `"{other}: {error}"`
    pub other: &'static str,
}

impl TransportMessages {
    /// Classify a reqwest failure into a [`ServiceError`]
    #[must_use]
    pub fn classify(&self, err: &reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            if let Some(msg) = self.timeout {
                return ServiceError::Timeout(msg.to_string());
            }
        }
        if err.is_connect() {
            if let Some(msg) = self.connect {
                return ServiceError::Unreachable(msg.to_string());
            }
        }
        ServiceError::Other(format!("{}: {err}", self.other))
    }

    /// Failure for a deadline enforced around a request rather than by reqwest
    #[must_use]
    pub fn elapsed(&self) -> ServiceError {
        self.timeout.map_or_else(
            || ServiceError::Other(format!("{}: request timed out", self.other)),
            |msg| ServiceError::Timeout(msg.to_string()),
        )
    }

    /// Wrap a non-transport failure (decode, missing field) with the `other` prefix
    #[must_use]
    pub fn other(&self, detail: impl std::fmt::Display) -> ServiceError {
        ServiceError::Other(format!("{}: {detail}", self.other))
    }
}
