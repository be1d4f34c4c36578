//! API error responses
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status chosen
//! by how the request failed.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ServiceError;

/// Errors returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid request input
    BadRequest(&'static str),
    /// Request body was not JSON of the expected shape
    InvalidBody(String),
    /// A data lookup (weather, Wikipedia, news) failed; always 404
    Lookup(ServiceError),
    /// A speech vendor failed; status follows the failure kind
    Vendor(ServiceError),
    /// The conversational backend failed
    BadGateway(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Lookup(_) => StatusCode::NOT_FOUND,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Vendor(err) => match err {
                ServiceError::Upstream { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ServiceError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::NotConfigured(_)
                | ServiceError::Rejected(_)
                | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(self) -> String {
        match self {
            Self::BadRequest(msg) | Self::BadGateway(msg) => msg.to_string(),
            Self::InvalidBody(msg) => msg,
            Self::Lookup(err) | Self::Vendor(err) => err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "rejected request body");
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = ?self, "request failed");
        }

        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}
