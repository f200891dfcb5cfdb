use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

use crate::models::ErrorEnvelope;

/// Every way a relayed generation call can fail. Each kind maps onto one
/// `ErrorEnvelope` category and one HTTP status.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The call never completed: unreadable client payload, connect failure, timeout.
    #[error("transport failure: {0}")] Transport(String),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {details}")] Backend { status: StatusCode, details: String },
    /// The backend answered 2xx but the body is not a usable result.
    #[error("validation failed: {0}")] Validation(String),
}

impl ProxyError {
    pub fn category(&self) -> &'static str {
        match self {
            ProxyError::Transport(_) => "transport_error",
            ProxyError::Backend { .. } => "backend_error",
            ProxyError::Validation(_) => "validation_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Backend { status, .. } => *status,
            ProxyError::Validation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let details = match self {
            ProxyError::Transport(msg) | ProxyError::Validation(msg) => msg.clone(),
            // raw backend text, may not be JSON
            ProxyError::Backend { details, .. } => details.clone(),
        };
        ErrorEnvelope { error: self.category().to_string(), details }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self { ProxyError::Transport(e.to_string()) }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}
