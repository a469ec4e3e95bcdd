//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all endpoints. It implements
//! `axum::response::IntoResponse` to produce a JSON error body with the
//! matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use wjp_metrics::ConfigError;
use wjp_sink::SinkError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The metrics sink could not be opened (503).
    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::SinkUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SINK_UNAVAILABLE"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::SinkUnavailable(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => ApiError::InternalError(err.to_string()),
            ConfigError::Parse(_)
            | ConfigError::InvalidPort(_)
            | ConfigError::InvalidFlushInterval(_)
            | ConfigError::InvalidTagLimits { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<SinkError> for ApiError {
    fn from(err: SinkError) -> Self {
        ApiError::SinkUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("emission task failed: {err}"))
    }
}
