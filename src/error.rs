//! Error types for postmirror
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message returned whenever a post lookup without fallback comes up empty.
pub const POST_NOT_FOUND: &str = "Post not found!";

/// Message returned when the upstream does not know the referenced user.
pub const USER_NOT_FOUND: &str = "User not found!";

/// Per-field validation messages, keyed by the JSON field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Application-wide error type
///
/// Every variant maps to one HTTP status and a `{"message": ...}` body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Semantically invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// One or more request fields missing or not coercible (400)
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Upstream answered with something unusable (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream transport failure (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The 404 raised by list-by-user, update and delete.
    pub fn post_not_found() -> Self {
        AppError::NotFound(POST_NOT_FOUND.to_string())
    }

    /// Label used for the `errors_total` metric.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Validation(_) => "validation",
            AppError::Upstream(_) => "upstream",
            AppError::HttpClient(_) => "http_client",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Client errors echo their message. Server-class errors are logged
    /// with full detail and answered with a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!(msg)),
            AppError::Validation(fields) => (StatusCode::BAD_REQUEST, serde_json::json!(fields)),
            AppError::Upstream(_) | AppError::HttpClient(_) => {
                tracing::error!(error = %self, "Upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!("Upstream request failed"),
                )
            }
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!("Internal server error"),
                )
            }
        };

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.error_type()])
            .inc();

        let body = Json(serde_json::json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
