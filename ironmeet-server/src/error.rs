//! Error types for ironmeet-server
//!
//! Defines service-specific error types using thiserror for clear error
//! propagation, plus the HTTP status mapping used by all API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the meet server
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Referenced lifter/attempt/class does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Judge slot outside 1..=3
    #[error("Invalid judge slot: {0}")]
    InvalidJudge(u8),

    /// PIN does not map to any judge slot
    #[error("Invalid judge PIN")]
    InvalidPin,

    /// Vote submitted for an attempt that is not on the platform
    #[error("Attempt {0} is not the active attempt")]
    NotActive(i64),

    /// Activation target is not pending or does not match the cursor
    #[error("Attempt {0} is not pending for the current lift and round")]
    NotPending(i64),

    /// Attempt number is already at 3
    #[error("Cannot advance beyond attempt 3")]
    MaxAttemptReached,

    /// Class still referenced as some lifter's primary class
    #[error("Class in use: {0}")]
    ClassInUse(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the server Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidJudge(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPin => StatusCode::UNAUTHORIZED,
            Error::NotActive(_)
            | Error::NotPending(_)
            | Error::MaxAttemptReached
            | Error::ClassInUse(_)
            | Error::InvalidState(_) => StatusCode::CONFLICT,
            Error::Config(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Http(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
