//! Common error types for ironmeet

use thiserror::Error;

/// Common result type for ironmeet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the shared crate (currently only configuration loading;
/// database and HTTP errors live in the server crate's error type)
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
