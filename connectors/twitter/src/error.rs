//! Error types for the stream tap.

use thiserror::Error;

/// Errors that end a run.
///
/// Transport problems the stream endpoint reports (HTTP status codes, a body
/// that dies mid-read) are not errors here; they reach the listener through
/// `on_error` instead.
#[derive(Error, Debug)]
pub enum TwitterError {
    /// HTTP request could not be built or sent
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the output or reading a config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// OAuth signature generation failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for stream tap operations.
pub type TwitterResult<T> = Result<T, TwitterError>;
