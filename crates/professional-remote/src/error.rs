//! Error types for remote operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or transport-level HTTP error (connect failure, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase answered with a non-success status.
    #[error("Supabase error: {status} - {message}")]
    Supabase {
        /// The HTTP status code returned by Supabase.
        status: u16,
        /// The response body, typically containing error details.
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid API URL, missing key or other setup issue.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;
