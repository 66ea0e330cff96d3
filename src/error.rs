//! Augur error types

use std::time::Duration;

/// Augur error types.
///
/// Covers configuration and transport failures only. A model response that
/// cannot be interpreted is not an error at this level: the classifier turns
/// it into the fallback result (see [`ParseFailure`](crate::parser::ParseFailure)).
#[derive(Debug, thiserror::Error)]
pub enum AugurError {
    // Configuration errors
    #[error("unknown prompt template '{name}'. Available: {}", .available.join(", "))]
    UnknownTemplate {
        name: String,
        available: Vec<String>,
    },

    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Augur operations
pub type Result<T> = std::result::Result<T, AugurError>;
