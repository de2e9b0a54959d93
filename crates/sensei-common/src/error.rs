//! Common error types for Sensei components.

use thiserror::Error;

/// Common errors across Sensei components
#[derive(Debug, Error)]
pub enum SenseiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed submission fields
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Persistent store unreachable or a write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Challenge session missing or expired
    #[error("Session error: {0}")]
    Session(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream generator unreachable or returned no usable text
    #[error("Generation error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl SenseiError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Validation(_) => 400,
            Self::Storage(_) => 503,
            Self::Session(_) => 404,
            Self::NotFound(_) => 404,
            Self::Upstream(_) => 502,
            Self::Internal(_) => 500,
            Self::Timeout(_) => 504,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Upstream(_) | Self::Timeout(_))
    }
}
