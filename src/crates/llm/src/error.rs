//! Error types for LLM backends.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when calling a language model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status or an unusable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend is not running or not reachable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request exceeded its deadline.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic backend error.
    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// The adapter itself never retries (the caller owns retry policy); this
    /// classification is for the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Http(_) | LlmError::ServiceUnavailable(_) | LlmError::Timeout(_)
        )
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::InvalidResponse(err.to_string())
    }
}
