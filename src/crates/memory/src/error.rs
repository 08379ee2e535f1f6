//! Error types for memory service access.

use thiserror::Error;

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors from individual memory service requests.
///
/// These never escape the context builder — each one degrades a context
/// field to empty — but the client surfaces them so callers can log the
/// cause.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("memory service returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Body was not usable JSON of the expected shape.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}
