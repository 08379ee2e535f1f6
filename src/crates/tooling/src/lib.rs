//! Shared utilities for the reasoning core workspace.
//!
//! # Modules
//!
//! - `config` - Environment variable loading with parsing and defaults
//! - `async_utils` - Monotonic deadlines and cooperative cancellation
//! - `rate_limit` - Sliding window rate limiting
//! - `serialization` - Stable JSON serialization and fingerprinting
//! - `logging` - Tracing initialization and latency helpers

pub mod async_utils;
pub mod config;
pub mod logging;
pub mod rate_limit;
pub mod serialization;

use thiserror::Error;

/// Errors that can occur in the tooling crate
#[derive(Debug, Error)]
pub enum ToolingError {
    /// General error with message
    #[error("Tooling error: {0}")]
    General(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for tooling operations
pub type Result<T> = std::result::Result<T, ToolingError>;
