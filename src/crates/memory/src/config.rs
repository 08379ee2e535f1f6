//! Memory service connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tooling::config::{env_duration_ms_or, env_or};

/// Connection and deadline settings for the memory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Base URL of the memory service.
    pub service_url: String,

    /// Deadline for each individual fetch.
    pub per_fetch_timeout: Duration,

    /// Deadline for assembling the whole context.
    pub context_deadline: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8001".to_string(),
            per_fetch_timeout: Duration::from_secs(2),
            context_deadline: Duration::from_secs(3),
        }
    }
}

impl MemoryConfig {
    /// Create a configuration for the given base URL.
    pub fn new(service_url: impl Into<String>) -> Self {
        Self { service_url: service_url.into(), ..Self::default() }
    }

    /// Load from `MEMORY_SERVICE_URL`, `MEMORY_PER_FETCH_TIMEOUT_MS`, and
    /// `MEMORY_CONTEXT_DEADLINE_MS`.
    pub fn from_env() -> tooling::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            service_url: env_or("MEMORY_SERVICE_URL", defaults.service_url)?,
            per_fetch_timeout: env_duration_ms_or(
                "MEMORY_PER_FETCH_TIMEOUT_MS",
                defaults.per_fetch_timeout,
            )?,
            context_deadline: env_duration_ms_or(
                "MEMORY_CONTEXT_DEADLINE_MS",
                defaults.context_deadline,
            )?,
        })
    }

    /// Set the per-fetch timeout.
    pub fn with_per_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.per_fetch_timeout = timeout;
        self
    }

    /// Set the whole-context deadline.
    pub fn with_context_deadline(mut self, deadline: Duration) -> Self {
        self.context_deadline = deadline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = MemoryConfig::default();
        assert_eq!(config.per_fetch_timeout, Duration::from_secs(2));
        assert_eq!(config.context_deadline, Duration::from_secs(3));
    }

    #[test]
    fn builder_overrides() {
        let config = MemoryConfig::new("http://memory:9000")
            .with_per_fetch_timeout(Duration::from_millis(100))
            .with_context_deadline(Duration::from_millis(250));
        assert_eq!(config.service_url, "http://memory:9000");
        assert_eq!(config.per_fetch_timeout, Duration::from_millis(100));
        assert_eq!(config.context_deadline, Duration::from_millis(250));
    }
}
