//! Configuration for generation sampling and backends.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tooling::config::{env_or, env_parse_or};

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Sampling parameters for plan generation.
///
/// The planner uses `temperature` for exploratory iterations and the lower
/// `final_temperature` for the last budgeted iteration, where variance only
/// hurts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Sampling temperature for regular iterations.
    pub temperature: f32,

    /// Sampling temperature for the terminal iteration.
    pub final_temperature: f32,

    /// Maximum tokens to generate per call.
    pub max_tokens: usize,

    /// Model context window in tokens. The planner truncates its prompt to
    /// fit this budget.
    pub context_window: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self { temperature: 0.7, final_temperature: 0.2, max_tokens: 512, context_window: 4096 }
    }
}

impl GenerateConfig {
    /// Load from `LLM_TEMPERATURE`, `LLM_FINAL_TEMPERATURE`,
    /// `LLM_MAX_TOKENS`, and `LLM_CONTEXT_WINDOW`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            temperature: env_parse_or("LLM_TEMPERATURE", defaults.temperature)
                .map_err(|e| crate::LlmError::Config(e.to_string()))?,
            final_temperature: env_parse_or("LLM_FINAL_TEMPERATURE", defaults.final_temperature)
                .map_err(|e| crate::LlmError::Config(e.to_string()))?,
            max_tokens: env_parse_or("LLM_MAX_TOKENS", defaults.max_tokens)
                .map_err(|e| crate::LlmError::Config(e.to_string()))?,
            context_window: env_parse_or("LLM_CONTEXT_WINDOW", defaults.context_window)
                .map_err(|e| crate::LlmError::Config(e.to_string()))?,
        })
    }

    /// Set the regular sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-call token budget.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the context window size.
    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }
}

/// Connection settings for a llama.cpp HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlamaServerConfig {
    /// Base URL, e.g. "http://localhost:8080".
    pub base_url: String,

    /// Model identifier passed through to the server.
    pub model: String,

    /// Per-request timeout applied at the HTTP client level.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl LlamaServerConfig {
    /// Create a new backend configuration.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into(), timeout: default_timeout() }
    }

    /// Load from `LLM_SERVER_URL`, `LLM_MODEL`, and `LLM_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let base_url = env_or("LLM_SERVER_URL", "http://localhost:8080")
            .map_err(|e| crate::LlmError::Config(e.to_string()))?;
        let model = env_or("LLM_MODEL", "default")
            .map_err(|e| crate::LlmError::Config(e.to_string()))?;
        let timeout = tooling::config::env_duration_ms_or("LLM_TIMEOUT_MS", default_timeout())
            .map_err(|e| crate::LlmError::Config(e.to_string()))?;
        Ok(Self { base_url, model, timeout })
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
