//! llama.cpp server backend.
//!
//! Talks to llama.cpp's built-in HTTP server through its OpenAI-compatible
//! completion API. The planner composes raw ReAct prompts, so this client
//! uses the text completion endpoint rather than the chat one.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{GenerateModel, GenerateRequest, LlamaServerClient, LlamaServerConfig};
//!
//! let client = LlamaServerClient::new(LlamaServerConfig::new(
//!     "http://localhost:8080",
//!     "mistral-7b-instruct",
//! ));
//! let response = client.generate(GenerateRequest::new("Thought:")).await?;
//! ```

use crate::config::LlamaServerConfig;
use crate::error::{LlmError, Result};
use crate::model::{trim_at_stop, GenerateModel, GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for a llama.cpp HTTP server.
#[derive(Clone)]
pub struct LlamaServerClient {
    config: LlamaServerConfig,
    http: Client,
    context_window: usize,
}

impl LlamaServerClient {
    /// Create a client with the default 4096-token context window.
    pub fn new(config: LlamaServerConfig) -> Self {
        Self::with_context_window(config, 4096)
    }

    /// Create a client declaring the loaded model's context window.
    pub fn with_context_window(config: LlamaServerConfig, context_window: usize) -> Self {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client construction only fails on invalid TLS configuration");
        Self { config, http, context_window }
    }

    /// Probe the server's health endpoint.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl GenerateModel for LlamaServerClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/v1/completions", self.config.base_url);

        let body = CompletionRequest {
            model: self.config.model.clone(),
            prompt: request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: if request.stop.is_empty() { None } else { Some(request.stop.clone()) },
            stream: false,
        };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(format!("completion request: {}", e))
            } else if e.is_connect() {
                LlmError::ServiceUnavailable(format!("llama.cpp server at {}: {}", url, e))
            } else {
                LlmError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::InvalidResponse(format!(
                "llama.cpp server returned {}: {}",
                status, detail
            )));
        }

        let completion: CompletionResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("completion had no choices".to_string()))?;

        let text = trim_at_stop(&choice.text, &request.stop);
        let tokens_used = completion.usage.map(|u| u.completion_tokens).unwrap_or(0);

        debug!(tokens_used, finish_reason = ?choice.finish_reason, "completion received");

        Ok(GenerateResponse { text, tokens_used })
    }

    async fn is_available(&self) -> bool {
        self.check_health().await
    }

    fn context_window(&self) -> usize {
        self.context_window
    }
}

// Wire types for the OpenAI-compatible completion API.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    completion_tokens: usize,
}
