//! LLM adapter for the reasoning core.
//!
//! The planner talks to a language model through one narrow interface: a
//! single blocking-per-call `generate` that takes a composed prompt and
//! returns trimmed text plus a token count. Everything else — model
//! identity, quantization, local vs remote inference — is a backend concern
//! behind the [`GenerateModel`] trait.
//!
//! # Backends
//!
//! - [`LlamaServerClient`] - llama.cpp's built-in HTTP server
//!   (OpenAI-compatible completion API), for local CPU/GPU inference
//! - [`ScriptedModel`] - ordered canned responses for deterministic tests
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
//!
//! let request = GenerateRequest::new("Thought:")
//!     .with_max_tokens(512)
//!     .with_stop(["Observation:"]);
//!
//! let response = client.generate(request).await?;
//! println!("{} ({} tokens)", response.text, response.tokens_used);
//! ```

pub mod config;
pub mod error;
pub mod llama_server;
pub mod model;
pub mod scripted;

pub use config::{GenerateConfig, LlamaServerConfig};
pub use error::{LlmError, Result};
pub use llama_server::LlamaServerClient;
pub use model::{GenerateModel, GenerateRequest, GenerateResponse};
pub use scripted::ScriptedModel;
