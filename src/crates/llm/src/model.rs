//! The generation trait and its request/response types.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single text-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The fully composed prompt.
    pub prompt: String,

    /// Maximum tokens to generate.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: f32,

    /// Stop sequences. Generation halts at the first occurrence; the
    /// returned text never contains a stop sequence.
    pub stop: Vec<String>,
}

impl GenerateRequest {
    /// Create a request with default sampling (512 tokens, temperature 0.7).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), max_tokens: 512, temperature: 0.7, stop: Vec::new() }
    }

    /// Set the token budget.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the stop sequences.
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }
}

/// The generated text plus usage accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text, stop-sequence trimmed, valid UTF-8.
    pub text: String,

    /// Completion tokens consumed by this call.
    pub tokens_used: usize,
}

/// A chat-free text generation backend.
///
/// One method carries the whole contract: blocking per call, stop-sequence
/// trimming guaranteed, no internal retries (the caller owns retry and
/// timeout policy). Implementations must be `Send + Sync`; share them as
/// `Arc<dyn GenerateModel>`.
#[async_trait]
pub trait GenerateModel: Send + Sync {
    /// Generate text for a prompt.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Whether the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// The backend's context window in tokens.
    fn context_window(&self) -> usize;
}

/// Cut `text` at the first occurrence of any stop sequence.
///
/// Backends that trim server-side still get residue when the server echoes
/// a partial stop sequence; every backend runs its output through this.
pub fn trim_at_stop(text: &str, stop: &[String]) -> String {
    let mut cut = text.len();
    for sequence in stop {
        if sequence.is_empty() {
            continue;
        }
        if let Some(index) = text.find(sequence.as_str()) {
            cut = cut.min(index);
        }
    }
    text[..cut].trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_fields() {
        let request = GenerateRequest::new("Thought:")
            .with_max_tokens(128)
            .with_temperature(0.2)
            .with_stop(["Observation:", "\n\n\n"]);

        assert_eq!(request.prompt, "Thought:");
        assert_eq!(request.max_tokens, 128);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.stop, vec!["Observation:".to_string(), "\n\n\n".to_string()]);
    }

    #[test]
    fn trim_cuts_at_first_stop() {
        let stop = vec!["Observation:".to_string()];
        let trimmed = trim_at_stop("Thought: check weather\nObservation: sunny", &stop);
        assert_eq!(trimmed, "Thought: check weather");
    }

    #[test]
    fn trim_picks_earliest_of_multiple_stops() {
        let stop = vec!["B".to_string(), "A".to_string()];
        assert_eq!(trim_at_stop("xAyBz", &stop), "x");
    }

    #[test]
    fn trim_without_match_returns_whole_text() {
        let stop = vec!["Observation:".to_string()];
        assert_eq!(trim_at_stop("Final Answer: done", &stop), "Final Answer: done");
    }

    #[test]
    fn trim_ignores_empty_stop_sequences() {
        let stop = vec![String::new()];
        assert_eq!(trim_at_stop("abc", &stop), "abc");
    }
}
