//! Scripted backend for deterministic tests.
//!
//! Returns canned responses in order and records every request it saw, so
//! tests can assert on both the produced plan and the prompts/sampling the
//! planner actually used. When the script runs out, the last response
//! repeats, which makes "model never converges" scenarios a one-line setup.

use crate::error::{LlmError, Result};
use crate::model::{trim_at_stop, GenerateModel, GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory [`GenerateModel`] with a fixed response script.
pub struct ScriptedModel {
    script: Vec<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
    fail_with: Option<String>,
    context_window: usize,
}

impl ScriptedModel {
    /// Create a model that replies with `script` entries in order,
    /// repeating the last entry once exhausted.
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_with: None,
            context_window: 4096,
        }
    }

    /// Create a model whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
            context_window: 4096,
        }
    }

    /// Override the reported context window.
    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    /// Number of `generate` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("request log lock should not be poisoned").clone()
    }
}

#[async_trait]
impl GenerateModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request log lock should not be poisoned")
            .push(request.clone());

        if let Some(message) = &self.fail_with {
            return Err(LlmError::ServiceUnavailable(message.clone()));
        }

        let raw = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .ok_or_else(|| LlmError::Other("scripted model has an empty script".to_string()))?;

        let text = trim_at_stop(raw, &request.stop);
        // Rough token accounting, enough for budget assertions in tests.
        let tokens_used = text.split_whitespace().count();

        Ok(GenerateResponse { text, tokens_used })
    }

    async fn is_available(&self) -> bool {
        self.fail_with.is_none()
    }

    fn context_window(&self) -> usize {
        self.context_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_repeats_last() {
        let model = ScriptedModel::new(["one", "two"]);

        for expected in ["one", "two", "two", "two"] {
            let response = model.generate(GenerateRequest::new("p")).await.unwrap();
            assert_eq!(response.text, expected);
        }
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn records_requests() {
        let model = ScriptedModel::new(["ok"]);
        model
            .generate(GenerateRequest::new("first prompt").with_temperature(0.2))
            .await
            .unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "first prompt");
        assert_eq!(requests[0].temperature, 0.2);
    }

    #[tokio::test]
    async fn applies_stop_trimming_like_a_real_backend() {
        let model = ScriptedModel::new(["Thought: x\nObservation: leaked"]);
        let response = model
            .generate(GenerateRequest::new("p").with_stop(["Observation:"]))
            .await
            .unwrap();
        assert_eq!(response.text, "Thought: x");
    }

    #[tokio::test]
    async fn failing_model_errors_and_reports_unavailable() {
        let model = ScriptedModel::failing("backend down");
        assert!(!model.is_available().await);
        let err = model.generate(GenerateRequest::new("p")).await.unwrap_err();
        assert!(matches!(err, LlmError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_script_is_an_error() {
        let model = ScriptedModel::new(Vec::<String>::new());
        assert!(model.generate(GenerateRequest::new("p")).await.is_err());
    }
}
