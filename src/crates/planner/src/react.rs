//! The ReAct planning loop.

use crate::dispatch::{ActionDispatcher, SimulatedDispatcher};
use crate::envelope::IntentEnvelope;
use crate::parser::{parse_response, ParsedResponse};
use crate::plan::{ExecutionPlan, PlanError, PlanErrorKind, StepStatus, ToolCall};
use crate::prompt::{compose, PromptParts, ScratchpadEntry};
use llm::{GenerateConfig, GenerateModel, GenerateRequest};
use memory::ContextBuilder;
use safety::{SafetyValidator, Verdict};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tooling::async_utils::{CancelToken, Deadline};
use tooling::config::{env_duration_ms_or, env_parse_or};
use tracing::{debug, info, warn};

/// Character budget for the retrieval part of the context (knowledge plus
/// episodes combined).
const RETRIEVAL_CHAR_BUDGET: usize = 1500;

/// Chars-per-token approximation used to convert the adapter's token
/// window into a prompt character budget.
const CHARS_PER_TOKEN: usize = 4;

/// Loop bounds and timeouts.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum Thought→Action→Observation iterations per plan.
    pub max_iterations: usize,

    /// Deadline for each model call.
    pub llm_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_iterations: 10, llm_timeout: Duration::from_secs(30) }
    }
}

impl PlannerConfig {
    /// Load from `PLANNER_MAX_ITERATIONS` and `PLANNER_LLM_TIMEOUT_MS`.
    pub fn from_env() -> tooling::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_iterations: env_parse_or("PLANNER_MAX_ITERATIONS", defaults.max_iterations)?,
            llm_timeout: env_duration_ms_or("PLANNER_LLM_TIMEOUT_MS", defaults.llm_timeout)?,
        })
    }

    /// Set the iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the per-call model deadline.
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }
}

/// Drives the Thought→Action→Observation loop and produces execution plans.
pub struct ReActPlanner {
    model: Arc<dyn GenerateModel>,
    context_builder: ContextBuilder,
    safety: Arc<SafetyValidator>,
    dispatcher: Arc<dyn ActionDispatcher>,
    config: PlannerConfig,
    sampling: GenerateConfig,
}

impl ReActPlanner {
    /// Create a planner with default configuration and the simulated
    /// dispatcher.
    pub fn new(
        model: Arc<dyn GenerateModel>,
        context_builder: ContextBuilder,
        safety: Arc<SafetyValidator>,
    ) -> Self {
        Self {
            model,
            context_builder,
            safety,
            dispatcher: Arc::new(SimulatedDispatcher),
            config: PlannerConfig::default(),
            sampling: GenerateConfig::default(),
        }
    }

    /// Replace the observation dispatcher (the real-executor seam).
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Replace the loop configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the sampling configuration.
    pub fn with_sampling(mut self, sampling: GenerateConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Plan without external cancellation.
    pub async fn plan(&self, envelope: IntentEnvelope) -> ExecutionPlan {
        self.plan_with_cancel(envelope, CancelToken::new()).await
    }

    /// Plan, honouring `cancel` at every suspension point.
    ///
    /// Always returns a well-formed plan; failures are carried in
    /// `plan.error`.
    pub async fn plan_with_cancel(
        &self,
        envelope: IntentEnvelope,
        cancel: CancelToken,
    ) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new(&envelope);

        if let Err(error) = envelope.validate() {
            plan.error = Some(error);
            return plan;
        }

        if self.safety.abuse_tripped(&envelope.user_id).await {
            plan.error = Some(PlanError::new(
                PlanErrorKind::AbuseBlocked,
                "too many recently blocked requests for this user",
            ));
            return plan;
        }

        // Soft whole-plan budget, checked before each iteration.
        let deadline = Deadline::after(
            self.config.llm_timeout * self.config.max_iterations as u32
                + self.context_builder.context_deadline(),
        );

        let context = tokio::select! {
            _ = cancel.cancelled() => return fail(plan, PlanErrorKind::Cancelled, "cancelled during context build"),
            context = self.context_builder.build_context(
                &envelope.user_id,
                &envelope.intent_name,
                &envelope.entities,
                &envelope.raw_query,
            ) => context,
        };

        let mut context = context;
        context.truncate_retrieval(RETRIEVAL_CHAR_BUDGET);

        let parts = PromptParts {
            manifest: self.render_manifest(&envelope.intent_name),
            stable_context: context.render_stable(),
            knowledge: context.render_knowledge(),
            episodes: context.render_episodes(),
            raw_query: envelope.raw_query.clone(),
        };

        let char_budget = self.sampling.context_window.saturating_mul(CHARS_PER_TOKEN);
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();

        for iteration in 0..self.config.max_iterations {
            plan.iterations = iteration + 1;

            if cancel.is_cancelled() {
                return fail(plan, PlanErrorKind::Cancelled, "cancelled by caller");
            }
            if deadline.expired() {
                return fail(
                    plan,
                    PlanErrorKind::DeadlineExceeded,
                    format!("plan budget of {:?} elapsed", deadline.budget()),
                );
            }

            // The terminal iteration is the model's last chance to produce
            // a Final Answer; sample it cold.
            let temperature = if iteration + 1 == self.config.max_iterations {
                self.sampling.final_temperature
            } else {
                self.sampling.temperature
            };

            let request = GenerateRequest::new(compose(&parts, &scratchpad, char_budget))
                .with_max_tokens(self.sampling.max_tokens)
                .with_temperature(temperature)
                .with_stop(["Observation:", "\n\n\n"]);

            let response = tokio::select! {
                _ = cancel.cancelled() => return fail(plan, PlanErrorKind::Cancelled, "cancelled during generation"),
                result = tokio::time::timeout(self.config.llm_timeout, self.model.generate(request)) => {
                    match result {
                        Err(_) => {
                            return fail(
                                plan,
                                PlanErrorKind::LlmError,
                                format!("generation timed out after {:?}", self.config.llm_timeout),
                            )
                        }
                        Ok(Err(e)) => return fail(plan, PlanErrorKind::LlmError, e.to_string()),
                        Ok(Ok(response)) => response,
                    }
                }
            };

            debug!(iteration, tokens = response.tokens_used, "model responded");

            let parsed = match parse_response(&response.text) {
                Ok(parsed) => parsed,
                Err(message) => {
                    warn!(iteration, %message, "unparseable model output");
                    scratchpad.push(ScratchpadEntry::recovery(
                        response.text.trim().to_string(),
                        format!(
                            "Error: {}. Respond with an Action and Action Input, or a Final Answer.",
                            message
                        ),
                    ));
                    continue;
                }
            };

            match parsed {
                ParsedResponse::FinalAnswer { answer, .. } => {
                    plan.final_answer = answer;
                    plan.success = !plan.has_blocked_step() && !plan.has_pending_confirmation();
                    info!(
                        iterations = plan.iterations,
                        steps = plan.steps.len(),
                        success = plan.success,
                        "plan complete"
                    );
                    return plan;
                }
                ParsedResponse::Step { thought, action, action_input } => {
                    let tool = match tools::lookup(&action) {
                        Ok(tool) => tool,
                        Err(e) => {
                            scratchpad.push(ScratchpadEntry::recovery(
                                thought,
                                format!("Error: {}. Choose one of the listed tools.", e),
                            ));
                            continue;
                        }
                    };

                    let params =
                        match tools::extract_parameters(tool, &envelope.entities, &action_input) {
                            Ok(params) => params,
                            Err(e) => {
                                scratchpad.push(ScratchpadEntry::recovery(
                                    thought,
                                    format!("Error: {} for {}.", e, tool),
                                ));
                                continue;
                            }
                        };

                    let validation = self
                        .safety
                        .validate(
                            &envelope.user_id,
                            tool,
                            &params,
                            envelope.confirmation_token.as_deref(),
                        )
                        .await;

                    let observation = match validation.verdict {
                        Verdict::Blocked { reason } => {
                            let observation = format!("Blocked: {}", reason);
                            plan.steps.push(ToolCall {
                                tool,
                                parameters: params,
                                thought: thought.clone(),
                                observation: Some(observation.clone()),
                                sanitized: false,
                                status: StepStatus::Blocked,
                                warnings: Vec::new(),
                                risk: validation.risk,
                                confirmation_token: None,
                            });
                            observation
                        }
                        Verdict::Approved { parameters } => {
                            let observation = self.dispatcher.dispatch(tool, &parameters).await;
                            plan.steps.push(ToolCall {
                                tool,
                                parameters,
                                thought: thought.clone(),
                                observation: Some(observation.clone()),
                                sanitized: false,
                                status: if validation.confirmed {
                                    StepStatus::Confirmed
                                } else {
                                    StepStatus::Approved
                                },
                                warnings: Vec::new(),
                                risk: validation.risk,
                                confirmation_token: None,
                            });
                            observation
                        }
                        Verdict::Sanitized { parameters, warnings } => {
                            let observation = self.dispatcher.dispatch(tool, &parameters).await;
                            plan.steps.push(ToolCall {
                                tool,
                                parameters,
                                thought: thought.clone(),
                                observation: Some(observation.clone()),
                                sanitized: true,
                                status: StepStatus::Sanitized,
                                warnings,
                                risk: validation.risk,
                                confirmation_token: None,
                            });
                            observation
                        }
                        Verdict::RequiresConfirmation { parameters, message, token } => {
                            // Not executed: consumers must hold the step
                            // until the user confirms.
                            plan.steps.push(ToolCall {
                                tool,
                                parameters,
                                thought: thought.clone(),
                                observation: None,
                                sanitized: false,
                                status: StepStatus::PendingConfirmation,
                                warnings: Vec::new(),
                                risk: validation.risk,
                                confirmation_token: Some(token),
                            });
                            format!("Requires confirmation: {}", message)
                        }
                    };

                    scratchpad.push(ScratchpadEntry {
                        thought,
                        action: Some(tool.name().to_string()),
                        action_input: Some(Value::Object(action_input)),
                        observation,
                    });
                }
            }
        }

        fail(
            plan,
            PlanErrorKind::IterationLimit,
            format!(
                "no final answer within {} iterations",
                self.config.max_iterations
            ),
        )
    }

    fn render_manifest(&self, intent_name: &str) -> String {
        let mut manifest = tools::manifest();
        let hints = tools::candidates(intent_name);
        if !hints.is_empty() {
            let names: Vec<&str> = hints.iter().map(|t| t.name()).collect();
            manifest.push_str("\n\nSuggested tools for this request: ");
            manifest.push_str(&names.join(", "));
        }
        manifest
    }
}

fn fail(mut plan: ExecutionPlan, kind: PlanErrorKind, message: impl Into<String>) -> ExecutionPlan {
    let error = PlanError::new(kind, message);
    warn!(%error, "plan failed");
    plan.success = false;
    plan.error = Some(error);
    plan
}
