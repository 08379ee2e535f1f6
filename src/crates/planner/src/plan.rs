//! Plan output types.

use crate::envelope::IntentEnvelope;
use safety::RiskScore;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tools::ToolType;

/// Terminal state of one admitted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Passed validation unchanged.
    Approved,
    /// Passed validation with rewritten parameters.
    Sanitized,
    /// Awaiting a confirmation token; consumers must not execute it.
    PendingConfirmation,
    /// A previously pending step confirmed by token replay.
    Confirmed,
    /// Rejected by the safety validator; recorded, never executed.
    Blocked,
}

/// One validated tool call in the plan.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCall {
    pub tool: ToolType,

    /// Post-validation parameters (the sanitized form where sanitization
    /// applied).
    pub parameters: Map<String, Value>,

    /// The model's reasoning for this step.
    pub thought: String,

    /// Set only after (simulated) execution; pending and blocked steps do
    /// not execute. A blocked step's observation carries the block reason.
    pub observation: Option<String>,

    /// Whether the parameters were rewritten by sanitization.
    pub sanitized: bool,

    pub status: StepStatus,

    /// Sanitizer and PII warnings for this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub risk: RiskScore,

    /// Present on pending steps; resubmit the envelope with this token to
    /// confirm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_token: Option<String>,
}

/// Why a plan failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanErrorKind {
    /// The loop did not converge within the iteration budget.
    IterationLimit,
    /// The model backend failed or timed out.
    LlmError,
    /// The caller cancelled mid-plan.
    Cancelled,
    /// The envelope failed its bounds check.
    InvalidRequest,
    /// The user's abuse window is tripped; the plan was not attempted.
    AbuseBlocked,
    /// The whole-plan soft deadline elapsed.
    DeadlineExceeded,
}

/// A fatal plan failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind:?}: {message}")]
pub struct PlanError {
    pub kind: PlanErrorKind,
    pub message: String,
}

impl PlanError {
    pub fn new(kind: PlanErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

/// The planner's output: ordered validated steps plus a final answer.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    pub user_id: String,
    pub intent_name: String,
    pub raw_query: String,

    /// Steps in the exact order the planner accepted them.
    pub steps: Vec<ToolCall>,

    pub final_answer: String,
    pub iterations: usize,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PlanError>,
}

impl ExecutionPlan {
    /// Empty plan shell for an envelope.
    pub fn new(envelope: &IntentEnvelope) -> Self {
        Self {
            user_id: envelope.user_id.clone(),
            intent_name: envelope.intent_name.clone(),
            raw_query: envelope.raw_query.clone(),
            steps: Vec::new(),
            final_answer: String::new(),
            iterations: 0,
            success: false,
            error: None,
        }
    }

    /// Whether any step was rejected by the validator.
    pub fn has_blocked_step(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Blocked)
    }

    /// Whether any step still awaits confirmation.
    pub fn has_pending_confirmation(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::PendingConfirmation)
    }

    /// Human-readable rendering for logs and debugging.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Execution plan for: {}", self.raw_query),
            format!("Intent: {}", self.intent_name),
            format!("Iterations: {}", self.iterations),
            format!("Success: {}", self.success),
        ];

        if !self.steps.is_empty() {
            lines.push("Steps:".to_string());
            for (i, step) in self.steps.iter().enumerate() {
                lines.push(format!("  {}. {} [{:?}]", i + 1, step.tool, step.status));
                if let Some(observation) = &step.observation {
                    lines.push(format!("     -> {}", observation));
                }
            }
        }

        if !self.final_answer.is_empty() {
            lines.push(format!("Final answer: {}", self.final_answer));
        }
        if let Some(error) = &self.error {
            lines.push(format!("Error: {}", error));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(status: StepStatus) -> ToolCall {
        ToolCall {
            tool: ToolType::GetWeather,
            parameters: Map::new(),
            thought: "t".into(),
            observation: None,
            sanitized: false,
            status,
            warnings: Vec::new(),
            risk: RiskScore::blocked(),
            confirmation_token: None,
        }
    }

    #[test]
    fn new_plan_is_an_unsuccessful_shell() {
        let envelope = IntentEnvelope::new("u1", "get_weather", "weather?");
        let plan = ExecutionPlan::new(&envelope);
        assert_eq!(plan.user_id, "u1");
        assert!(plan.steps.is_empty());
        assert!(!plan.success);
        assert!(plan.error.is_none());
    }

    #[test]
    fn step_predicates() {
        let envelope = IntentEnvelope::new("u1", "i", "q");
        let mut plan = ExecutionPlan::new(&envelope);
        assert!(!plan.has_blocked_step());

        plan.steps.push(step(StepStatus::Approved));
        plan.steps.push(step(StepStatus::Blocked));
        plan.steps.push(step(StepStatus::PendingConfirmation));
        assert!(plan.has_blocked_step());
        assert!(plan.has_pending_confirmation());
    }

    #[test]
    fn plan_serializes_to_json_with_canonical_names() {
        let envelope = IntentEnvelope::new("u1", "get_weather", "weather?");
        let mut plan = ExecutionPlan::new(&envelope);
        plan.steps.push(step(StepStatus::Approved));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["steps"][0]["tool"], serde_json::json!("GET_WEATHER"));
        assert_eq!(json["steps"][0]["status"], serde_json::json!("APPROVED"));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn summary_mentions_steps_and_errors() {
        let envelope = IntentEnvelope::new("u1", "i", "do it");
        let mut plan = ExecutionPlan::new(&envelope);
        plan.steps.push(step(StepStatus::Blocked));
        plan.error = Some(PlanError::new(PlanErrorKind::IterationLimit, "no convergence"));

        let summary = plan.summary();
        assert!(summary.contains("GET_WEATHER"));
        assert!(summary.contains("no convergence"));
    }
}
