//! The ReAct reasoning planner.
//!
//! Given a classified intent plus extracted entities, the planner drives a
//! bounded Thought→Action→Observation loop against a language model and
//! produces a validated, tool-typed [`ExecutionPlan`]. Each candidate tool
//! call passes through the safety validator before it is admitted; context
//! comes from the memory service and degrades gracefully when that service
//! does not answer.
//!
//! The loop is an explicit state machine, strictly sequential within one
//! plan. Its only suspension points are the memory fetches and the model
//! calls; parsing, tool resolution, and validation are pure CPU. A
//! caller-supplied [`tooling::async_utils::CancelToken`] is honoured at
//! every suspension point.
//!
//! Observations are synthesized (`"<TOOL>: executed with parameters
//! <JSON>"`) so the planner can be developed and tested without the action
//! executors. Wiring the real executors in means swapping the
//! [`ActionDispatcher`] — nothing else changes.

pub mod dispatch;
pub mod envelope;
pub mod parser;
pub mod plan;
pub mod prompt;
pub mod react;

pub use dispatch::{ActionDispatcher, SimulatedDispatcher};
pub use envelope::{IntentEnvelope, MAX_QUERY_CHARS};
pub use parser::{parse_response, ParsedResponse};
pub use plan::{ExecutionPlan, PlanError, PlanErrorKind, StepStatus, ToolCall};
pub use react::{PlannerConfig, ReActPlanner};
