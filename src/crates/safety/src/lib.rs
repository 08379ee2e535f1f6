//! Safety validation for planned tool calls.
//!
//! Every tool call the planner wants to admit passes through one pipeline,
//! in a fixed order, short-circuiting on the first terminal outcome:
//!
//! 1. allow/block list check
//! 2. parameter sanitization (injection, traversal, XSS, URL policy)
//! 3. PII masking in free-form text
//! 4. risk scoring
//! 5. per-user, per-risk-level rate limiting
//! 6. confirmation policy
//!
//! Decisions are authoritative: a Blocked outcome with the same inputs never
//! becomes Approved within the same rate window, and sanitization is
//! idempotent. The validator owns the only process-wide mutable state in the
//! core — per-user audit rings and rate windows — serialized behind per-user
//! locks in a get-or-create map.

pub mod allowlist;
pub mod audit;
pub mod pii;
pub mod risk;
pub mod sanitize;
pub mod validator;

pub use allowlist::AllowPolicy;
pub use audit::{AuditEntry, OutcomeKind, UserStats};
pub use risk::{RiskContributions, RiskScore, RiskThresholds};
pub use sanitize::{SanitizeOutcome, UrlPolicy};
pub use validator::{RateLimits, SafetyConfig, SafetyValidator, Validation, Verdict};
