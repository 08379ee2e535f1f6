//! Weighted risk scoring.
//!
//! `score = 0.5·tool + 0.3·parameters + 0.2·context`, clipped to [0, 1],
//! mapped to a level through the threshold table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tools::{RiskLevel, ToolType};

const TOOL_WEIGHT: f64 = 0.5;
const PARAMETER_WEIGHT: f64 = 0.3;
const CONTEXT_WEIGHT: f64 = 0.2;

/// Weighted factor breakdown of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskContributions {
    pub tool: f64,
    pub parameters: f64,
    pub context: f64,
}

/// A scored risk assessment for one tool call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub level: RiskLevel,
    pub score: f64,
    pub contributions: RiskContributions,
}

impl RiskScore {
    /// The score reported for a call blocked before scoring: the maximum,
    /// attributed entirely to the tool factor.
    pub fn blocked() -> Self {
        Self {
            level: RiskLevel::Critical,
            score: 1.0,
            contributions: RiskContributions { tool: 1.0, parameters: 0.0, context: 0.0 },
        }
    }
}

/// Cutoffs mapping a score to a level. A score below `medium` is LOW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { medium: 0.25, high: 0.50, critical: 0.75 }
    }
}

impl RiskThresholds {
    /// Map a clipped score to its level.
    pub fn level_for(&self, score: f64) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Per-user history signals feeding the context factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRiskContext {
    /// Blocked outcomes among the user's last 10 validations.
    pub recent_blocked: usize,
    /// HIGH/CRITICAL outcomes among the user's last 20 validations.
    pub recent_high_risk: usize,
}

/// Score one tool call.
pub fn assess(
    tool: ToolType,
    parameters: &Map<String, Value>,
    context: &UserRiskContext,
    thresholds: &RiskThresholds,
) -> RiskScore {
    let contributions = RiskContributions {
        tool: tool.base_risk().base_score() * TOOL_WEIGHT,
        parameters: parameter_risk(parameters) * PARAMETER_WEIGHT,
        context: context_risk(context) * CONTEXT_WEIGHT,
    };

    let score =
        (contributions.tool + contributions.parameters + contributions.context).clamp(0.0, 1.0);

    RiskScore { level: thresholds.level_for(score), score, contributions }
}

/// Raw parameter risk in [0, 1]: the worst single signal wins.
fn parameter_risk(parameters: &Map<String, Value>) -> f64 {
    let mut worst: f64 = 0.0;

    for value in parameters.values() {
        match value {
            Value::String(text) => {
                let lower = text.to_lowercase();

                if ["drop", "delete", "insert", "update", "exec"]
                    .iter()
                    .any(|kw| lower.contains(kw))
                {
                    worst = worst.max(0.7);
                }
                if text.contains(['`']) || text.contains("$(") {
                    worst = worst.max(0.6);
                }
                if ["..", "~", "/etc", "/var", "c:\\windows"]
                    .iter()
                    .any(|fragment| lower.contains(fragment))
                {
                    worst = worst.max(0.5);
                }
                if lower.contains("localhost") || lower.contains("127.0.0.1") {
                    worst = worst.max(0.4);
                }
                if text.len() > 5000 {
                    worst = worst.max(0.3);
                }
            }
            Value::Number(n) => {
                if n.as_f64().map(|v| v.abs() > 1_000_000.0).unwrap_or(false) {
                    worst = worst.max(0.3);
                }
            }
            _ => {}
        }
    }

    worst
}

/// Raw context risk in [0, 1]: additive signals, clamped.
fn context_risk(context: &UserRiskContext) -> f64 {
    let mut risk = 0.0;
    if context.recent_blocked > 5 {
        risk += 0.3;
    }
    if context.recent_high_risk > 3 {
        risk += 0.2;
    }
    f64::min(risk, 1.0)
}
