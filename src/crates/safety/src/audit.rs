//! Per-user audit trail.
//!
//! Every validation outcome — approved ones included — lands in a bounded
//! ring per user, powering `user_stats` and the history signals of the risk
//! scorer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tools::{RiskLevel, ToolType};

/// Ring capacity per user.
pub const AUDIT_CAPACITY: usize = 1024;

/// Outcome class of one validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Approved,
    Sanitized,
    RequiresConfirmation,
    Blocked,
}

/// One audited validation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub tool: ToolType,
    pub outcome: OutcomeKind,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub at: DateTime<Utc>,
}

/// Aggregate validation statistics for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub approved: usize,
    pub sanitized: usize,
    pub requires_confirmation: usize,
    pub blocked: usize,
    pub average_risk_score: f64,
}

/// Bounded ring of audit entries.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    /// Append an entry, evicting the oldest at capacity.
    pub fn push(&mut self, entry: AuditEntry) {
        if self.entries.len() == AUDIT_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Blocked outcomes among the newest `n` entries.
    pub fn recent_blocked(&self, n: usize) -> usize {
        self.entries
            .iter()
            .rev()
            .take(n)
            .filter(|e| e.outcome == OutcomeKind::Blocked)
            .count()
    }

    /// HIGH/CRITICAL outcomes among the newest `n` entries.
    pub fn recent_high_risk(&self, n: usize) -> usize {
        self.entries
            .iter()
            .rev()
            .take(n)
            .filter(|e| e.risk_level >= RiskLevel::High)
            .count()
    }

    /// Aggregate statistics over the whole ring.
    pub fn stats(&self) -> UserStats {
        let mut stats = UserStats::default();
        let mut score_sum = 0.0;

        for entry in &self.entries {
            stats.total += 1;
            score_sum += entry.risk_score;
            match entry.outcome {
                OutcomeKind::Approved => stats.approved += 1,
                OutcomeKind::Sanitized => stats.sanitized += 1,
                OutcomeKind::RequiresConfirmation => stats.requires_confirmation += 1,
                OutcomeKind::Blocked => stats.blocked += 1,
            }
        }

        if stats.total > 0 {
            stats.average_risk_score = score_sum / stats.total as f64;
        }
        stats
    }
}
