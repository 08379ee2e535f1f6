//! The safety validator.

use crate::allowlist::AllowPolicy;
use crate::audit::{AuditEntry, AuditLog, OutcomeKind, UserStats};
use crate::pii::mask_pii;
use crate::risk::{assess, RiskScore, RiskThresholds, UserRiskContext};
use crate::sanitize::{sanitize_parameters, SanitizeOutcome, UrlPolicy};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tools::{ParamKind, RiskLevel, ToolType};
use tooling::config::{env_bool_or, env_duration_ms_or, env_list_or, env_parse_or};
use tooling::rate_limit::SlidingWindow;
use tracing::{debug, warn};

/// Per-minute allowances keyed by risk level.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimits {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self { low: 60, medium: 30, high: 10, critical: 1 }
    }
}

impl RateLimits {
    fn limit_for(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct SafetyConfig {
    /// Risk level cutoffs.
    pub thresholds: RiskThresholds,

    /// Per-user rate limits by risk level.
    pub rate_limits: RateLimits,

    /// Window the rate limits are counted over.
    pub rate_window: Duration,

    /// Allow plain-HTTP localhost URLs (development mode).
    pub allow_http_localhost: bool,

    /// Domains rejected in URL parameters.
    pub blocked_domains: Vec<String>,

    /// Blocked outcomes tolerated per user within the abuse window before
    /// the validator short-circuits further calls.
    pub abuse_limit: usize,

    /// Window the abuse counter is counted over.
    pub abuse_window: Duration,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            rate_limits: RateLimits::default(),
            rate_window: Duration::from_secs(60),
            allow_http_localhost: true,
            blocked_domains: Vec::new(),
            abuse_limit: 10,
            abuse_window: Duration::from_secs(300),
        }
    }
}

impl SafetyConfig {
    /// Load from `SAFETY_*` environment variables.
    pub fn from_env() -> tooling::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            thresholds: RiskThresholds {
                medium: env_parse_or("SAFETY_THRESHOLD_MEDIUM", defaults.thresholds.medium)?,
                high: env_parse_or("SAFETY_THRESHOLD_HIGH", defaults.thresholds.high)?,
                critical: env_parse_or("SAFETY_THRESHOLD_CRITICAL", defaults.thresholds.critical)?,
            },
            rate_limits: RateLimits {
                low: env_parse_or("SAFETY_RATE_LIMIT_LOW", defaults.rate_limits.low)?,
                medium: env_parse_or("SAFETY_RATE_LIMIT_MEDIUM", defaults.rate_limits.medium)?,
                high: env_parse_or("SAFETY_RATE_LIMIT_HIGH", defaults.rate_limits.high)?,
                critical: env_parse_or("SAFETY_RATE_LIMIT_CRITICAL", defaults.rate_limits.critical)?,
            },
            rate_window: defaults.rate_window,
            allow_http_localhost: env_bool_or(
                "SAFETY_ALLOW_HTTP_LOCALHOST",
                defaults.allow_http_localhost,
            )?,
            blocked_domains: env_list_or("SAFETY_BLOCKED_DOMAINS", &[])?,
            abuse_limit: env_parse_or("SAFETY_ABUSE_LIMIT", defaults.abuse_limit)?,
            abuse_window: env_duration_ms_or("SAFETY_ABUSE_WINDOW_MS", defaults.abuse_window)?,
        })
    }

    fn url_policy(&self) -> UrlPolicy {
        UrlPolicy {
            allow_http_localhost: self.allow_http_localhost,
            blocked_domains: self.blocked_domains.clone(),
        }
    }
}

/// Terminal outcome of a validation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Safe to execute as-is.
    Approved { parameters: Map<String, Value> },

    /// Safe to execute with the rewritten parameters.
    Sanitized { parameters: Map<String, Value>, warnings: Vec<String> },

    /// The caller must resubmit with `token` before this call may run.
    RequiresConfirmation { parameters: Map<String, Value>, message: String, token: String },

    /// The call must not run.
    Blocked { reason: String },
}

/// A verdict plus the risk assessment behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub verdict: Verdict,
    pub risk: RiskScore,
    /// True when a RequiresConfirmation outcome was lifted to Approved by a
    /// matching confirmation token on this call.
    pub confirmed: bool,
}

/// Mutable per-user state, serialized behind one lock per user.
struct UserState {
    windows: [SlidingWindow; 4],
    abuse: SlidingWindow,
    audit: AuditLog,
}

impl UserState {
    fn new(config: &SafetyConfig) -> Self {
        let limits = config.rate_limits;
        Self {
            windows: [
                SlidingWindow::new(limits.low, config.rate_window),
                SlidingWindow::new(limits.medium, config.rate_window),
                SlidingWindow::new(limits.high, config.rate_window),
                SlidingWindow::new(limits.critical, config.rate_window),
            ],
            abuse: SlidingWindow::new(config.abuse_limit, config.abuse_window),
            audit: AuditLog::default(),
        }
    }

    fn window_for(&mut self, level: RiskLevel) -> &mut SlidingWindow {
        let index = match level {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        };
        &mut self.windows[index]
    }
}

/// Gates every tool call the planner produces.
pub struct SafetyValidator {
    config: SafetyConfig,
    policy: AllowPolicy,
    users: DashMap<String, Arc<Mutex<UserState>>>,
}

impl SafetyValidator {
    /// Create a validator with the default allow policy.
    pub fn new(config: SafetyConfig) -> Self {
        Self::with_policy(config, AllowPolicy::default())
    }

    /// Create a validator with a custom allow policy.
    pub fn with_policy(config: SafetyConfig, policy: AllowPolicy) -> Self {
        Self { config, policy, users: DashMap::new() }
    }

    /// The opaque token that confirms this exact call for this user.
    ///
    /// Deterministic over user, tool, and the canonical (sorted-key)
    /// parameter rendering, so a resubmission of the same call carries the
    /// same token.
    pub fn confirmation_token(
        user_id: &str,
        tool: ToolType,
        parameters: &Map<String, Value>,
    ) -> String {
        let payload = json!({
            "user_id": user_id,
            "tool": tool.name(),
            "parameters": parameters,
        });
        format!("{:016x}", tooling::serialization::fingerprint(&payload))
    }

    /// Whether this user's abuse window is tripped; the planner
    /// short-circuits whole plans on this.
    pub async fn abuse_tripped(&self, user_id: &str) -> bool {
        let state = self.user_state(user_id);
        let mut state = state.lock().await;
        !state.abuse.allows()
    }

    /// Validation statistics for one user.
    pub async fn user_stats(&self, user_id: &str) -> UserStats {
        let state = self.user_state(user_id);
        let state = state.lock().await;
        state.audit.stats()
    }

    /// Run the full pipeline for one tool call.
    pub async fn validate(
        &self,
        user_id: &str,
        tool: ToolType,
        parameters: &Map<String, Value>,
        confirmation_token: Option<&str>,
    ) -> Validation {
        let state = self.user_state(user_id);
        let mut state = state.lock().await;

        // Abuse short-circuit. Not re-recorded, so the window drains and an
        // abusive user is not locked out forever.
        if !state.abuse.allows() {
            warn!(user_id, %tool, "abuse window tripped; short-circuiting validation");
            let validation = Validation {
                verdict: Verdict::Blocked {
                    reason: format!(
                        "too many blocked requests; retry after {:?}",
                        self.config.abuse_window
                    ),
                },
                risk: RiskScore::blocked(),
                confirmed: false,
            };
            Self::record(&mut state, tool, &validation, false);
            return validation;
        }

        let validation = self.run_pipeline(user_id, tool, parameters, confirmation_token, &mut state);

        let blocked = matches!(validation.verdict, Verdict::Blocked { .. });
        if !blocked {
            // Quota is consumed after the decision, and only by admitted
            // outcomes, so rejected garbage cannot starve a user.
            state.window_for(validation.risk.level).record();
        }
        Self::record(&mut state, tool, &validation, blocked);

        debug!(
            user_id,
            %tool,
            risk = %validation.risk.level,
            confirmed = validation.confirmed,
            "validation complete"
        );
        validation
    }

    fn run_pipeline(
        &self,
        user_id: &str,
        tool: ToolType,
        parameters: &Map<String, Value>,
        confirmation_token: Option<&str>,
        state: &mut UserState,
    ) -> Validation {
        // 1. Allow/block lists.
        if self.policy.is_blocked(tool) {
            return Validation {
                verdict: Verdict::Blocked { reason: format!("tool {} is on the blocked list", tool) },
                risk: RiskScore::blocked(),
                confirmed: false,
            };
        }
        if !self.policy.is_allowed(tool) {
            return Validation {
                verdict: Verdict::Blocked {
                    reason: format!("tool {} is not on the allow list", tool),
                },
                risk: RiskScore::blocked(),
                confirmed: false,
            };
        }

        // 2. Sanitization.
        let mut warnings = Vec::new();
        let mut scrubbed = false;
        let mut params = match sanitize_parameters(tool, parameters, &self.config.url_policy()) {
            SanitizeOutcome::Rejected { reason } => {
                return Validation {
                    verdict: Verdict::Blocked { reason },
                    risk: RiskScore::blocked(),
                    confirmed: false,
                };
            }
            SanitizeOutcome::Clean(params) => params,
            SanitizeOutcome::Scrubbed { parameters, warnings: w } => {
                warnings.extend(w);
                scrubbed = true;
                parameters
            }
        };

        // 3. PII masking, free-form text only. Email/phone parameters carry
        // their category by design.
        for (key, value) in params.clone() {
            let is_text = tool.param_spec(&key).map(|s| s.kind) == Some(ParamKind::Text);
            if !is_text {
                continue;
            }
            if let Value::String(text) = value {
                let (masked, categories) = mask_pii(&text);
                if !categories.is_empty() {
                    warnings.push(format!(
                        "masked PII in parameter '{}': {}",
                        key,
                        categories.join(", ")
                    ));
                    scrubbed = true;
                    params.insert(key, Value::String(masked));
                }
            }
        }

        // 4. Risk scoring.
        let context = UserRiskContext {
            recent_blocked: state.audit.recent_blocked(10),
            recent_high_risk: state.audit.recent_high_risk(20),
        };
        let risk = assess(tool, &params, &context, &self.config.thresholds);

        // 5. Rate limiting.
        if !state.window_for(risk.level).allows() {
            let limit = self.config.rate_limits.limit_for(risk.level);
            return Validation {
                verdict: Verdict::Blocked {
                    reason: format!(
                        "rate limit exceeded: more than {} {} risk actions per minute",
                        limit, risk.level
                    ),
                },
                risk,
                confirmed: false,
            };
        }

        // 6. Confirmation policy.
        let needs_confirmation = risk.level >= RiskLevel::High || tool.requires_confirmation();
        if needs_confirmation {
            let token = Self::confirmation_token(user_id, tool, &params);
            if confirmation_token == Some(token.as_str()) {
                return Validation {
                    verdict: Verdict::Approved { parameters: params },
                    risk,
                    confirmed: true,
                };
            }
            let message = format!(
                "{} is a {} risk action and needs your confirmation before it runs.",
                tool, risk.level
            );
            return Validation {
                verdict: Verdict::RequiresConfirmation { parameters: params, message, token },
                risk,
                confirmed: false,
            };
        }

        if scrubbed {
            Validation { verdict: Verdict::Sanitized { parameters: params, warnings }, risk, confirmed: false }
        } else {
            Validation { verdict: Verdict::Approved { parameters: params }, risk, confirmed: false }
        }
    }

    fn user_state(&self, user_id: &str) -> Arc<Mutex<UserState>> {
        // Get-or-create under the map's shard lock; the per-user mutex is
        // what serializes actual validation work.
        self.users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserState::new(&self.config))))
            .clone()
    }

    fn record(state: &mut UserState, tool: ToolType, validation: &Validation, blocked: bool) {
        let outcome = match &validation.verdict {
            Verdict::Approved { .. } => OutcomeKind::Approved,
            Verdict::Sanitized { .. } => OutcomeKind::Sanitized,
            Verdict::RequiresConfirmation { .. } => OutcomeKind::RequiresConfirmation,
            Verdict::Blocked { .. } => OutcomeKind::Blocked,
        };
        state.audit.push(AuditEntry {
            tool,
            outcome,
            risk_level: validation.risk.level,
            risk_score: validation.risk.score,
            at: Utc::now(),
        });
        if blocked {
            state.abuse.record();
        }
    }
}
