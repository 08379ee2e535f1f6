//! The immutable input record.

use crate::plan::{PlanError, PlanErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum accepted query length in characters.
pub const MAX_QUERY_CHARS: usize = 4096;

/// One classified request from the upstream intent classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentEnvelope {
    /// Requesting user.
    pub user_id: String,

    /// Classified intent label, e.g. `get_weather`.
    pub intent_name: String,

    /// Structured slots extracted from the utterance.
    #[serde(default)]
    pub entities: Map<String, Value>,

    /// The user's original query text.
    pub raw_query: String,

    /// Token acknowledging a previously returned RequiresConfirmation step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_token: Option<String>,
}

impl IntentEnvelope {
    /// Create an envelope with no entities.
    pub fn new(
        user_id: impl Into<String>,
        intent_name: impl Into<String>,
        raw_query: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            intent_name: intent_name.into(),
            entities: Map::new(),
            raw_query: raw_query.into(),
            confirmation_token: None,
        }
    }

    /// Add one entity slot.
    pub fn with_entity(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entities.insert(key.into(), value);
        self
    }

    /// Replace the entity map.
    pub fn with_entities(mut self, entities: Map<String, Value>) -> Self {
        self.entities = entities;
        self
    }

    /// Attach a confirmation token for replaying a confirmed plan.
    pub fn with_confirmation_token(mut self, token: impl Into<String>) -> Self {
        self.confirmation_token = Some(token.into());
        self
    }

    /// Check the envelope bounds: non-empty user, query within 1..=4096
    /// characters.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.user_id.trim().is_empty() {
            return Err(PlanError::new(PlanErrorKind::InvalidRequest, "user_id must not be empty"));
        }
        let chars = self.raw_query.chars().count();
        if chars == 0 {
            return Err(PlanError::new(PlanErrorKind::InvalidRequest, "raw_query must not be empty"));
        }
        if chars > MAX_QUERY_CHARS {
            return Err(PlanError::new(
                PlanErrorKind::InvalidRequest,
                format!("raw_query exceeds {} characters", MAX_QUERY_CHARS),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_populates_fields() {
        let envelope = IntentEnvelope::new("u1", "get_weather", "weather in Paris?")
            .with_entity("location", json!("Paris"))
            .with_confirmation_token("abc123");

        assert_eq!(envelope.user_id, "u1");
        assert_eq!(envelope.entities["location"], json!("Paris"));
        assert_eq!(envelope.confirmation_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn minimum_length_query_is_valid() {
        assert!(IntentEnvelope::new("u1", "i", "?").validate().is_ok());
    }

    #[test]
    fn maximum_length_query_is_valid() {
        let query: String = "q".repeat(MAX_QUERY_CHARS);
        assert!(IntentEnvelope::new("u1", "i", query).validate().is_ok());
    }

    #[test]
    fn over_limit_query_is_rejected() {
        let query: String = "q".repeat(MAX_QUERY_CHARS + 1);
        let err = IntentEnvelope::new("u1", "i", query).validate().unwrap_err();
        assert_eq!(err.kind, PlanErrorKind::InvalidRequest);
    }

    #[test]
    fn empty_query_and_empty_user_are_rejected() {
        assert!(IntentEnvelope::new("u1", "i", "").validate().is_err());
        assert!(IntentEnvelope::new("  ", "i", "hello").validate().is_err());
    }

    #[test]
    fn length_is_counted_in_characters_not_bytes() {
        // 4096 multi-byte characters exceed 4096 bytes but are still valid.
        let query: String = "é".repeat(MAX_QUERY_CHARS);
        assert!(IntentEnvelope::new("u1", "i", query).validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let envelope: IntentEnvelope = serde_json::from_value(json!({
            "user_id": "u1",
            "intent_name": "get_time",
            "raw_query": "what time is it"
        }))
        .unwrap();
        assert!(envelope.entities.is_empty());
        assert!(envelope.confirmation_token.is_none());
    }
}
