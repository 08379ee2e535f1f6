//! The execution seam.
//!
//! The planner's responsibility ends at producing a validated plan, so in
//! this crate observations are synthesized. Hosts that wire in real
//! executors implement [`ActionDispatcher`] and hand it to the planner —
//! that substitution is the only integration change.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tools::ToolType;

/// Produces the observation string for one validated tool call.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(&self, tool: ToolType, parameters: &Map<String, Value>) -> String;
}

/// Default dispatcher: a canonical, deterministic synthesized observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDispatcher;

#[async_trait]
impl ActionDispatcher for SimulatedDispatcher {
    async fn dispatch(&self, tool: ToolType, parameters: &Map<String, Value>) -> String {
        format!("{}: executed with parameters {}", tool, Value::Object(parameters.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn simulated_observation_is_canonical() {
        let mut params = Map::new();
        params.insert("location".to_string(), json!("Paris"));

        let observation = SimulatedDispatcher.dispatch(ToolType::GetWeather, &params).await;
        assert_eq!(observation, r#"GET_WEATHER: executed with parameters {"location":"Paris"}"#);
    }

    #[tokio::test]
    async fn simulated_observation_is_deterministic_across_key_insertion_order() {
        let mut forward = Map::new();
        forward.insert("a".to_string(), json!(1));
        forward.insert("b".to_string(), json!(2));

        let mut reverse = Map::new();
        reverse.insert("b".to_string(), json!(2));
        reverse.insert("a".to_string(), json!(1));

        let one = SimulatedDispatcher.dispatch(ToolType::WebSearch, &forward).await;
        let two = SimulatedDispatcher.dispatch(ToolType::WebSearch, &reverse).await;
        assert_eq!(one, two);
    }
}
