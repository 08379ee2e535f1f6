//! HTTP client for the memory service.
//!
//! One method per endpoint the reasoning core consumes. Responses are
//! untrusted: missing fields default, unknown fields are ignored, and a
//! body that is not the expected shape is an error the caller degrades.

use crate::config::MemoryConfig;
use crate::error::{MemoryError, Result};
use crate::types::{ConversationTurn, Episode, KnowledgeItem};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};

/// Number of recent conversation turns fetched per request.
pub const RECENT_TURNS_LIMIT: usize = 5;
/// Number of knowledge facts fetched per request.
pub const KNOWLEDGE_LIMIT: usize = 5;
/// Number of episodes fetched per request.
pub const EPISODE_LIMIT: usize = 3;

/// Client for the memory service's four read endpoints.
#[derive(Clone)]
pub struct MemoryClient {
    base_url: String,
    http: Client,
}

#[derive(Serialize)]
struct KnowledgeQuery<'a> {
    user_id: &'a str,
    query: &'a str,
    k: usize,
}

#[derive(Serialize)]
struct EpisodeQuery<'a> {
    user_id: &'a str,
    query_text: &'a str,
    n_results: usize,
}

impl MemoryClient {
    /// Create a client from the connection settings.
    ///
    /// The per-fetch timeout is enforced at the HTTP client level so a stuck
    /// connection cannot outlive its budget.
    pub fn new(config: &MemoryConfig) -> Self {
        let http = Client::builder()
            .timeout(config.per_fetch_timeout)
            .build()
            .expect("reqwest client construction only fails on invalid TLS configuration");
        Self { base_url: config.service_url.trim_end_matches('/').to_string(), http }
    }

    /// `GET /long-term/preferences/{user_id}`
    ///
    /// The service wraps preferences in an envelope object; a bare object is
    /// accepted too and treated as the preference map itself.
    pub async fn fetch_preferences(&self, user_id: &str) -> Result<Map<String, Value>> {
        let url = format!("{}/long-term/preferences/{}", self.base_url, user_id);
        let body: Value = self.get_json(&url).await?;

        let map = match body {
            Value::Object(mut object) => match object.remove("preferences") {
                Some(Value::Object(inner)) => inner,
                Some(_) | None => object,
            },
            _ => return Err(MemoryError::InvalidBody("preferences is not an object".into())),
        };
        Ok(map)
    }

    /// `GET /short-term/conversation/{user_id}?limit=N`
    pub async fn fetch_recent_turns(&self, user_id: &str) -> Result<Vec<ConversationTurn>> {
        let url = format!(
            "{}/short-term/conversation/{}?limit={}",
            self.base_url, user_id, RECENT_TURNS_LIMIT
        );
        let body: Value = self.get_json(&url).await?;
        parse_array(body, "conversation")
    }

    /// `POST /long-term/knowledge/query`
    pub async fn fetch_knowledge(&self, user_id: &str, query: &str) -> Result<Vec<KnowledgeItem>> {
        let url = format!("{}/long-term/knowledge/query", self.base_url);
        let request = KnowledgeQuery { user_id, query, k: KNOWLEDGE_LIMIT };
        let body: Value = self.post_json(&url, &request).await?;
        parse_array(body, "knowledge")
    }

    /// `POST /episodic/query`
    pub async fn fetch_episodes(&self, user_id: &str, query_text: &str) -> Result<Vec<Episode>> {
        let url = format!("{}/episodic/query", self.base_url);
        let request = EpisodeQuery { user_id, query_text, n_results: EPISODE_LIMIT };
        let body: Value = self.post_json(&url, &request).await?;
        parse_array(body, "episodic")
    }

    /// Probe the service's health endpoint.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<Value> {
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MemoryError::Status { status: status.as_u16(), detail });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| MemoryError::InvalidBody(e.to_string()))
    }
}

/// Decode a response that should be an array of `T`, item by item.
///
/// Items that fail to decode are skipped rather than failing the whole
/// fetch; a top-level shape mismatch is an error.
fn parse_array<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<Vec<T>> {
    // Some deployments wrap the array in {"results": [...]}.
    let array = match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(MemoryError::InvalidBody(format!(
                    "{} response is not an array",
                    what
                )))
            }
        },
        _ => return Err(MemoryError::InvalidBody(format!("{} response is not an array", what))),
    };

    Ok(array
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_array_accepts_bare_and_wrapped_arrays() {
        let bare = json!([{"text": "a", "relevance": 0.9}]);
        let items: Vec<KnowledgeItem> = parse_array(bare, "knowledge").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "a");

        let wrapped = json!({"results": [{"text": "b"}]});
        let items: Vec<KnowledgeItem> = parse_array(wrapped, "knowledge").unwrap();
        assert_eq!(items[0].text, "b");
    }

    #[test]
    fn parse_array_rejects_non_arrays() {
        let err = parse_array::<KnowledgeItem>(json!("nope"), "knowledge").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidBody(_)));
    }

    #[test]
    fn parse_array_skips_undecodable_items() {
        let mixed = json!([{"text": "good"}, 42, {"text": "also good"}]);
        let items: Vec<KnowledgeItem> = parse_array(mixed, "knowledge").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = MemoryClient::new(&MemoryConfig::new("http://localhost:8001/"));
        assert_eq!(client.base_url, "http://localhost:8001");
    }
}
