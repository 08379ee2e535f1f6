//! Concurrent context assembly.

use crate::client::MemoryClient;
use crate::config::MemoryConfig;
use crate::types::Context;
use serde_json::{Map, Value};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Assembles a [`Context`] per request from the memory service.
///
/// The four fetches run concurrently, each under the per-fetch timeout,
/// the whole join under the context deadline. Nothing here fails: every
/// error path degrades its field to empty and logs a warning.
#[derive(Clone)]
pub struct ContextBuilder {
    client: MemoryClient,
    config: MemoryConfig,
}

impl ContextBuilder {
    /// Create a builder for the configured memory service.
    pub fn new(config: MemoryConfig) -> Self {
        let client = MemoryClient::new(&config);
        Self { client, config }
    }

    /// Fetch and collate context for one request. Never fails.
    ///
    /// `entities` are accepted for interface completeness; retrieval is
    /// keyed on the raw query, which preserves the phrasing the knowledge
    /// and episodic indexes were built against.
    pub async fn build_context(
        &self,
        user_id: &str,
        intent_name: &str,
        _entities: &Map<String, Value>,
        raw_query: &str,
    ) -> Context {
        debug!(user_id, intent_name, "building context");

        let per_fetch = self.config.per_fetch_timeout;

        let assembled = tooling::logging::timed("build_context", async {
            let preferences = async {
                match timeout(per_fetch, self.client.fetch_preferences(user_id)).await {
                    Ok(Ok(map)) => map,
                    Ok(Err(e)) => {
                        warn!(user_id, error = %e, "preferences fetch failed; degrading to empty");
                        Map::new()
                    }
                    Err(_) => {
                        warn!(user_id, "preferences fetch timed out; degrading to empty");
                        Map::new()
                    }
                }
            };

            let recent_turns = async {
                match timeout(per_fetch, self.client.fetch_recent_turns(user_id)).await {
                    Ok(Ok(turns)) => turns,
                    Ok(Err(e)) => {
                        warn!(user_id, error = %e, "conversation fetch failed; degrading to empty");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(user_id, "conversation fetch timed out; degrading to empty");
                        Vec::new()
                    }
                }
            };

            let knowledge = async {
                match timeout(per_fetch, self.client.fetch_knowledge(user_id, raw_query)).await {
                    Ok(Ok(items)) => items,
                    Ok(Err(e)) => {
                        warn!(user_id, error = %e, "knowledge query failed; degrading to empty");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(user_id, "knowledge query timed out; degrading to empty");
                        Vec::new()
                    }
                }
            };

            let episodes = async {
                match timeout(per_fetch, self.client.fetch_episodes(user_id, raw_query)).await {
                    Ok(Ok(items)) => items,
                    Ok(Err(e)) => {
                        warn!(user_id, error = %e, "episodic query failed; degrading to empty");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(user_id, "episodic query timed out; degrading to empty");
                        Vec::new()
                    }
                }
            };

            let (preferences, recent_turns, knowledge, episodes) =
                tokio::join!(preferences, recent_turns, knowledge, episodes);
            Context { preferences, recent_turns, knowledge, episodes }
        });

        match timeout(self.config.context_deadline, assembled).await {
            Ok(context) => context,
            Err(_) => {
                warn!(user_id, "context deadline exceeded; proceeding with empty context");
                Context::default()
            }
        }
    }

    /// Whether the memory service currently answers its health probe.
    pub async fn service_available(&self) -> bool {
        self.client.check_health().await
    }

    /// The whole-context deadline this builder enforces.
    pub fn context_deadline(&self) -> std::time::Duration {
        self.config.context_deadline
    }
}
