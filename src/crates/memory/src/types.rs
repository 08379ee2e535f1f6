//! Context value and the untrusted wire shapes it is built from.
//!
//! Every field of every response is optional on the wire: missing fields
//! default, unknown fields are ignored. The service is outside this
//! process's trust boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of recent conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

/// One retrieved knowledge fact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relevance: f64,
}

/// One semantically similar past episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub similarity: f64,
}

/// Everything the memory service contributed to one request.
///
/// Structurally always valid: any subset of fields may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    /// User settings (timezone, language, notification channels, ...).
    pub preferences: Map<String, Value>,

    /// Most recent conversation turns, oldest first.
    pub recent_turns: Vec<ConversationTurn>,

    /// Retrieved knowledge facts.
    pub knowledge: Vec<KnowledgeItem>,

    /// Semantically retrieved past episodes.
    pub episodes: Vec<Episode>,
}

impl Context {
    /// Whether nothing was retrieved at all.
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
            && self.recent_turns.is_empty()
            && self.knowledge.is_empty()
            && self.episodes.is_empty()
    }

    /// Render the stable, high-signal sections: preferences and recent
    /// turns. These come first in the prompt and are not subject to the
    /// retrieval character budget.
    pub fn render_stable(&self) -> String {
        let mut lines = Vec::new();

        if !self.preferences.is_empty() {
            lines.push("User Preferences:".to_string());
            for (key, value) in &self.preferences {
                lines.push(format!("  - {}: {}", key, render_value(value)));
            }
        }

        if !self.recent_turns.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("Recent Conversation:".to_string());
            for turn in &self.recent_turns {
                lines.push(format!("  {}: {}", turn.role, turn.content));
            }
        }

        lines.join("\n")
    }

    /// Render the knowledge section, empty string when there is none.
    pub fn render_knowledge(&self) -> String {
        if self.knowledge.is_empty() {
            return String::new();
        }
        let mut lines = vec!["Relevant Knowledge:".to_string()];
        for item in &self.knowledge {
            lines.push(format!("  - {}", item.text));
        }
        lines.join("\n")
    }

    /// Render the episodes section, empty string when there is none.
    pub fn render_episodes(&self) -> String {
        if self.episodes.is_empty() {
            return String::new();
        }
        let mut lines = vec!["Related Past Events:".to_string()];
        for episode in &self.episodes {
            lines.push(format!("  - {}", episode.text));
        }
        lines.join("\n")
    }

    /// Shrink retrieval content (knowledge + episodes) to fit a combined
    /// character budget by repeatedly dropping the longest remaining item.
    ///
    /// Longest-first keeps more distinct facts in the prompt than
    /// tail-truncation would.
    pub fn truncate_retrieval(&mut self, max_chars: usize) {
        fn longest(texts: impl Iterator<Item = usize>) -> Option<(usize, usize)> {
            texts.enumerate().max_by_key(|&(_, len)| len)
        }

        loop {
            let total: usize = self.knowledge.iter().map(|k| k.text.len()).sum::<usize>()
                + self.episodes.iter().map(|e| e.text.len()).sum::<usize>();
            if total <= max_chars {
                return;
            }

            let knowledge = longest(self.knowledge.iter().map(|k| k.text.len()));
            let episode = longest(self.episodes.iter().map(|e| e.text.len()));

            match (knowledge, episode) {
                (Some((ki, klen)), Some((_, elen))) if klen >= elen => {
                    self.knowledge.remove(ki);
                }
                (_, Some((ei, _))) => {
                    self.episodes.remove(ei);
                }
                (Some((ki, _)), None) => {
                    self.knowledge.remove(ki);
                }
                (None, None) => return,
            }
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
