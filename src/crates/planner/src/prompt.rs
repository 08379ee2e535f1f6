//! Prompt assembly with a hard character budget.
//!
//! Section order is fixed: preamble, tool manifest, context (stable block,
//! then knowledge, then episodes), the user query, the scratchpad in
//! chronological order, and the `Thought:` terminator. When the rendering
//! exceeds the budget, content is shed in a fixed ladder — oldest
//! scratchpad entries first, then the knowledge block, then the episodes
//! block. The preamble, manifest, query, and the most recent scratchpad
//! entry are never dropped.

use serde_json::Value;

/// Static instructions prefixed to every prompt.
pub const SYSTEM_PREAMBLE: &str = "\
You are the reasoning engine of a voice assistant. Work out how to fulfil \
the user's request step by step, using the tools listed below.

Respond in this exact format to use a tool:
Thought: <your reasoning>
Action: <TOOL_NAME>
Action Input: <JSON object with the tool's parameters>

Or, when the task is complete:
Thought: <your reasoning>
Final Answer: <your answer to the user>

Always end your response with either an Action or a Final Answer.";

/// One completed loop iteration as replayed to the model.
#[derive(Debug, Clone)]
pub struct ScratchpadEntry {
    pub thought: String,
    pub action: Option<String>,
    pub action_input: Option<Value>,
    pub observation: String,
}

impl ScratchpadEntry {
    /// An entry for a response that failed to parse or resolve: the raw
    /// text stands in for the thought, and the observation explains the
    /// error.
    pub fn recovery(raw: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            thought: raw.into(),
            action: None,
            action_input: None,
            observation: observation.into(),
        }
    }

    fn render(&self) -> String {
        let mut lines = vec![format!("Thought: {}", self.thought)];
        if let Some(action) = &self.action {
            lines.push(format!("Action: {}", action));
        }
        if let Some(input) = &self.action_input {
            lines.push(format!("Action Input: {}", input));
        }
        lines.push(format!("Observation: {}", self.observation));
        lines.join("\n")
    }
}

/// Pre-rendered prompt sections that stay fixed across iterations.
#[derive(Debug, Clone, Default)]
pub struct PromptParts {
    /// Tool manifest (full catalog plus the intent hint).
    pub manifest: String,
    /// Preferences and recent conversation.
    pub stable_context: String,
    /// Retrieved knowledge block.
    pub knowledge: String,
    /// Episodic recall block.
    pub episodes: String,
    /// The user's original query.
    pub raw_query: String,
}

/// Compose the iteration prompt, shedding content to fit `max_chars`.
pub fn compose(parts: &PromptParts, scratchpad: &[ScratchpadEntry], max_chars: usize) -> String {
    let mut skip = 0usize;
    let mut include_knowledge = true;
    let mut include_episodes = true;

    loop {
        let prompt =
            render(parts, &scratchpad[skip..], include_knowledge, include_episodes);
        if prompt.chars().count() <= max_chars {
            return prompt;
        }

        // Shedding ladder: oldest scratchpad entries, then knowledge, then
        // episodes. The most recent entry is immune.
        if skip + 1 < scratchpad.len() {
            skip += 1;
        } else if include_knowledge && !parts.knowledge.is_empty() {
            include_knowledge = false;
        } else if include_episodes && !parts.episodes.is_empty() {
            include_episodes = false;
        } else {
            return prompt;
        }
    }
}

fn render(
    parts: &PromptParts,
    scratchpad: &[ScratchpadEntry],
    include_knowledge: bool,
    include_episodes: bool,
) -> String {
    let mut sections = vec![SYSTEM_PREAMBLE.to_string(), parts.manifest.clone()];

    if !parts.stable_context.is_empty() {
        sections.push(parts.stable_context.clone());
    }
    if include_knowledge && !parts.knowledge.is_empty() {
        sections.push(parts.knowledge.clone());
    }
    if include_episodes && !parts.episodes.is_empty() {
        sections.push(parts.episodes.clone());
    }

    sections.push(format!("User Query: {}", parts.raw_query));

    for entry in scratchpad {
        sections.push(entry.render());
    }

    sections.push("Thought:".to_string());
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts() -> PromptParts {
        PromptParts {
            manifest: "Available Tools:\n  - GET_WEATHER: weather".to_string(),
            stable_context: "User Preferences:\n  - timezone: UTC".to_string(),
            knowledge: "Relevant Knowledge:\n  - fact".to_string(),
            episodes: "Related Past Events:\n  - episode".to_string(),
            raw_query: "weather in Paris?".to_string(),
        }
    }

    fn entry(i: usize) -> ScratchpadEntry {
        ScratchpadEntry {
            thought: format!("thought {}", i),
            action: Some("GET_WEATHER".to_string()),
            action_input: Some(json!({"location": "Paris"})),
            observation: format!("observation {}", i),
        }
    }

    #[test]
    fn sections_appear_in_the_specified_order() {
        let prompt = compose(&parts(), &[entry(0)], usize::MAX);

        let positions: Vec<usize> = [
            "You are the reasoning engine",
            "Available Tools:",
            "User Preferences:",
            "Relevant Knowledge:",
            "Related Past Events:",
            "User Query:",
            "thought 0",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "sections out of order");
        assert!(prompt.ends_with("Thought:"));
    }

    #[test]
    fn scratchpad_entries_render_in_chronological_order() {
        let prompt = compose(&parts(), &[entry(0), entry(1)], usize::MAX);
        assert!(prompt.find("thought 0").unwrap() < prompt.find("thought 1").unwrap());
    }

    #[test]
    fn oldest_scratchpad_entries_are_shed_first() {
        let p = parts();
        let scratchpad: Vec<ScratchpadEntry> = (0..10).map(entry).collect();
        let full = compose(&p, &scratchpad, usize::MAX);

        let prompt = compose(&p, &scratchpad, full.chars().count() - 1);
        assert!(!prompt.contains("thought 0"), "oldest entry should be shed");
        assert!(prompt.contains("thought 9"), "most recent entry must survive");
    }

    #[test]
    fn knowledge_is_shed_before_episodes() {
        let p = parts();
        let scratchpad = vec![entry(0)];

        // Budget small enough to force shedding past the scratchpad.
        let without_knowledge = render(&p, &scratchpad, false, true);
        let prompt = compose(&p, &scratchpad, without_knowledge.chars().count());
        assert!(!prompt.contains("Relevant Knowledge:"));
        assert!(prompt.contains("Related Past Events:"));
    }

    #[test]
    fn mandatory_sections_survive_an_impossible_budget() {
        let prompt = compose(&parts(), &[entry(0)], 1);
        assert!(prompt.contains("Available Tools:"));
        assert!(prompt.contains("User Query: weather in Paris?"));
        assert!(prompt.contains("thought 0"), "most recent entry is never dropped");
        assert!(!prompt.contains("Relevant Knowledge:"));
        assert!(!prompt.contains("Related Past Events:"));
    }

    #[test]
    fn recovery_entry_renders_without_action_lines() {
        let rendered = ScratchpadEntry::recovery("gibberish", "Error: no valid action").render();
        assert!(rendered.contains("Thought: gibberish"));
        assert!(rendered.contains("Observation: Error: no valid action"));
        assert!(!rendered.contains("Action:"));
    }

    #[test]
    fn empty_context_sections_are_omitted() {
        let p = PromptParts {
            manifest: "Available Tools:".to_string(),
            raw_query: "q".to_string(),
            ..PromptParts::default()
        };
        let prompt = compose(&p, &[], usize::MAX);
        assert!(!prompt.contains("User Preferences:"));
        assert!(!prompt.contains("Relevant Knowledge:"));
    }
}
