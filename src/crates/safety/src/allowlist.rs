//! Tool allow and block lists.

use std::collections::HashSet;
use tools::{ToolType, ALL_TOOLS};

/// Operation names that are never admitted, regardless of the allow list.
///
/// These are destructive capabilities; some exist outside the current
/// catalog and are listed so a future catalog addition cannot slip past
/// the validator unreviewed.
pub const DEFAULT_BLOCKED: &[&str] = &[
    "SYSTEM_SHUTDOWN",
    "SYSTEM_RESTART",
    "FORMAT_DRIVE",
    "DELETE_FILE",
    "ADMIN_COMMAND",
    "DATABASE_MODIFY",
    "USER_ACCOUNT_MODIFY",
];

/// Allow/block decision lists over canonical tool names.
#[derive(Debug, Clone)]
pub struct AllowPolicy {
    allowed: HashSet<String>,
    blocked: HashSet<String>,
}

impl Default for AllowPolicy {
    /// All catalog tools allowed; the destructive set blocked.
    fn default() -> Self {
        Self {
            allowed: ALL_TOOLS.iter().map(|t| t.name().to_string()).collect(),
            blocked: DEFAULT_BLOCKED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AllowPolicy {
    /// Whether the tool is explicitly blocked. Blocked wins over allowed.
    pub fn is_blocked(&self, tool: ToolType) -> bool {
        self.blocked.contains(tool.name())
    }

    /// Whether the tool is on the allow list (and not blocked).
    pub fn is_allowed(&self, tool: ToolType) -> bool {
        !self.is_blocked(tool) && self.allowed.contains(tool.name())
    }

    /// Remove a tool from the allow list.
    pub fn disallow(mut self, tool: ToolType) -> Self {
        self.allowed.remove(tool.name());
        self
    }

    /// Add a tool to the block list.
    pub fn block(mut self, tool: ToolType) -> Self {
        self.blocked.insert(tool.name().to_string());
        self
    }

    /// Sorted canonical names of allowed tools.
    pub fn allowed_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.allowed.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_allows_the_whole_catalog() {
        let policy = AllowPolicy::default();
        for tool in ALL_TOOLS {
            assert!(policy.is_allowed(tool), "{} should be allowed by default", tool);
        }
    }

    #[test]
    fn disallowed_tool_is_no_longer_allowed() {
        let policy = AllowPolicy::default().disallow(ToolType::GetWeather);
        assert!(!policy.is_allowed(ToolType::GetWeather));
        assert!(!policy.is_blocked(ToolType::GetWeather));
    }

    #[test]
    fn blocked_wins_over_allowed() {
        let policy = AllowPolicy::default().block(ToolType::SystemControl);
        assert!(policy.is_blocked(ToolType::SystemControl));
        assert!(!policy.is_allowed(ToolType::SystemControl));
    }

    #[test]
    fn allowed_tools_is_sorted() {
        let policy = AllowPolicy::default();
        let names = policy.allowed_tools();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), ALL_TOOLS.len());
    }
}
