//! Error types for tool resolution and parameter extraction.

use thiserror::Error;

/// Errors from resolving an action against the catalog.
///
/// Both variants are recoverable at the planner level: they become
/// observations in the scratchpad rather than aborting the plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The action name does not match any catalog tool.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Required parameters were found neither in the action input nor in
    /// the extracted entities.
    #[error("missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_lists_names() {
        let err = SelectorError::MissingParameters(vec!["to".into(), "body".into()]);
        assert_eq!(err.to_string(), "missing required parameters: to, body");
    }

    #[test]
    fn unknown_tool_names_the_offender() {
        let err = SelectorError::UnknownTool("LAUNCH_MISSILES".into());
        assert!(err.to_string().contains("LAUNCH_MISSILES"));
    }
}
