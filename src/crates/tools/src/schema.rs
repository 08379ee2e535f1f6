//! Parameter schemas for catalog tools.

use serde::{Deserialize, Serialize};

/// The kind of value a parameter carries.
///
/// Kinds drive both type coercion during extraction and the safety
/// validator's per-parameter checks (URL policy applies to `Url`, path
/// traversal checks to `Path`, PII masking to free-form `Text`; `Email`
/// and `Phone` parameters carry their category by design and are exempt
/// from masking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free-form text.
    Text,
    /// Numeric value.
    Number,
    /// Boolean flag.
    Boolean,
    /// Email address.
    Email,
    /// Phone number or contact handle.
    Phone,
    /// URL.
    Url,
    /// Filesystem path.
    Path,
    /// A duration, either as text ("10 minutes") or a structured object.
    Duration,
}

/// Schema entry for one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Parameter name as it appears in action input and entities.
    pub name: &'static str,

    /// Value kind.
    pub kind: ParamKind,

    /// Whether the parameter must be present for the tool to run.
    pub required: bool,
}

impl ParamSpec {
    /// Required parameter of the given kind.
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: true }
    }

    /// Optional parameter of the given kind.
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_required_flag() {
        let spec = ParamSpec::required("query", ParamKind::Text);
        assert!(spec.required);
        let spec = ParamSpec::optional("limit", ParamKind::Number);
        assert!(!spec.required);
    }
}
