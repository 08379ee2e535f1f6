//! Tool catalog for the reasoning core.
//!
//! The catalog is a closed set: every capability the planner may schedule is
//! one of the [`ToolType`] variants, each carrying a description, a
//! parameter schema, a base risk class, and a confirmation flag. Action
//! names emitted by the language model resolve against this catalog by
//! exact case-insensitive match — a hallucinated tool is rejected, never
//! fuzzily corrected, so the reasoning loop sees the rejection and can
//! choose differently.

pub mod catalog;
pub mod error;
pub mod schema;
pub mod selector;

pub use catalog::{RiskLevel, ToolType, ALL_TOOLS};
pub use error::SelectorError;
pub use schema::{ParamKind, ParamSpec};
pub use selector::{candidates, extract_parameters, lookup, manifest};
