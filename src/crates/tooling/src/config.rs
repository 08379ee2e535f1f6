//! Environment variable loading utilities
//!
//! Every configurable knob in the workspace is surfaced as an environment
//! variable. These helpers read, parse, and default them consistently so the
//! per-crate `from_env()` constructors stay one-liners.

use crate::{Result, ToolingError};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Read an environment variable, returning `None` when unset.
///
/// Returns an error only when the variable exists but is not valid UTF-8.
pub fn env_var(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ToolingError::General(format!(
            "environment variable {} is not valid UTF-8",
            key
        ))),
    }
}

/// Read an environment variable with a fallback value.
pub fn env_or(key: &str, default: impl Into<String>) -> Result<String> {
    Ok(env_var(key)?.unwrap_or_else(|| default.into()))
}

/// Read and parse an environment variable with a fallback value.
///
/// # Example
///
/// ```rust
/// use tooling::config::env_parse_or;
///
/// let iterations: usize = env_parse_or("REASON_MAX_ITERATIONS", 10).unwrap();
/// assert_eq!(iterations, 10);
/// ```
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key)? {
        Some(val) => val.parse::<T>().map_err(|e| {
            ToolingError::General(format!("failed to parse environment variable {}: {}", key, e))
        }),
        None => Ok(default),
    }
}

/// Read a boolean environment variable with a fallback value.
///
/// Recognizes "true"/"1"/"yes"/"on" and "false"/"0"/"no"/"off",
/// case-insensitively.
pub fn env_bool_or(key: &str, default: bool) -> Result<bool> {
    match env_var(key)? {
        Some(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ToolingError::General(format!(
                "invalid boolean value for {}: {}",
                key, other
            ))),
        },
        None => Ok(default),
    }
}

/// Read a millisecond-denominated environment variable as a [`Duration`].
///
/// Timeout knobs are exported as `*_MS` variables; this keeps the conversion
/// in one place.
pub fn env_duration_ms_or(key: &str, default: Duration) -> Result<Duration> {
    let millis: u64 = env_parse_or(key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

/// Read a comma-separated environment variable as a list of trimmed strings.
///
/// Empty segments are dropped; an unset variable yields the default.
pub fn env_list_or(key: &str, default: &[&str]) -> Result<Vec<String>> {
    match env_var(key)? {
        Some(val) => Ok(val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        None => Ok(default.iter().map(|s| s.to_string()).collect()),
    }
}
