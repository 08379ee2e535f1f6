//! Parameter sanitization.
//!
//! Per-parameter checks keyed off the tool's schema. Injection-shaped
//! input blocks the call outright; content that can be made safe by
//! removal (XSS fragments) is scrubbed and the result marked sanitized.
//! Scrubbing is idempotent.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tools::{ParamKind, ToolType};

/// SQL injection fragments. Matching is case-insensitive; the canonical
/// spelling appears in the block reason.
const SQL_PATTERNS: &[&str] = &[
    ";--",
    "DROP TABLE",
    "DROP DATABASE",
    "UNION SELECT",
    "OR 1=1",
    "XP_CMDSHELL",
    "; EXEC",
];

/// Shell metacharacters, checked in arguments of OS-class tools.
const SHELL_METACHARACTERS: &[char] = &[';', '|', '&', '`', '>', '<'];

/// Path fragments that indicate traversal or a protected location.
const PATH_PATTERNS: &[&str] = &["..", "/etc", "/root", "c:\\windows"];

static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<script[^>]*>").expect("script tag pattern")
});

static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("javascript scheme pattern"));

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("event handler pattern"));

/// URL admission policy.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Development escape hatch: allow plain-HTTP localhost URLs.
    pub allow_http_localhost: bool,
    /// Domains rejected by substring match.
    pub blocked_domains: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self { allow_http_localhost: true, blocked_domains: Vec::new() }
    }
}

/// Result of sanitizing one parameter map.
#[derive(Debug, Clone)]
pub enum SanitizeOutcome {
    /// Nothing suspicious; parameters unchanged.
    Clean(Map<String, Value>),
    /// Suspicious-but-removable content was scrubbed.
    Scrubbed { parameters: Map<String, Value>, warnings: Vec<String> },
    /// Injection-shaped input; the call must not run.
    Rejected { reason: String },
}

/// Run every sanitizer over a tool's parameters.
///
/// Order per parameter: SQL, shell, path, URL (each can reject), then XSS
/// scrubbing (never rejects). The first rejection wins.
pub fn sanitize_parameters(
    tool: ToolType,
    parameters: &Map<String, Value>,
    url_policy: &UrlPolicy,
) -> SanitizeOutcome {
    let mut sanitized = Map::new();
    let mut warnings = Vec::new();

    for (key, value) in parameters {
        let Some(text) = value.as_str() else {
            sanitized.insert(key.clone(), value.clone());
            continue;
        };

        let kind = tool.param_spec(key).map(|spec| spec.kind);

        if let Some(pattern) = find_sql_pattern(text) {
            return SanitizeOutcome::Rejected {
                reason: format!("SQL injection pattern '{}' in parameter '{}'", pattern, key),
            };
        }

        if tool.os_class() {
            if let Some(meta) = find_shell_metacharacter(text) {
                return SanitizeOutcome::Rejected {
                    reason: format!(
                        "shell metacharacter '{}' in parameter '{}' of {}",
                        meta, key, tool
                    ),
                };
            }
        }

        if kind == Some(ParamKind::Path) {
            if let Some(pattern) = find_path_pattern(text) {
                return SanitizeOutcome::Rejected {
                    reason: format!("path pattern '{}' in parameter '{}'", pattern, key),
                };
            }
        }

        if kind == Some(ParamKind::Url) {
            if let Err(reason) = check_url(text, url_policy) {
                return SanitizeOutcome::Rejected {
                    reason: format!("{} in parameter '{}'", reason, key),
                };
            }
        }

        let scrubbed = scrub_xss(text);
        if scrubbed != text {
            warnings.push(format!("removed script content from parameter '{}'", key));
        }
        sanitized.insert(key.clone(), Value::String(scrubbed));
    }

    if warnings.is_empty() {
        SanitizeOutcome::Clean(sanitized)
    } else {
        SanitizeOutcome::Scrubbed { parameters: sanitized, warnings }
    }
}

fn find_sql_pattern(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();
    SQL_PATTERNS.iter().copied().find(|pattern| upper.contains(pattern))
}

fn find_shell_metacharacter(text: &str) -> Option<String> {
    if text.contains("$(") {
        return Some("$(".to_string());
    }
    text.chars().find(|c| SHELL_METACHARACTERS.contains(c)).map(|c| c.to_string())
}

fn find_path_pattern(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    PATH_PATTERNS
        .iter()
        .copied()
        .find(|pattern| if *pattern == ".." { lower.contains("..") } else { lower.starts_with(pattern) })
}

/// Remove XSS-shaped fragments. Idempotent by construction: the removed
/// fragments cannot re-match after removal.
pub fn scrub_xss(text: &str) -> String {
    let pass = SCRIPT_TAG.replace_all(text, "");
    let pass = JS_SCHEME.replace_all(&pass, "");
    EVENT_HANDLER.replace_all(&pass, "").into_owned()
}

fn check_url(url: &str, policy: &UrlPolicy) -> Result<(), String> {
    let lower = url.to_lowercase();

    let (scheme, rest) = match lower.split_once("://") {
        Some(parts) => parts,
        None => return Err("URL has no scheme".to_string()),
    };
    if scheme != "http" && scheme != "https" {
        return Err(format!("URL scheme '{}' is not allowed", scheme));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.split('@').last().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);

    let is_localhost = host == "localhost" || host == "127.0.0.1";
    if is_localhost && !policy.allow_http_localhost {
        return Err("localhost URLs are not allowed".to_string());
    }
    if is_private_address(host) {
        return Err(format!("private network address '{}' is not allowed", host));
    }

    for domain in &policy.blocked_domains {
        if host.contains(domain.to_lowercase().as_str()) {
            return Err(format!("blocked domain '{}'", domain));
        }
    }

    if scheme == "http" && !(is_localhost && policy.allow_http_localhost) {
        return Err("non-HTTPS URLs are not allowed".to_string());
    }

    Ok(())
}

fn is_private_address(host: &str) -> bool {
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some(second) = rest.split('.').next() {
            if let Ok(octet) = second.parse::<u8>() {
                return (16..=31).contains(&octet);
            }
        }
    }
    false
}
