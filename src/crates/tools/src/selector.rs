//! Intent resolution and parameter extraction.
//!
//! The intent→tool mapping only hints the prompt; the tool actually invoked
//! each iteration is whatever the model emits, validated by [`lookup`].

use crate::catalog::{ToolType, ALL_TOOLS};
use crate::error::SelectorError;
use crate::schema::ParamKind;
use serde_json::{Map, Value};

/// Candidate tools for a classified intent.
///
/// Static mapping; unknown intents yield an empty slice. The candidates are
/// rendered into the prompt as a hint — the full catalog stays available so
/// the planner can recover from a mis-classified intent.
pub fn candidates(intent_name: &str) -> &'static [ToolType] {
    match intent_name {
        "open_app" | "open_application" => &[ToolType::OpenApplication],
        "close_app" | "close_application" => &[ToolType::CloseApplication],
        "switch_app" => &[ToolType::SwitchApplication],
        "open_application_and_search" => &[ToolType::OpenApplication, ToolType::WebSearch],

        "lock_screen" | "restart_system" | "sleep_system" => &[ToolType::SystemControl],
        "increase_volume" | "decrease_volume" | "mute_volume" | "unmute_volume" => {
            &[ToolType::VolumeControl]
        }
        "increase_brightness" | "decrease_brightness" => &[ToolType::BrightnessControl],
        "take_screenshot" => &[ToolType::Screenshot],

        "search_web" | "web_search" => &[ToolType::WebSearch],
        "search_files" => &[ToolType::FileSearch],
        "get_weather" => &[ToolType::GetWeather],
        "get_news" => &[ToolType::GetNews],
        "get_time" => &[ToolType::GetTime],
        "calculate" => &[ToolType::Calculator],
        "database_query" => &[ToolType::DatabaseQuery],

        "send_email" => &[ToolType::SendEmail],
        "send_message" => &[ToolType::SendMessage],
        "make_call" => &[ToolType::MakeCall],

        "play_music" | "play_video" | "pause_media" | "resume_media" | "next_track"
        | "previous_track" | "stop_media" => &[ToolType::MediaPlayer],

        "turn_on_lights" | "turn_off_lights" | "dim_lights" | "set_temperature"
        | "lock_door" | "unlock_door" => &[ToolType::SmartHomeControl],

        "get_directions" | "find_location" | "find_nearby" => &[ToolType::Navigation],

        "schedule_meeting" | "check_calendar" => &[ToolType::Calendar],
        "create_reminder" | "list_reminders" | "delete_reminder" => &[ToolType::SetReminder],
        "take_note" | "read_note" => &[ToolType::NoteTaking],
        "set_timer" => &[ToolType::SetTimer],
        "set_alarm" => &[ToolType::SetAlarm],
        "convert_units" => &[ToolType::UnitConverter],

        _ => &[],
    }
}

/// Resolve an action name from the model against the catalog.
///
/// Case-insensitive exact match on the canonical name, surrounding
/// whitespace tolerated. No fuzzy resolution: hallucinated tools must be
/// rejected so the loop learns from the observation.
pub fn lookup(action_name: &str) -> Result<ToolType, SelectorError> {
    let needle = action_name.trim();
    ALL_TOOLS
        .iter()
        .find(|tool| tool.name().eq_ignore_ascii_case(needle))
        .copied()
        .ok_or_else(|| SelectorError::UnknownTool(needle.to_string()))
}

/// Render the full catalog for the prompt, one tool per line.
pub fn manifest() -> String {
    let mut lines = Vec::with_capacity(ALL_TOOLS.len() + 1);
    lines.push("Available Tools:".to_string());
    for tool in ALL_TOOLS {
        lines.push(format!("  - {}: {}", tool.name(), tool.description()));
    }
    lines.join("\n")
}

/// Build the effective parameter map for a tool invocation.
///
/// Starts from the model's `action_input`; required parameters missing
/// there fall back to same-named entity fields. Fields outside the tool's
/// schema are dropped; values are coerced to the schema kind where a
/// lossless coercion exists.
pub fn extract_parameters(
    tool: ToolType,
    entities: &Map<String, Value>,
    action_input: &Map<String, Value>,
) -> Result<Map<String, Value>, SelectorError> {
    let mut params = Map::new();
    let mut missing = Vec::new();

    for spec in tool.parameters() {
        let raw = action_input.get(spec.name).or_else(|| entities.get(spec.name));

        match raw {
            Some(value) => {
                if let Some(coerced) = coerce(value, spec.kind) {
                    params.insert(spec.name.to_string(), coerced);
                } else if spec.required {
                    missing.push(spec.name.to_string());
                }
            }
            None if spec.required => missing.push(spec.name.to_string()),
            None => {}
        }
    }

    if missing.is_empty() {
        Ok(params)
    } else {
        Err(SelectorError::MissingParameters(missing))
    }
}

/// Coerce a JSON value to a parameter kind. Returns `None` when no sensible
/// coercion exists (treated as absent).
fn coerce(value: &Value, kind: ParamKind) -> Option<Value> {
    match kind {
        ParamKind::Text | ParamKind::Email | ParamKind::Phone | ParamKind::Url
        | ParamKind::Path => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ParamKind::Number => match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(|n| {
                serde_json::Number::from_f64(n).map(Value::Number)
            }),
            _ => None,
        },
        ParamKind::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        // Durations arrive as text ("10 minutes"), numbers (seconds), or
        // structured objects ({"amount": 10, "unit": "minutes"}); all pass
        // through for the executor to interpret.
        ParamKind::Duration => match value {
            Value::String(_) | Value::Number(_) | Value::Object(_) => Some(value.clone()),
            _ => None,
        },
    }
}
