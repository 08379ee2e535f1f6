//! The closed tool catalog.

use crate::schema::{ParamKind, ParamSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base risk classification of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Safe; no confirmation needed.
    Low,
    /// Logged but allowed.
    Medium,
    /// Requires user confirmation.
    High,
    /// Requires explicit authorization.
    Critical,
}

impl RiskLevel {
    /// Base numeric risk contribution for this class.
    pub fn base_score(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.1,
            RiskLevel::Medium => 0.4,
            RiskLevel::High => 0.7,
            RiskLevel::Critical => 1.0,
        }
    }

    /// Canonical upper-case name.
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every capability the planner may schedule.
///
/// The set is closed: action names from the language model resolve against
/// it case-insensitively and exactly, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolType {
    OpenApplication,
    CloseApplication,
    SwitchApplication,
    SystemControl,
    VolumeControl,
    BrightnessControl,
    Screenshot,
    WebSearch,
    FileSearch,
    GetWeather,
    GetNews,
    GetTime,
    Calculator,
    DatabaseQuery,
    SendEmail,
    SendMessage,
    MakeCall,
    MediaPlayer,
    SmartHomeControl,
    Navigation,
    Calendar,
    SetReminder,
    NoteTaking,
    SetTimer,
    SetAlarm,
    UnitConverter,
}

/// All catalog tools, in manifest order.
pub const ALL_TOOLS: [ToolType; 26] = [
    ToolType::OpenApplication,
    ToolType::CloseApplication,
    ToolType::SwitchApplication,
    ToolType::SystemControl,
    ToolType::VolumeControl,
    ToolType::BrightnessControl,
    ToolType::Screenshot,
    ToolType::WebSearch,
    ToolType::FileSearch,
    ToolType::GetWeather,
    ToolType::GetNews,
    ToolType::GetTime,
    ToolType::Calculator,
    ToolType::DatabaseQuery,
    ToolType::SendEmail,
    ToolType::SendMessage,
    ToolType::MakeCall,
    ToolType::MediaPlayer,
    ToolType::SmartHomeControl,
    ToolType::Navigation,
    ToolType::Calendar,
    ToolType::SetReminder,
    ToolType::NoteTaking,
    ToolType::SetTimer,
    ToolType::SetAlarm,
    ToolType::UnitConverter,
];

impl ToolType {
    /// Canonical SCREAMING_SNAKE_CASE name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolType::OpenApplication => "OPEN_APPLICATION",
            ToolType::CloseApplication => "CLOSE_APPLICATION",
            ToolType::SwitchApplication => "SWITCH_APPLICATION",
            ToolType::SystemControl => "SYSTEM_CONTROL",
            ToolType::VolumeControl => "VOLUME_CONTROL",
            ToolType::BrightnessControl => "BRIGHTNESS_CONTROL",
            ToolType::Screenshot => "SCREENSHOT",
            ToolType::WebSearch => "WEB_SEARCH",
            ToolType::FileSearch => "FILE_SEARCH",
            ToolType::GetWeather => "GET_WEATHER",
            ToolType::GetNews => "GET_NEWS",
            ToolType::GetTime => "GET_TIME",
            ToolType::Calculator => "CALCULATOR",
            ToolType::DatabaseQuery => "DATABASE_QUERY",
            ToolType::SendEmail => "SEND_EMAIL",
            ToolType::SendMessage => "SEND_MESSAGE",
            ToolType::MakeCall => "MAKE_CALL",
            ToolType::MediaPlayer => "MEDIA_PLAYER",
            ToolType::SmartHomeControl => "SMART_HOME_CONTROL",
            ToolType::Navigation => "NAVIGATION",
            ToolType::Calendar => "CALENDAR",
            ToolType::SetReminder => "SET_REMINDER",
            ToolType::NoteTaking => "NOTE_TAKING",
            ToolType::SetTimer => "SET_TIMER",
            ToolType::SetAlarm => "SET_ALARM",
            ToolType::UnitConverter => "UNIT_CONVERTER",
        }
    }

    /// One-line description used in the prompt manifest.
    pub fn description(&self) -> &'static str {
        match self {
            ToolType::OpenApplication => "Open or launch an application",
            ToolType::CloseApplication => "Close or quit an application",
            ToolType::SwitchApplication => "Switch focus to another application",
            ToolType::SystemControl => "Control system operations (lock, sleep, restart)",
            ToolType::VolumeControl => "Adjust system volume",
            ToolType::BrightnessControl => "Adjust screen brightness",
            ToolType::Screenshot => "Capture a screenshot",
            ToolType::WebSearch => "Search the internet",
            ToolType::FileSearch => "Search local files",
            ToolType::GetWeather => "Get weather information for a location",
            ToolType::GetNews => "Fetch news headlines",
            ToolType::GetTime => "Get the current time and date",
            ToolType::Calculator => "Evaluate a mathematical expression",
            ToolType::DatabaseQuery => "Run a read query against the personal database",
            ToolType::SendEmail => "Send an email message",
            ToolType::SendMessage => "Send a text message",
            ToolType::MakeCall => "Place a phone call",
            ToolType::MediaPlayer => "Control media playback",
            ToolType::SmartHomeControl => "Control smart home devices",
            ToolType::Navigation => "Get directions to a destination",
            ToolType::Calendar => "Manage calendar events",
            ToolType::SetReminder => "Create a reminder",
            ToolType::NoteTaking => "Take a note",
            ToolType::SetTimer => "Start a countdown timer",
            ToolType::SetAlarm => "Set an alarm",
            ToolType::UnitConverter => "Convert between units",
        }
    }

    /// Base risk class, before parameter and context adjustments.
    pub fn base_risk(&self) -> RiskLevel {
        match self {
            ToolType::GetWeather
            | ToolType::GetNews
            | ToolType::GetTime
            | ToolType::WebSearch
            | ToolType::FileSearch
            | ToolType::Calculator
            | ToolType::UnitConverter
            | ToolType::Screenshot
            | ToolType::MediaPlayer
            | ToolType::VolumeControl
            | ToolType::BrightnessControl
            | ToolType::Navigation
            | ToolType::NoteTaking => RiskLevel::Low,

            ToolType::OpenApplication
            | ToolType::CloseApplication
            | ToolType::SwitchApplication
            | ToolType::Calendar
            | ToolType::SetReminder
            | ToolType::SetTimer
            | ToolType::SetAlarm
            | ToolType::SmartHomeControl => RiskLevel::Medium,

            ToolType::SendEmail
            | ToolType::SendMessage
            | ToolType::MakeCall
            | ToolType::DatabaseQuery => RiskLevel::High,

            ToolType::SystemControl => RiskLevel::Critical,
        }
    }

    /// Whether the tool always needs user confirmation, independent of the
    /// computed risk level.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            ToolType::SendEmail
                | ToolType::SendMessage
                | ToolType::MakeCall
                | ToolType::SystemControl
        )
    }

    /// Tools whose parameters reach an OS shell or process launcher.
    /// Shell metacharacter checks apply to their text arguments.
    pub fn os_class(&self) -> bool {
        matches!(
            self,
            ToolType::OpenApplication
                | ToolType::CloseApplication
                | ToolType::SwitchApplication
                | ToolType::SystemControl
                | ToolType::Screenshot
                | ToolType::FileSearch
        )
    }

    /// Parameter schema, in declaration order.
    pub fn parameters(&self) -> &'static [ParamSpec] {
        use ParamKind::*;

        match self {
            ToolType::OpenApplication => {
                const P: &[ParamSpec] = &[ParamSpec::required("app_name", Text)];
                P
            }
            ToolType::CloseApplication => {
                const P: &[ParamSpec] = &[ParamSpec::required("app_name", Text)];
                P
            }
            ToolType::SwitchApplication => {
                const P: &[ParamSpec] = &[ParamSpec::required("app_name", Text)];
                P
            }
            ToolType::SystemControl => {
                const P: &[ParamSpec] = &[ParamSpec::required("action", Text)];
                P
            }
            ToolType::VolumeControl => {
                const P: &[ParamSpec] = &[ParamSpec::optional("level", Number), ParamSpec::optional("direction", Text)];
                P
            }
            ToolType::BrightnessControl => {
                const P: &[ParamSpec] = &[ParamSpec::optional("level", Number)];
                P
            }
            ToolType::Screenshot => &[],
            ToolType::WebSearch => {
                const P: &[ParamSpec] = &[ParamSpec::required("query", Text)];
                P
            }
            ToolType::FileSearch => {
                const P: &[ParamSpec] = &[ParamSpec::required("query", Text), ParamSpec::optional("path", Path)];
                P
            }
            ToolType::GetWeather => {
                const P: &[ParamSpec] = &[ParamSpec::required("location", Text)];
                P
            }
            ToolType::GetNews => {
                const P: &[ParamSpec] = &[ParamSpec::optional("topic", Text)];
                P
            }
            ToolType::GetTime => {
                const P: &[ParamSpec] = &[ParamSpec::optional("timezone", Text)];
                P
            }
            ToolType::Calculator => {
                const P: &[ParamSpec] = &[ParamSpec::required("expression", Text)];
                P
            }
            ToolType::DatabaseQuery => {
                const P: &[ParamSpec] = &[ParamSpec::required("query", Text)];
                P
            }
            ToolType::SendEmail => {
                const P: &[ParamSpec] =
                    &[ParamSpec::required("to", Email), ParamSpec::optional("subject", Text), ParamSpec::optional("body", Text)];
                P
            }
            ToolType::SendMessage => {
                const P: &[ParamSpec] = &[ParamSpec::required("to", Phone), ParamSpec::required("message", Text)];
                P
            }
            ToolType::MakeCall => {
                const P: &[ParamSpec] = &[ParamSpec::required("contact", Phone)];
                P
            }
            ToolType::MediaPlayer => {
                const P: &[ParamSpec] =
                    &[ParamSpec::optional("action", Text), ParamSpec::optional("media_title", Text), ParamSpec::optional("artist", Text)];
                P
            }
            ToolType::SmartHomeControl => {
                const P: &[ParamSpec] =
                    &[ParamSpec::required("device", Text), ParamSpec::optional("action", Text), ParamSpec::optional("temperature", Number)];
                P
            }
            ToolType::Navigation => {
                const P: &[ParamSpec] = &[ParamSpec::required("destination", Text)];
                P
            }
            ToolType::Calendar => {
                const P: &[ParamSpec] = &[ParamSpec::optional("title", Text), ParamSpec::optional("time", Text)];
                P
            }
            ToolType::SetReminder => {
                const P: &[ParamSpec] = &[ParamSpec::required("text", Text), ParamSpec::optional("time", Text)];
                P
            }
            ToolType::NoteTaking => {
                const P: &[ParamSpec] = &[ParamSpec::required("content", Text)];
                P
            }
            ToolType::SetTimer => {
                const P: &[ParamSpec] = &[ParamSpec::required("duration", Duration)];
                P
            }
            ToolType::SetAlarm => {
                const P: &[ParamSpec] = &[ParamSpec::required("time", Text)];
                P
            }
            ToolType::UnitConverter => {
                const P: &[ParamSpec] =
                    &[ParamSpec::required("value", Number), ParamSpec::required("from_unit", Text), ParamSpec::required("to_unit", Text)];
                P
            }
        }
    }

    /// Look up the schema entry for a parameter name.
    pub fn param_spec(&self, name: &str) -> Option<&'static ParamSpec> {
        self.parameters().iter().find(|spec| spec.name == name)
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twenty_six_tools() {
        assert_eq!(ALL_TOOLS.len(), 26);
    }

    #[test]
    fn names_are_unique_and_screaming_snake() {
        let mut seen = std::collections::HashSet::new();
        for tool in ALL_TOOLS {
            assert!(seen.insert(tool.name()), "duplicate name {}", tool.name());
            assert!(
                tool.name().chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "non-canonical name {}",
                tool.name()
            );
        }
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&ToolType::GetWeather).unwrap();
        assert_eq!(json, "\"GET_WEATHER\"");
        let back: ToolType = serde_json::from_str("\"SEND_EMAIL\"").unwrap();
        assert_eq!(back, ToolType::SendEmail);
    }

    #[test]
    fn risk_levels_order_and_scores() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert_eq!(RiskLevel::Low.base_score(), 0.1);
        assert_eq!(RiskLevel::Critical.base_score(), 1.0);
    }

    #[test]
    fn confirmation_tools_are_communication_or_system() {
        for tool in ALL_TOOLS {
            if tool.requires_confirmation() {
                assert!(
                    tool.base_risk() >= RiskLevel::High,
                    "{} requires confirmation but is {} risk",
                    tool,
                    tool.base_risk()
                );
            }
        }
    }

    #[test]
    fn every_tool_has_a_description() {
        for tool in ALL_TOOLS {
            assert!(!tool.description().is_empty());
        }
    }

    #[test]
    fn param_spec_lookup() {
        let spec = ToolType::SendEmail.param_spec("to").unwrap();
        assert_eq!(spec.kind, ParamKind::Email);
        assert!(spec.required);
        assert!(ToolType::SendEmail.param_spec("cc").is_none());
    }
}
