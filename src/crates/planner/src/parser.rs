//! Parser for the model's ReAct output grammar.
//!
//! Two accepted forms:
//!
//! ```text
//! Thought: <free text>
//! Action: <TOOL_NAME>
//! Action Input: <JSON object>
//! ```
//!
//! ```text
//! Thought: <free text>
//! Final Answer: <free text>
//! ```
//!
//! Parsing is line-oriented and tolerant of surrounding whitespace. Anything
//! else is a parse error — recovered by the planner as an observation, not a
//! failure.

use serde_json::{Map, Value};

/// A successfully parsed model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// Continue the loop with a tool invocation.
    Step { thought: String, action: String, action_input: Map<String, Value> },
    /// Terminate with an answer for the user.
    FinalAnswer { thought: String, answer: String },
}

const THOUGHT_TAG: &str = "Thought:";
const ACTION_TAG: &str = "Action:";
const ACTION_INPUT_TAG: &str = "Action Input:";
const FINAL_ANSWER_TAG: &str = "Final Answer:";

/// Parse one model response against the output grammar.
pub fn parse_response(text: &str) -> Result<ParsedResponse, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty response".to_string());
    }

    if let Some(index) = trimmed.find(FINAL_ANSWER_TAG) {
        let answer = trimmed[index + FINAL_ANSWER_TAG.len()..].trim().to_string();
        if answer.is_empty() {
            return Err("Final Answer is empty".to_string());
        }
        let thought = extract_thought(&trimmed[..index]);
        return Ok(ParsedResponse::FinalAnswer { thought, answer });
    }

    // Find the Action line. A plain substring search would land on
    // "Action Input:", so scan line starts.
    let action_line_start = find_line_starting_with(trimmed, ACTION_TAG)
        .ok_or_else(|| "no Action or Final Answer found".to_string())?;
    let action_line = trimmed[action_line_start..].lines().next().unwrap_or("");
    let action = action_line
        .trim_start()
        .strip_prefix(ACTION_TAG)
        .unwrap_or("")
        .trim()
        .to_string();
    if action.is_empty() {
        return Err("Action names no tool".to_string());
    }

    let input_index = trimmed
        .find(ACTION_INPUT_TAG)
        .ok_or_else(|| "Action without Action Input".to_string())?;
    let action_input = parse_input_object(&trimmed[input_index + ACTION_INPUT_TAG.len()..])?;

    let thought = extract_thought(&trimmed[..action_line_start]);
    Ok(ParsedResponse::Step { thought, action, action_input })
}

/// Byte offset of the first line that starts with `tag` (after leading
/// whitespace) but is not the Action Input line.
fn find_line_starting_with(text: &str, tag: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let lead = line.len() - line.trim_start().len();
        let rest = line.trim_start();
        if rest.starts_with(tag) && !rest.starts_with(ACTION_INPUT_TAG) {
            return Some(offset + lead);
        }
        offset += line.len();
    }
    None
}

/// The thought text preceding the action or final answer.
fn extract_thought(prefix: &str) -> String {
    match prefix.find(THOUGHT_TAG) {
        Some(index) => prefix[index + THOUGHT_TAG.len()..].trim().to_string(),
        None => prefix.trim().to_string(),
    }
}

/// Decode the first JSON value after the Action Input tag; it must be an
/// object. Text after the object (stray prose, partial stop sequences) is
/// tolerated.
fn parse_input_object(rest: &str) -> Result<Map<String, Value>, String> {
    let rest = rest.trim_start();
    let start = rest.find('{').ok_or_else(|| "Action Input is not a JSON object".to_string())?;

    let mut stream = serde_json::Deserializer::from_str(&rest[start..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(map))) => Ok(map),
        Some(Ok(_)) => Err("Action Input is not a JSON object".to_string()),
        Some(Err(e)) => Err(format!("Action Input is not valid JSON: {}", e)),
        None => Err("Action Input is not a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_step() {
        let text = "Thought: I need the weather for Paris.\n\
                    Action: GET_WEATHER\n\
                    Action Input: {\"location\": \"Paris\"}";
        match parse_response(text).unwrap() {
            ParsedResponse::Step { thought, action, action_input } => {
                assert_eq!(thought, "I need the weather for Paris.");
                assert_eq!(action, "GET_WEATHER");
                assert_eq!(action_input["location"], json!("Paris"));
            }
            other => panic!("expected step, got {:?}", other),
        }
    }

    #[test]
    fn parses_a_final_answer() {
        let text = "Thought: I have everything I need.\n\
                    Final Answer: The weather in Paris is 20°C and partly cloudy.";
        match parse_response(text).unwrap() {
            ParsedResponse::FinalAnswer { thought, answer } => {
                assert_eq!(thought, "I have everything I need.");
                assert_eq!(answer, "The weather in Paris is 20°C and partly cloudy.");
            }
            other => panic!("expected final answer, got {:?}", other),
        }
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let text = "\n\n   Thought: ok \n  Action:   WEB_SEARCH  \n Action Input:  {\"query\": \"rust\"}  \n\n";
        match parse_response(text).unwrap() {
            ParsedResponse::Step { action, action_input, .. } => {
                assert_eq!(action, "WEB_SEARCH");
                assert_eq!(action_input["query"], json!("rust"));
            }
            other => panic!("expected step, got {:?}", other),
        }
    }

    #[test]
    fn multiline_action_input_is_accepted() {
        let text = "Thought: t\nAction: SEND_EMAIL\nAction Input: {\n  \"to\": \"a@b.c\",\n  \"subject\": \"hi\"\n}";
        match parse_response(text).unwrap() {
            ParsedResponse::Step { action_input, .. } => {
                assert_eq!(action_input["to"], json!("a@b.c"));
            }
            other => panic!("expected step, got {:?}", other),
        }
    }

    #[test]
    fn trailing_prose_after_the_object_is_tolerated() {
        let text = "Thought: t\nAction: WEB_SEARCH\nAction Input: {\"query\": \"x\"}\nI will wait for the result.";
        assert!(parse_response(text).is_ok());
    }

    #[test]
    fn final_answer_wins_even_with_action_text_before_it() {
        let text = "Thought: done\nFinal Answer: All set. Action: none needed.";
        match parse_response(text).unwrap() {
            ParsedResponse::FinalAnswer { answer, .. } => {
                assert!(answer.starts_with("All set."));
            }
            other => panic!("expected final answer, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(parse_response("").is_err());
        assert!(parse_response("   \n  ").is_err());
    }

    #[test]
    fn prose_without_structure_is_a_parse_error() {
        let err = parse_response("I think the user wants the weather.").unwrap_err();
        assert!(err.contains("no Action or Final Answer"));
    }

    #[test]
    fn action_without_input_is_a_parse_error() {
        let err = parse_response("Thought: t\nAction: GET_WEATHER").unwrap_err();
        assert!(err.contains("Action Input"));
    }

    #[test]
    fn malformed_json_input_is_a_parse_error() {
        let err =
            parse_response("Thought: t\nAction: GET_WEATHER\nAction Input: {\"location\": ")
                .unwrap_err();
        assert!(err.contains("JSON"));
    }

    #[test]
    fn non_object_input_is_a_parse_error() {
        let text = "Thought: t\nAction: GET_WEATHER\nAction Input: [1, 2]";
        assert!(parse_response(text).is_err());
    }

    #[test]
    fn empty_final_answer_is_a_parse_error() {
        assert!(parse_response("Thought: t\nFinal Answer:   ").is_err());
    }

    #[test]
    fn missing_thought_defaults_to_empty() {
        let text = "Action: GET_TIME\nAction Input: {}";
        match parse_response(text).unwrap() {
            ParsedResponse::Step { thought, .. } => assert_eq!(thought, ""),
            other => panic!("expected step, got {:?}", other),
        }
    }
}
