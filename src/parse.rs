//! Structured response parsing for model completions.
//!
//! Models wrap JSON in markdown fences or surround it with commentary even
//! when told not to. [`parse_structured`] strips those artifacts but only
//! ever returns a record that decoded strictly; anything else is a
//! [`AppError::MalformedResponse`] carrying the untouched raw text.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// A decoded JSON object from model output, not yet schema-validated.
pub type StructuredRecord = Map<String, Value>;

const FENCE: &str = "```";

/// Extract a JSON object from raw model text.
///
/// Attempts, first success wins:
/// 1. strip surrounding whitespace and an enclosing code fence
/// 2. decode the remaining text strictly
/// 3. decode the span from the first `{` to the last `}`
pub fn parse_structured(raw: &str) -> AppResult<StructuredRecord> {
    let text = strip_code_fence(raw.trim());

    if let Some(record) = decode_object(text) {
        return Ok(record);
    }

    if let Some(fragment) = brace_span(text) {
        if let Some(record) = decode_object(fragment) {
            debug!(
                skipped_chars = text.len() - fragment.len(),
                "Recovered record from surrounding prose"
            );
            return Ok(record);
        }
    }

    Err(AppError::MalformedResponse {
        raw_text: raw.to_string(),
    })
}

/// Remove an opening fence (with optional language tag) and a trailing fence.
///
/// Text that does not start with a fence is returned unchanged.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };

    let body = match rest.split_once('\n') {
        Some((tag, body)) if is_language_tag(tag) => body,
        // No newline: a single-line fence like ```{"a":1}```
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        Some(_) => rest,
    };

    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// The span from the first `{` to the last `}`, when well ordered.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn decode_object(text: &str) -> Option<StructuredRecord> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DETECTION: &str = r#"{"bug_detected": true, "summary": "sign error", "confidence": 0.9}"#;

    fn expected() -> StructuredRecord {
        match json!({"bug_detected": true, "summary": "sign error", "confidence": 0.9}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(parse_structured(DETECTION).unwrap(), expected());
    }

    #[test]
    fn test_surrounding_whitespace() {
        let raw = format!("\n\n   {}  \n", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fenced_with_language_tag() {
        let raw = format!("```json\n{}\n```", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fenced_without_language_tag() {
        let raw = format!("```\n{}\n```", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fenced_without_closing_marker() {
        let raw = format!("```json\n{}", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_single_line_fence() {
        let raw = format!("```json{}```", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fence_is_idempotent_for_every_wrapping() {
        let bare = parse_structured(DETECTION).unwrap();
        for wrapped in [
            format!("```json\n{}\n```", DETECTION),
            format!("```JSON\n{}\n```\n", DETECTION),
            format!("  ```\n{}\n```  ", DETECTION),
            format!("```jsonc\n\n{}\n\n```", DETECTION),
        ] {
            assert_eq!(parse_structured(&wrapped).unwrap(), bare, "{}", wrapped);
        }
    }

    #[test]
    fn test_prose_around_json() {
        let raw = format!("Here is my analysis:\n{}\nLet me know if you need more.", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_prose_around_fenced_json() {
        let raw = format!("Sure! ```json\n{}\n``` Hope that helps.", DETECTION);
        assert_eq!(parse_structured(&raw).unwrap(), expected());
    }

    #[test]
    fn test_nested_braces_in_strings() {
        let raw = r#"Result: {"new_content": "fn main() { println!(\"{}\", 1); }", "intent": "fix_bug"} done"#;
        let record = parse_structured(raw).unwrap();
        assert_eq!(record["intent"], "fix_bug");
        assert_eq!(
            record["new_content"],
            "fn main() { println!(\"{}\", 1); }"
        );
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let raw = "I could not find any bug in the provided context.";
        match parse_structured(raw) {
            Err(AppError::MalformedResponse { raw_text }) => assert_eq!(raw_text, raw),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let raw = r#"{"bug_detected": true, "summary": "cut off"#;
        assert!(matches!(
            parse_structured(raw),
            Err(AppError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_reversed_braces_are_malformed() {
        assert!(parse_structured("} nothing here {").is_err());
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(parse_structured("").is_err());
        assert!(parse_structured("```json\n```").is_err());
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        assert!(parse_structured("[1, 2, 3]").is_err());
        assert!(parse_structured("42").is_err());
        assert!(parse_structured("\"text\"").is_err());
    }

    #[test]
    fn test_malformed_keeps_untrimmed_raw_text() {
        let raw = "  \n```json\nnot json\n```\n";
        match parse_structured(raw) {
            Err(AppError::MalformedResponse { raw_text }) => assert_eq!(raw_text, raw),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_two_objects_in_prose_is_malformed() {
        // First-to-last brace span covers both objects and is not valid JSON.
        let raw = r#"first {"a": 1} then {"b": 2}"#;
        assert!(parse_structured(raw).is_err());
    }
}
