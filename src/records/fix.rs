use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{type_name, FieldErrors};
use crate::error::AppResult;
use crate::parse::StructuredRecord;

/// The only intent a fixer may declare.
pub const FIX_INTENT: &str = "fix_bug";

/// Proposed fix produced by the fixer agent.
///
/// `new_content` is the complete replacement file, never a diff; consumers
/// apply it by overwriting `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixRecord {
    pub intent: String,
    pub file_path: String,
    pub new_content: String,
    pub explanation: String,
    pub test_suggestions: Vec<String>,
}

impl FixRecord {
    /// Validate a parsed record against the fix contract.
    pub fn from_structured(record: &StructuredRecord) -> AppResult<Self> {
        let mut errors = FieldErrors::default();

        let intent = errors.required_str(record, "intent");
        if record.contains_key("intent") && !intent.is_empty() && intent != FIX_INTENT {
            errors.push("intent", format!("expected \"{}\", got \"{}\"", FIX_INTENT, intent));
        }

        let file_path = errors.required_str(record, "file_path");
        if record.get("file_path").is_some_and(Value::is_string) && file_path.trim().is_empty() {
            errors.push("file_path", "must not be empty");
        }

        let new_content = errors.required_str(record, "new_content");
        let explanation = errors.required_str(record, "explanation");

        let test_suggestions = match record.get("test_suggestions") {
            Some(Value::Array(items)) => {
                let mut suggestions = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => suggestions.push(s.clone()),
                        other => errors.push(
                            &format!("test_suggestions[{}]", i),
                            format!("expected string, got {}", type_name(other)),
                        ),
                    }
                }
                suggestions
            }
            Some(other) => {
                errors.push(
                    "test_suggestions",
                    format!("expected array, got {}", type_name(other)),
                );
                Vec::new()
            }
            None => {
                errors.push("test_suggestions", "missing");
                Vec::new()
            }
        };

        errors.into_result("fix")?;

        Ok(Self {
            intent,
            file_path,
            new_content,
            explanation,
            test_suggestions,
        })
    }

    /// True when applying this fix would not change `original`.
    ///
    /// An empty `new_content` always counts as a no-op proposal.
    pub fn is_noop_for(&self, original: Option<&str>) -> bool {
        if self.new_content.trim().is_empty() {
            return true;
        }
        original.is_some_and(|o| o.trim_end() == self.new_content.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn structured(value: Value) -> StructuredRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    fn valid() -> Value {
        json!({
            "intent": "fix_bug",
            "file_path": "app/math_utils.py",
            "new_content": "def total(items):\n    s = 0\n    for i in items:\n        s += i\n    return s\n",
            "explanation": "Accumulate with += instead of -=",
            "test_suggestions": ["test_total_positive", "test_total_empty"]
        })
    }

    fn violation_fields(result: AppResult<FixRecord>) -> Vec<String> {
        match result {
            Err(AppError::ContractViolation { record, fields }) => {
                assert_eq!(record, "fix");
                fields
            }
            other => panic!("expected ContractViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_fix() {
        let fix = FixRecord::from_structured(&structured(valid())).unwrap();
        assert_eq!(fix.intent, FIX_INTENT);
        assert_eq!(fix.file_path, "app/math_utils.py");
        assert!(fix.new_content.contains("s += i"));
        assert_eq!(fix.test_suggestions.len(), 2);
    }

    #[test]
    fn test_missing_new_content_is_violation() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("new_content");
        let fields = violation_fields(FixRecord::from_structured(&structured(value)));
        assert_eq!(fields, vec!["new_content: missing".to_string()]);
    }

    #[test]
    fn test_wrong_intent_is_violation() {
        let mut value = valid();
        value["intent"] = json!("refactor");
        let fields = violation_fields(FixRecord::from_structured(&structured(value)));
        assert_eq!(
            fields,
            vec!["intent: expected \"fix_bug\", got \"refactor\"".to_string()]
        );
    }

    #[test]
    fn test_empty_file_path_is_violation() {
        let mut value = valid();
        value["file_path"] = json!("  ");
        let fields = violation_fields(FixRecord::from_structured(&structured(value)));
        assert_eq!(fields, vec!["file_path: must not be empty".to_string()]);
    }

    #[test]
    fn test_test_suggestions_must_be_strings() {
        let mut value = valid();
        value["test_suggestions"] = json!(["ok", 7]);
        let fields = violation_fields(FixRecord::from_structured(&structured(value)));
        assert_eq!(
            fields,
            vec!["test_suggestions[1]: expected string, got number".to_string()]
        );

        let mut value = valid();
        value["test_suggestions"] = json!("run the tests");
        assert!(FixRecord::from_structured(&structured(value)).is_err());
    }

    #[test]
    fn test_empty_new_content_is_accepted_as_noop() {
        let mut value = valid();
        value["new_content"] = json!("");
        let fix = FixRecord::from_structured(&structured(value)).unwrap();
        assert!(fix.is_noop_for(None));
    }

    #[test]
    fn test_is_noop_for_unchanged_content() {
        let fix = FixRecord::from_structured(&structured(valid())).unwrap();
        assert!(fix.is_noop_for(Some(fix.new_content.trim_end())));
        assert!(!fix.is_noop_for(Some("def total(items):\n    return 0\n")));
        assert!(!fix.is_noop_for(None));
    }

    #[test]
    fn test_roundtrips_through_serde() {
        let fix = FixRecord::from_structured(&structured(valid())).unwrap();
        assert_eq!(serde_json::to_value(&fix).unwrap(), valid());
    }
}
