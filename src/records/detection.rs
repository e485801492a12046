use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{type_name, FieldErrors};
use crate::error::AppResult;
use crate::parse::StructuredRecord;

/// Diagnosis produced by the detector agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub bug_detected: bool,
    pub summary: String,
    /// Empty when the detector could not locate the file.
    pub file_path: String,
    /// Line range such as `"18"` or `"12-20"`; may be empty.
    pub lines: String,
    pub root_cause: String,
    /// Detector's confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// A validated detection plus any leniencies applied while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDetection {
    pub record: DetectionRecord,
    pub warnings: Vec<String>,
}

impl DetectionRecord {
    /// Validate a parsed record against the detection contract.
    ///
    /// Every key is required; `file_path` and `lines` may be empty strings
    /// but must be present. A missing or
    /// non-boolean `bug_detected` is read as `false` and reported as a
    /// warning instead of an error.
    pub fn from_structured(record: &StructuredRecord) -> AppResult<ValidatedDetection> {
        let mut errors = FieldErrors::default();
        let mut warnings = Vec::new();

        let bug_detected = match record.get("bug_detected") {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                warnings.push(format!(
                    "bug_detected: expected boolean, got {}; treating as false",
                    type_name(other)
                ));
                false
            }
            None => {
                warnings.push("bug_detected: missing; treating as false".to_string());
                false
            }
        };

        let summary = errors.required_str(record, "summary");
        let file_path = errors.required_str(record, "file_path");
        let lines = errors.required_str(record, "lines");
        let root_cause = errors.required_str(record, "root_cause");

        let confidence = match record.get("confidence") {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(c) if (0.0..=1.0).contains(&c) => c,
                Some(c) => {
                    errors.push("confidence", format!("must be within [0.0, 1.0], got {}", c));
                    0.0
                }
                None => {
                    errors.push("confidence", "not representable as a float");
                    0.0
                }
            },
            Some(other) => {
                errors.push(
                    "confidence",
                    format!("expected number, got {}", type_name(other)),
                );
                0.0
            }
            None => {
                errors.push("confidence", "missing");
                0.0
            }
        };

        errors.into_result("detection")?;

        for warning in &warnings {
            warn!(warning = %warning, "Detection record leniency applied");
        }

        Ok(ValidatedDetection {
            record: DetectionRecord {
                bug_detected,
                summary,
                file_path,
                lines,
                root_cause,
                confidence,
            },
            warnings,
        })
    }
}
