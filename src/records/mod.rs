//! Data contract between the detector and fixer agents.
//!
//! Records are validated on construction from a [`StructuredRecord`]; every
//! missing or invalid field is collected into a single
//! [`AppError::ContractViolation`] so the caller sees the whole picture.

mod detection;
mod fix;

pub use detection::*;
pub use fix::*;

use serde_json::Value;

use crate::error::AppError;
use crate::parse::StructuredRecord;

/// Accumulates field problems while a record is being validated.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    fields: Vec<String>,
}

impl FieldErrors {
    pub(crate) fn push(&mut self, field: &str, problem: impl std::fmt::Display) {
        self.fields.push(format!("{}: {}", field, problem));
    }

    /// Required string field; the empty string is a valid value.
    ///
    /// Absent keys and non-string values are recorded as problems.
    pub(crate) fn required_str(&mut self, record: &StructuredRecord, field: &str) -> String {
        match record.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                self.push(field, format!("expected string, got {}", type_name(other)));
                String::new()
            }
            None => {
                self.push(field, "missing");
                String::new()
            }
        }
    }

    pub(crate) fn into_result(self, record: &str) -> Result<(), AppError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::ContractViolation {
                record: record.to_string(),
                fields: self.fields,
            })
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
