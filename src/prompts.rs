//! Centralized prompt definitions for the detector and fixer agents
//!
//! Personas fix each agent's role and output schema for the lifetime of
//! the agent. The builders below lay out per-call inputs under delimited
//! sections so input data cannot be mistaken for instructions.

use crate::records::DetectionRecord;

/// Placeholder used when no code snippet accompanies the report.
pub const NO_CODE: &str = "(none)";

/// Placeholder used when no file path hint is available.
pub const UNKNOWN_PATH: &str = "(unknown)";

/// System prompt for the detector agent.
pub const DETECTOR_PERSONA: &str = r#"You are the Bug Hunter.
Task: Given error logs, test failures, and optionally code snippets, determine if there is a bug.
Return ONLY compact JSON with fields:
{
  "bug_detected": true|false,
  "summary": "<one-line summary>",
  "file_path": "<path if known or empty>",
  "lines": "<line range or empty>",
  "root_cause": "<brief root cause>",
  "confidence": 0.0-1.0
}
No commentary outside JSON."#;

/// System prompt for the fixer agent.
pub const FIXER_PERSONA: &str = r#"You are the Auto-Fixer. You propose safe, minimal changes to fix the detected bug.
Return ONLY JSON with fields:
{
  "intent": "fix_bug",
  "file_path": "<path to file to write>",
  "new_content": "<FULL updated file content after fix>",
  "explanation": "<what you changed and why>",
  "test_suggestions": ["<short test name or step>", "..."]
}
No commentary outside JSON."#;

/// Build the detector's prompt from the failure report.
pub fn detection_prompt(
    error_context: &str,
    code_snippet: Option<&str>,
    file_path_hint: Option<&str>,
) -> String {
    format!(
        "You will receive diagnostic inputs:\n\n\
         === ERROR/TEST CONTEXT ===\n{}\n\n\
         === CODE (optional) ===\n{}\n\n\
         === FILE PATH HINT (optional) ===\n{}\n",
        error_context,
        non_blank(code_snippet).unwrap_or(NO_CODE),
        non_blank(file_path_hint).unwrap_or(UNKNOWN_PATH),
    )
}

/// Build the fixer's prompt from a confirmed detection.
pub fn fix_prompt(detection_json: &str, code_snippet: Option<&str>) -> String {
    format!(
        "Detection JSON from the Bug Hunter:\n{}\n\n\
         Relevant code (if any):\n{}\n\n\
         Constraints:\n\
         - Produce minimal, safe changes.\n\
         - Return FULL file content in 'new_content' (not a diff).\n\
         - Keep the module API unchanged unless the root cause requires it.\n",
        detection_json,
        non_blank(code_snippet).unwrap_or(NO_CODE),
    )
}

/// Serialize a detection for embedding in the fix prompt.
pub fn detection_json(detection: &DetectionRecord) -> String {
    // Plain struct of strings, bool and f64; serialization cannot fail.
    serde_json::to_string(detection).unwrap_or_else(|_| format!("{:?}", detection))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
