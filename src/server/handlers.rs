use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use super::SharedState;
use crate::error::{McpError, McpResult};
use crate::pipeline::{PipelineResult, NO_BUG_MESSAGE};

/// Arguments for the `analyze_and_fix` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeParams {
    /// Log, stack trace or assertion diff describing the failure
    pub error_context: String,
    /// Relevant source code, if any
    #[serde(default)]
    pub code_snippet: Option<String>,
    /// Path of the suspected file, if known
    #[serde(default)]
    pub file_path_hint: Option<String>,
}

/// Tool output: the pipeline result plus a human-readable note
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: PipelineResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "analyze_and_fix" => handle_analyze_and_fix(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Handle analyze_and_fix tool call
async fn handle_analyze_and_fix(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: AnalyzeParams = parse_arguments("analyze_and_fix", arguments)?;
    let start = Instant::now();

    // Fresh agents per call keep concurrent conversations apart.
    let mut pipeline = state.new_pipeline();
    let result = pipeline
        .analyze_and_fix(
            &params.error_context,
            params.code_snippet.as_deref(),
            params.file_path_hint.as_deref(),
        )
        .await?;

    let message = match &result {
        PipelineResult::Detected { .. } => Some(NO_BUG_MESSAGE.to_string()),
        PipelineResult::Fixed { .. } => None,
    };

    let response = AnalyzeResponse {
        result,
        message,
        latency_ms: start.elapsed().as_millis() as u64,
    };

    serde_json::to_value(response).map_err(McpError::Json)
}

/// Deserialize tool arguments, mapping failures to `InvalidParameters`
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    let args = arguments.ok_or_else(|| McpError::InvalidParameters {
        tool_name: tool_name.to_string(),
        message: "Missing arguments".to_string(),
    })?;

    serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
        tool_name: tool_name.to_string(),
        message: e.to_string(),
    })
}
