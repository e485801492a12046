//! Command-line interface for the `autofix` binary.
//!
//! Runs the diagnostic pipeline once over a failure report (`analyze`),
//! over a built-in sample (`demo`), or serves it over MCP stdio (`serve`).

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tokio::io::AsyncReadExt;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::pipeline::{PipelineResult, NO_BUG_MESSAGE};
use crate::server::{McpServer, SharedState};

/// Lines of `new_content` shown in human-readable output.
pub const PREVIEW_LINES: usize = 30;

/// Failing test report used by `autofix demo`.
pub const DEMO_ERROR_CONTEXT: &str = "pytest::test_total FAILED
E   AssertionError: expected 42, got 41
Traceback:
  file app/math_utils.py, line 18, in total
";

/// Buggy source used by `autofix demo`.
pub const DEMO_CODE: &str = "# file: app/math_utils.py
def total(items):
    s = 0
    for i in items:
        s -= i  # BUG: should add
    return s
";

/// File path hint used by `autofix demo`.
pub const DEMO_FILE_PATH: &str = "app/math_utils.py";

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Diagnose a failure report and propose a fix if it is a bug
    Analyze {
        /// File holding the error log or stack trace, or `-` for stdin
        #[arg(long = "error", value_name = "FILE")]
        error: String,

        /// File holding the relevant source code
        #[arg(long, value_name = "FILE")]
        code: Option<PathBuf>,

        /// Path of the suspected file, passed to the detector as a hint
        #[arg(long, value_name = "PATH")]
        file_path: Option<String>,

        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the pipeline on a built-in off-by-sign example
    Demo {
        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the pipeline as an MCP tool over stdio
    Serve,
}

/// Result of CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Text for stdout on success, stderr on failure
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }

    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Execute a CLI command against shared application state.
pub async fn execute_command(command: Commands, state: SharedState) -> CliResult {
    match command {
        Commands::Analyze {
            error,
            code,
            file_path,
            json,
        } => execute_analyze(&state, &error, code.as_deref(), file_path, json).await,
        Commands::Demo { json } => {
            run_pipeline(
                &state,
                DEMO_ERROR_CONTEXT,
                Some(DEMO_CODE),
                Some(DEMO_FILE_PATH),
                json,
            )
            .await
        }
        Commands::Serve => execute_serve(state).await,
    }
}

async fn execute_analyze(
    state: &SharedState,
    error_source: &str,
    code_path: Option<&Path>,
    file_path: Option<String>,
    json: bool,
) -> CliResult {
    let error_context = match read_input(error_source).await {
        Ok(text) => text,
        Err(e) => return CliResult::error(render_error(&e)),
    };

    let code = match code_path {
        Some(path) => match read_file(path).await {
            Ok(text) => Some(text),
            Err(e) => return CliResult::error(render_error(&e)),
        },
        None => None,
    };

    run_pipeline(
        state,
        &error_context,
        code.as_deref(),
        file_path.as_deref(),
        json,
    )
    .await
}

async fn run_pipeline(
    state: &SharedState,
    error_context: &str,
    code: Option<&str>,
    file_path: Option<&str>,
    json: bool,
) -> CliResult {
    let mut pipeline = state.new_pipeline();

    let rendered = pipeline
        .analyze_and_fix(error_context, code, file_path)
        .await
        .and_then(|result| render_result(&result, json));

    match rendered {
        Ok(output) => CliResult::success(output),
        Err(e) => {
            error!(error = %e, stage = %pipeline.stage(), "Pipeline failed");
            CliResult::error(render_error(&e))
        }
    }
}

async fn execute_serve(state: SharedState) -> CliResult {
    let server = McpServer::new(state);
    match server.run().await {
        Ok(()) => CliResult::success(""),
        Err(e) => CliResult::error(format!("Server error: {}", e)),
    }
}

/// Read a text input from a file, or from stdin when `source` is `-`.
pub async fn read_input(source: &str) -> AppResult<String> {
    if source == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| AppError::Validation {
                field: "error".to_string(),
                reason: format!("cannot read stdin: {}", e),
            })?;
        return Ok(text);
    }
    read_file(Path::new(source)).await
}

async fn read_file(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Validation {
            field: path.display().to_string(),
            reason: format!("cannot read file: {}", e),
        })
}

/// Render a pipeline result for the terminal, or as pretty JSON.
pub fn render_result(result: &PipelineResult, json: bool) -> AppResult<String> {
    if json {
        return pretty_json(result);
    }

    let mut output = String::new();
    output.push_str("== Detection ==\n");
    output.push_str(&pretty_json(result.detection())?);
    output.push('\n');

    match result.fix() {
        None => {
            output.push('\n');
            output.push_str(NO_BUG_MESSAGE);
            output.push('\n');
        }
        Some(fix) => {
            let summary = serde_json::json!({
                "file_path": fix.file_path,
                "explanation": fix.explanation,
            });
            output.push_str("\n== Proposed Fix ==\n");
            output.push_str(&pretty_json(&summary)?);
            output.push_str("\n\n--- new_content (preview) ---\n");
            output.push_str(&preview(&fix.new_content, PREVIEW_LINES));
            output.push('\n');
        }
    }

    Ok(output)
}

/// Error text for stderr, followed by the raw model output when present.
pub fn render_error(err: &AppError) -> String {
    match err.raw_text() {
        Some(raw) => format!("Error: {}\n--- raw model output ---\n{}", err, raw),
        None => format!("Error: {}", err),
    }
}

/// First `max_lines` lines of `content`.
pub fn preview(content: &str, max_lines: usize) -> String {
    content.lines().take(max_lines).collect::<Vec<_>>().join("\n")
}

fn pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal {
        message: format!("Failed to render JSON: {}", e),
    })
}
