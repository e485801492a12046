//! # autofix-agents
//!
//! A two-agent diagnostic pipeline over an OpenAI-compatible chat model.
//! A detector ("bug hunter") agent turns a failure report into a structured
//! detection record; only when it reports a bug does a fixer ("auto-fixer")
//! agent propose a full-file replacement.
//!
//! ## Features
//!
//! - **Tolerant parsing**: model replies with code fences or surrounding prose
//!   are reduced to a single JSON object
//! - **Validated records**: detection and fix records are checked field by field
//! - **Owned conversations**: each agent keeps its own append-only history
//! - **Surfaces**: `autofix` CLI and an MCP stdio tool (`analyze_and_fix`)
//!
//! ## Architecture
//!
//! ```text
//! CLI / MCP client → DiagnosticPipeline → Agent (detector) ─┐
//!                                      → Agent (fixer)    ─┴→ ModelEndpoint (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use autofix_agents::{Config, DiagnosticPipeline};
//! use autofix_agents::llm::ChatClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ChatClient::new(&config.endpoint, config.request.clone())?;
//!     let mut pipeline = DiagnosticPipeline::from_config(Arc::new(client), &config);
//!     let result = pipeline
//!         .analyze_and_fix("AssertionError: expected 42, got 41", None, None)
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```

/// Conversational agents and their histories.
pub mod agents;
/// Command-line interface commands.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Chat model endpoint trait and HTTP client.
pub mod llm;
/// Extraction of JSON records from free-form model replies.
pub mod parse;
/// The detector/fixer pipeline and its stages.
pub mod pipeline;
/// Agent personas and prompt templates.
pub mod prompts;
/// Detection and fix record contracts.
pub mod records;
/// MCP server implementation and request handling.
pub mod server;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::{DiagnosticPipeline, PipelineResult, PipelineStage};
pub use server::{AppState, McpServer, SharedState};
