//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use crate::config::Config;
use crate::llm::ModelEndpoint;
use crate::pipeline::DiagnosticPipeline;

/// Application state shared across handlers.
///
/// Holds only stateless resources. Agent histories are per call: every
/// tool invocation gets its own [`DiagnosticPipeline`].
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Model endpoint shared by all agents.
    pub endpoint: Arc<dyn ModelEndpoint>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, endpoint: Arc<dyn ModelEndpoint>) -> Self {
        tracing::info!(
            deployment = %config.endpoint.deployment,
            temperature = config.generation.temperature,
            max_turns = ?config.agent.max_turns,
            "AppState initialized"
        );
        Self { config, endpoint }
    }

    /// A pipeline with a fresh detector/fixer pair.
    pub fn new_pipeline(&self) -> DiagnosticPipeline {
        DiagnosticPipeline::from_config(self.endpoint.clone(), &self.config)
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
