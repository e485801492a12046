//! Conversational agents.
//!
//! - [`Agent`]: persona plus owned history, turning prompts into structured records
//! - [`ConversationHistory`]: the append-only message log behind each agent
//!
//! Agents for the diagnostic pipeline are built with [`detector`] and [`fixer`].

mod agent;
mod history;

pub use agent::*;
pub use history::*;

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{GenerationSettings, ModelEndpoint};
use crate::prompts::{DETECTOR_PERSONA, FIXER_PERSONA};

/// Name used in logs for the detector agent.
pub const DETECTOR_NAME: &str = "bug-hunter";

/// Name used in logs for the fixer agent.
pub const FIXER_NAME: &str = "auto-fixer";

/// Build a fresh detector agent from configuration.
pub fn detector(endpoint: Arc<dyn ModelEndpoint>, config: &Config) -> Agent {
    configured(Agent::new(DETECTOR_NAME, DETECTOR_PERSONA, endpoint), config)
}

/// Build a fresh fixer agent from configuration.
pub fn fixer(endpoint: Arc<dyn ModelEndpoint>, config: &Config) -> Agent {
    configured(Agent::new(FIXER_NAME, FIXER_PERSONA, endpoint), config)
}

fn configured(agent: Agent, config: &Config) -> Agent {
    agent
        .with_settings(GenerationSettings::from(&config.generation))
        .with_max_turns(config.agent.max_turns)
}
