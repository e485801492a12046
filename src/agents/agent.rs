use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::ConversationHistory;
use crate::error::{AppError, AppResult};
use crate::llm::{GenerationSettings, Message, ModelEndpoint};
use crate::parse::{parse_structured, StructuredRecord};

/// A persona-bound conversational agent that answers with structured records.
///
/// The agent exclusively owns its history; `request_structured` takes
/// `&mut self`, so one agent cannot serve two concurrent conversations.
pub struct Agent {
    name: String,
    persona: String,
    history: ConversationHistory,
    endpoint: Arc<dyn ModelEndpoint>,
    settings: GenerationSettings,
    max_turns: Option<usize>,
}

impl Agent {
    /// Create an agent whose history starts with `persona` as the system message.
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        endpoint: Arc<dyn ModelEndpoint>,
    ) -> Self {
        let persona = persona.into();
        Self {
            name: name.into(),
            history: ConversationHistory::new(persona.clone()),
            persona,
            endpoint,
            settings: GenerationSettings::default(),
            max_turns: None,
        }
    }

    /// Set the generation settings used for every call
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Cap the number of user turns this agent will take
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Send `prompt` and parse the reply into a structured record.
    ///
    /// The reply is appended to history before parsing, so a
    /// `MalformedResponse` still leaves both turns in memory. Endpoint
    /// failures and cancellation leave the user turn in place.
    pub async fn request_structured(&mut self, prompt: &str) -> AppResult<StructuredRecord> {
        if let Some(max_turns) = self.max_turns {
            if self.history.turns() >= max_turns {
                warn!(agent = %self.name, max_turns, "Agent history limit reached");
                return Err(AppError::HistoryLimit {
                    agent: self.name.clone(),
                    max_turns,
                });
            }
        }

        let start = Instant::now();
        self.history.push(Message::user(prompt));

        debug!(
            agent = %self.name,
            messages = self.history.len(),
            "Requesting structured response"
        );

        let text = self
            .endpoint
            .complete(self.history.messages(), &self.settings)
            .await?;

        self.history.push(Message::assistant(text.trim()));

        let result = parse_structured(&text);

        match &result {
            Ok(record) => info!(
                agent = %self.name,
                keys = record.len(),
                latency_ms = start.elapsed().as_millis(),
                "Structured response received"
            ),
            Err(e) => warn!(
                agent = %self.name,
                error = %e,
                latency_ms = start.elapsed().as_millis(),
                "Model reply could not be parsed"
            ),
        }

        result
    }
}
