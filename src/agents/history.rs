use crate::llm::{Message, MessageRole};

/// Append-only conversation owned by a single agent.
///
/// The first message is always the agent's persona as a system message.
/// Messages are never reordered or removed.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Start a history with the persona as its leading system message.
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(persona)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the persona message is present from construction.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user turns sent so far.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
