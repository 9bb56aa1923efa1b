//! Conversation memory shared by the agents

use tracing::debug;

use crate::llm::Message;

/// Append-only message history
///
/// Unbounded; a session is short and interactive.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        debug!(role = %message.role, content_len = message.content.len(), "ConversationMemory::append: called");
        self.messages.push(message);
    }

    /// Record one agent exchange: the user turn and the reply
    pub fn record_exchange(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.append(Message::user(input));
        self.append(Message::assistant(output));
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
