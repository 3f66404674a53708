//! Conversation message history.

use crate::types::Message;

/// Append-only message history with an optional prompt window.
///
/// Every appended message is kept. When a ceiling is set, only the most recent
/// `max_len` messages are offered to the model through [`Conversation::window`].
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    max_len: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// History whose prompt window holds at most `max_len` messages.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_len: Some(max_len),
        }
    }

    /// Add a user message.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Add an assistant message.
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// Add a raw message.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages to include in the next prompt.
    pub fn window(&self) -> &[Message] {
        match self.max_len {
            Some(n) => self.last_n(n),
            None => &self.messages,
        }
    }

    /// Get the last N messages.
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Clear all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
