use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, Role};

/// Greeting seeded into every freshly created thread
pub const WELCOME_MESSAGE: &str = "Hi! How can I help you today?";

/// Title used until a thread has a user message
pub const UNTITLED: &str = "Untitled";

/// A conversation, identified by the provider-issued thread id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Preview of the newest message
    #[serde(default)]
    pub last_message: String,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Create an empty thread for a provider-issued id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: UNTITLED.to_string(),
            last_message: String::new(),
            last_updated: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Create a thread seeded with the welcome message
    pub fn with_welcome(id: impl Into<String>) -> Self {
        let mut thread = Self::new(id);
        thread.push(Message::assistant(WELCOME_MESSAGE));
        thread
    }

    /// Rebuild a thread from hydrated history
    pub fn from_history(id: impl Into<String>, messages: Vec<Message>) -> Self {
        let mut thread = Self::new(id);
        thread.title = title_for(&messages);
        thread.messages = messages;
        thread.touch();
        thread
    }

    /// Append a message; it becomes the target of subsequent appends
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Append text to the last message, creating an empty assistant message
    /// first if the thread has none.
    pub fn append_to_last(&mut self, text: &str) {
        if self.messages.is_empty() {
            self.messages.push(Message::assistant(""));
        }
        if let Some(last) = self.messages.last_mut() {
            last.text.push_str(text);
        }
        self.touch();
    }

    /// Replace every occurrence of `from` in the last message
    pub fn replace_in_last(&mut self, from: &str, to: &str) {
        if from.is_empty() {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            if last.text.contains(from) {
                last.text = last.text.replace(from, to);
            }
        }
        self.touch();
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Refresh the cached preview and timestamp from the message list
    pub fn touch(&mut self) {
        self.last_message = self
            .messages
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();
        self.last_updated = Utc::now();
        if self.title == UNTITLED {
            self.title = title_for(&self.messages);
        }
    }
}

/// Title is the first user message, or "Untitled"
pub fn title_for(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User && !m.text.trim().is_empty())
        .map(|m| m.text.trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}
