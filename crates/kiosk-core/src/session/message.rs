//! Conversation message types.
//!
//! This module contains types for representing the assistance/translation
//! log, including roles and message content.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The kiosk user's transcript.
    User,
    /// The answerer's reply.
    Assistant,
}

/// A single turn in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub text: String,
    /// Set on assistant turns produced in translation mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            translated_text: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            translated_text: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated_text = Some(translated.into());
        self
    }
}

/// Append-only ordered message log.
///
/// Entries are never edited in place; the only removal is a full `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}
