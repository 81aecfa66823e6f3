//! Conversation and message types.

use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Exactly one system message followed by exactly one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: [ChatMessage; 2],
}

impl Conversation {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: [
                ChatMessage::new(Role::System, system),
                ChatMessage::new(Role::User, user),
            ],
        }
    }

    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn user(&self) -> &str {
        &self.messages[1].content
    }

    /// Both turns, system first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Generation knobs forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Caps the number of generated tokens
    pub max_new_tokens: Option<u32>,
    /// Caps the total sequence length
    pub max_length: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: None,
            max_length: 200,
        }
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            max_length: config.max_length,
        }
    }
}
