//! API request and response types.

use serde::Serialize;

use crate::agent::Intent;

/// Prompt read from an intent endpoint's query string.
///
/// Repeated keys keep their last value. `user_message` is an alias of
/// `prompt` on the welcome chatbot only; `prompt` wins when both are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptQuery {
    pub prompt: Option<String>,
}

impl PromptQuery {
    pub fn from_pairs(intent: Intent, pairs: Vec<(String, String)>) -> Self {
        let mut prompt = None;
        let mut user_message = None;
        for (key, value) in pairs {
            match key.as_str() {
                "prompt" => prompt = Some(value),
                "user_message" if intent == Intent::Chat => user_message = Some(value),
                _ => {}
            }
        }
        Self {
            prompt: prompt.or(user_message),
        }
    }
}

/// Failure body shared by every intent endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Root endpoint response.
#[derive(Debug, Clone, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// One entry of the intent listing.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: &'static str,
    pub routes: &'static [&'static str],
    pub default_prompt: &'static str,
    /// Whether reference documents are injected for this intent
    pub grounded: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
