//! OpenAI-compatible `/chat/completions` backend.
//!
//! Works against any server that speaks the OpenAI chat format for the
//! instruct model (vLLM, TGI's Messages API, Ollama, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ChatMessage, Conversation, GenerationBackend, GenerationError, GenerationOptions,
    BACKEND_REQUEST_TIMEOUT,
};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    n: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct OpenAiCompatibleBackend {
    http_client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleBackend {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: completions_url(&base_url),
            model,
            api_key,
        }
    }
}

/// Get the chat completions URL for a base URL.
fn completions_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}

/// Append the first returned choice to the input turns.
fn transcript_from_body(
    conversation: &Conversation,
    body: &[u8],
) -> Result<Vec<ChatMessage>, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| GenerationError::MalformedOutput(format!("invalid completion JSON: {}", e)))?;

    let mut transcript = conversation.messages().to_vec();
    if let Some(choice) = parsed.choices.into_iter().next() {
        transcript.push(choice.message);
    }
    Ok(transcript)
}

#[async_trait]
impl GenerationBackend for OpenAiCompatibleBackend {
    async fn complete(
        &self,
        conversation: &Conversation,
        options: &GenerationOptions,
    ) -> Result<Vec<ChatMessage>, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: conversation.messages(),
            max_tokens: options.max_new_tokens.unwrap_or(options.max_length),
            n: 1,
            stream: false,
        };

        let mut request = self
            .http_client
            .post(&self.url)
            .json(&body)
            .timeout(BACKEND_REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(url = %self.url, model = %self.model, "Sending chat completion");

        let response = request.send().await.map_err(GenerationError::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(GenerationError::from_transport)?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Chat completion failed");
            return Err(GenerationError::from_status(
                status,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        transcript_from_body(conversation, &bytes)
    }
}
