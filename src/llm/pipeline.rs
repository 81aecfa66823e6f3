//! Hugging Face text-generation pipeline backend.
//!
//! Posts the chat turns as `inputs` and expects
//! `[{"generated_text": [{"role": ..., "content": ...}, ...]}]`, the full
//! transcript with the input turns echoed back ahead of the reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ChatMessage, Conversation, GenerationBackend, GenerationError, GenerationOptions, Role,
    BACKEND_REQUEST_TIMEOUT,
};

#[derive(Debug, Serialize)]
struct PipelineRequest<'a> {
    inputs: &'a [ChatMessage],
    parameters: PipelineParameters,
}

#[derive(Debug, Serialize)]
struct PipelineParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
    max_length: u32,
    num_return_sequences: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct PipelineOutput {
    generated_text: GeneratedText,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedText {
    Turns(Vec<ChatMessage>),
    Text(String),
}

pub struct PipelineBackend {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl PipelineBackend {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

/// Decode the first returned sequence into a transcript.
///
/// A plain-text sequence is taken as a bare assistant continuation.
fn transcript_from_body(
    conversation: &Conversation,
    body: &[u8],
) -> Result<Vec<ChatMessage>, GenerationError> {
    let outputs: Vec<PipelineOutput> = serde_json::from_slice(body)
        .map_err(|e| GenerationError::MalformedOutput(format!("unexpected pipeline output: {}", e)))?;

    let first = outputs
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedOutput("pipeline returned no sequences".to_string()))?;

    Ok(match first.generated_text {
        GeneratedText::Turns(turns) => turns,
        GeneratedText::Text(text) => {
            let mut transcript = conversation.messages().to_vec();
            transcript.push(ChatMessage::new(Role::Assistant, text));
            transcript
        }
    })
}

#[async_trait]
impl GenerationBackend for PipelineBackend {
    async fn complete(
        &self,
        conversation: &Conversation,
        options: &GenerationOptions,
    ) -> Result<Vec<ChatMessage>, GenerationError> {
        let body = PipelineRequest {
            inputs: conversation.messages(),
            parameters: PipelineParameters {
                max_new_tokens: options.max_new_tokens,
                max_length: options.max_length,
                num_return_sequences: 1,
                return_full_text: true,
            },
        };

        let mut request = self
            .http_client
            .post(&self.url)
            .json(&body)
            .timeout(BACKEND_REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(url = %self.url, "Sending pipeline generation");

        let response = request.send().await.map_err(GenerationError::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(GenerationError::from_transport)?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Pipeline generation failed");
            return Err(GenerationError::from_status(
                status,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        transcript_from_body(conversation, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::extract_reply;

    #[test]
    fn parameters_skip_unset_max_new_tokens() {
        let params = PipelineParameters {
            max_new_tokens: None,
            max_length: 200,
            num_return_sequences: 1,
            return_full_text: true,
        };
        let value = serde_json::to_value(&params).expect("serialize");
        assert!(value.get("max_new_tokens").is_none());
        assert_eq!(value["max_length"], 200);
    }

    #[test]
    fn echoed_transcript_yields_assistant_reply() {
        let conversation = Conversation::new("sys", "Bonjour");
        let body = br#"[{"generated_text":[
            {"role":"system","content":"sys"},
            {"role":"user","content":"Bonjour"},
            {"role":"assistant","content":"Bonjour, que puis-je faire ?"}
        ]}]"#;

        let transcript = transcript_from_body(&conversation, body).expect("parse");
        assert_eq!(extract_reply(&transcript).unwrap(), "Bonjour, que puis-je faire ?");
    }

    #[test]
    fn transcript_without_system_echo_still_finds_reply() {
        let conversation = Conversation::new("sys", "Bonjour");
        let body = br#"[{"generated_text":[
            {"role":"user","content":"Bonjour"},
            {"role":"assistant","content":"Salut"}
        ]}]"#;

        let transcript = transcript_from_body(&conversation, body).expect("parse");
        assert_eq!(extract_reply(&transcript).unwrap(), "Salut");
    }

    #[test]
    fn plain_text_sequence_is_assistant_continuation() {
        let conversation = Conversation::new("sys", "Bonjour");
        let transcript =
            transcript_from_body(&conversation, br#"[{"generated_text":"Salut"}]"#).expect("parse");
        assert_eq!(transcript.len(), 3);
        assert_eq!(extract_reply(&transcript).unwrap(), "Salut");
    }

    #[test]
    fn empty_or_odd_outputs_are_malformed() {
        let conversation = Conversation::new("sys", "Bonjour");
        assert!(matches!(
            transcript_from_body(&conversation, b"[]"),
            Err(GenerationError::MalformedOutput(_))
        ));
        assert!(matches!(
            transcript_from_body(&conversation, br#"{"error":"Model is loading"}"#),
            Err(GenerationError::MalformedOutput(_))
        ));
    }
}
