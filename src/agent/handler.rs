//! The one request-handling path every intent goes through.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::documents::{DocumentStore, SharedDocumentStore};
use crate::llm::{GenerationClient, GenerationError};

use super::intents::Intent;
use super::prompt::build_conversation;
use super::sentiment::{parse_sentiment, SentimentAnalysis};

/// Successful answer for one request.
#[derive(Debug, Clone, Serialize)]
pub struct IntentReply {
    pub response: String,
    /// Seconds elapsed, monotonic clock
    pub execution_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SentimentAnalysis>,
}

/// Answers intents with the shared model and document store.
#[derive(Clone)]
pub struct AgentService {
    documents: SharedDocumentStore,
    generator: GenerationClient,
    generation: Arc<GenerationConfig>,
}

impl AgentService {
    pub fn new(
        documents: SharedDocumentStore,
        generator: GenerationClient,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            documents,
            generator,
            generation: Arc::new(generation),
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Handle one request for `intent`.
    ///
    /// A missing or empty prompt falls back to the intent's default.
    pub async fn handle(
        &self,
        intent: Intent,
        prompt: Option<String>,
    ) -> Result<IntentReply, GenerationError> {
        let started = Instant::now();
        let profile = intent.profile();
        let request_id = Uuid::new_v4();

        let prompt = prompt
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| profile.default_prompt.to_string());

        let reference = profile
            .grounding_agent
            .map(|agent| self.documents.lookup(agent));

        let conversation = build_conversation(profile.instruction, reference.as_deref(), &prompt);

        tracing::debug!(
            %request_id,
            intent = intent.id(),
            prompt_chars = prompt.chars().count(),
            grounded = reference.as_deref().is_some_and(|r| !r.is_empty()),
            "Handling intent"
        );

        let timeout = self.generation.timeout_for(intent);
        let response = match self.generator.generate(&conversation, None, timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%request_id, intent = intent.id(), error = %e, "Generation failed");
                return Err(e);
            }
        };

        let execution_time = started.elapsed().as_secs_f64();
        tracing::info!(
            %request_id,
            intent = intent.id(),
            execution_time,
            "Intent answered"
        );

        let analysis = match intent {
            Intent::Sentiment => parse_sentiment(&response),
            _ => None,
        };

        Ok(IntentReply {
            response,
            execution_time,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{Agent, Document};
    use crate::llm::{ChatMessage, Conversation, GenerationBackend, GenerationOptions, Role};
    use crate::agent::GENERAL_INFORMATION_AGENT;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the conversations it sees and answers with a fixed reply.
    struct Recorder {
        reply: Result<&'static str, &'static str>,
        seen: Mutex<Vec<Conversation>>,
    }

    #[async_trait]
    impl GenerationBackend for Recorder {
        async fn complete(
            &self,
            conversation: &Conversation,
            _options: &GenerationOptions,
        ) -> Result<Vec<ChatMessage>, GenerationError> {
            self.seen.lock().unwrap().push(conversation.clone());
            match self.reply {
                Ok(text) => {
                    let mut transcript = conversation.messages().to_vec();
                    transcript.push(ChatMessage::new(Role::Assistant, text));
                    Ok(transcript)
                }
                Err(msg) => Err(GenerationError::Unavailable(msg.to_string())),
            }
        }
    }

    fn service(reply: Result<&'static str, &'static str>) -> (AgentService, Arc<Recorder>) {
        let backend = Arc::new(Recorder {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        let documents = DocumentStore::from_agents(vec![Agent {
            id: GENERAL_INFORMATION_AGENT.to_string(),
            documents: vec![Document {
                title: "Horaires".to_string(),
                content: "Le campus ouvre à 7h30.".to_string(),
            }],
        }]);
        let mut generation = GenerationConfig::default();
        generation.timeout = Duration::from_secs(5);
        let client = GenerationClient::new(backend.clone(), GenerationOptions::default(), 1);
        (
            AgentService::new(Arc::new(documents), client, generation),
            backend,
        )
    }

    #[tokio::test]
    async fn general_information_is_grounded() {
        let (service, backend) = service(Ok("STUB_REPLY"));
        let reply = service
            .handle(Intent::GeneralInformation, Some("Quand ouvre le campus ?".to_string()))
            .await
            .expect("handle");

        assert_eq!(reply.response, "STUB_REPLY");
        assert!(reply.execution_time >= 0.0);
        assert!(reply.analysis.is_none());

        let seen = backend.seen.lock().unwrap();
        assert!(seen[0].system().starts_with(Intent::GeneralInformation.profile().instruction));
        assert!(seen[0].system().ends_with("Horaires\n\nLe campus ouvre à 7h30."));
        assert_eq!(seen[0].user(), "Quand ouvre le campus ?");
    }

    #[tokio::test]
    async fn ungrounded_intent_uses_bare_instruction() {
        let (service, backend) = service(Ok("ok"));
        service
            .handle(Intent::Rooms, Some("Salle 101 ?".to_string()))
            .await
            .expect("handle");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].system(), Intent::Rooms.profile().instruction);
    }

    #[tokio::test]
    async fn missing_or_empty_prompt_uses_default() {
        let (service, backend) = service(Ok("ok"));
        service.handle(Intent::Other, None).await.expect("handle");
        service
            .handle(Intent::LegalFinance, Some(String::new()))
            .await
            .expect("handle");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].user(), "Puis-je vous aider avec autre chose ?");
        assert_eq!(seen[1].user(), "Quels sont les aspects juridiques à connaître ?");
    }

    #[tokio::test]
    async fn sentiment_reply_gets_analysis() {
        let (service, _) = service(Ok(r#"{"sentiment": "POSITIVE", "confidence": 0.8, "reason": "ravi"}"#));
        let reply = service
            .handle(Intent::Sentiment, Some("Super cours !".to_string()))
            .await
            .expect("handle");

        let analysis = reply.analysis.expect("analysis");
        assert_eq!(analysis.confidence, 0.8);
        assert!(reply.response.contains("POSITIVE"));
    }

    #[tokio::test]
    async fn failures_come_back_as_errors_for_every_intent() {
        let (service, _) = service(Err("model not loaded"));
        for intent in Intent::all() {
            let err = service.handle(intent, None).await.unwrap_err();
            assert!(matches!(err, GenerationError::Unavailable(_)));
        }
    }
}
