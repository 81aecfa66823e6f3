//! Shared generation client.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;

use super::{ChatMessage, Conversation, GenerationBackend, GenerationError, GenerationOptions, Role};

/// Process-wide handle on the single model instance.
///
/// At most `concurrency` calls reach the backend at once; the rest wait in
/// FIFO order on the semaphore. Cloning shares the same backend and permits.
///
/// The backend call runs on its own task that owns the permit. A caller that
/// times out stops waiting, but the permit stays taken until the backend call
/// itself returns, so a model still busy with an abandoned request is never
/// handed the next one.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    permits: Arc<Semaphore>,
    options: GenerationOptions,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        options: GenerationOptions,
        concurrency: usize,
    ) -> Self {
        Self {
            backend,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            options,
        }
    }

    /// Run one generation and return the assistant reply.
    ///
    /// `options` overrides the client defaults for this call. `timeout`
    /// bounds queue wait plus the backend call. The backend is invoked
    /// exactly once; there is no retry.
    pub async fn generate(
        &self,
        conversation: &Conversation,
        options: Option<&GenerationOptions>,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        let deadline = Instant::now() + timeout;

        let permit = tokio::time::timeout_at(deadline, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| GenerationError::Timeout(timeout))?
            .map_err(|_| GenerationError::Unavailable("generation queue closed".to_string()))?;

        let backend = Arc::clone(&self.backend);
        let conversation = conversation.clone();
        let options = options.copied().unwrap_or(self.options);
        let call = tokio::spawn(async move {
            let result = backend.complete(&conversation, &options).await;
            drop(permit);
            result
        });

        let transcript = match tokio::time::timeout_at(deadline, call).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(GenerationError::Unavailable(format!(
                    "generation task failed: {}",
                    join_error
                )))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs_f64(),
                    "Generation timed out, model stays reserved until the backend call ends"
                );
                return Err(GenerationError::Timeout(timeout));
            }
        };

        tracing::trace!(turns = transcript.len(), "Generation transcript received");
        extract_reply(&transcript)
    }
}

/// Pick the assistant reply out of a transcript.
///
/// The last assistant turn wins, wherever it sits, so echoed system or user
/// turns never shift the result.
pub fn extract_reply(transcript: &[ChatMessage]) -> Result<String, GenerationError> {
    transcript
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
        .ok_or(GenerationError::MissingAssistantReply)
}
