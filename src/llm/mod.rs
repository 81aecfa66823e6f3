//! Text-generation plumbing.
//!
//! A [`GenerationBackend`] speaks one wire format and returns the full
//! transcript of turns. [`GenerationClient`] owns the single backend instance,
//! serializes access to it, applies timeouts and pulls the assistant reply
//! out of the transcript by role.

mod client;
mod error;
mod openai;
mod pipeline;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::{extract_reply, GenerationClient};
pub use error::GenerationError;
pub use openai::OpenAiCompatibleBackend;
pub use pipeline::PipelineBackend;
pub use types::{ChatMessage, Conversation, GenerationOptions, Role};

use crate::config::{BackendKind, GenerationConfig};

/// Upper bound on a single HTTP call to the backend, independent of the
/// per-intent timeout. A call abandoned by [`GenerationClient`] holds its
/// concurrency slot until this fires.
pub(crate) const BACKEND_REQUEST_TIMEOUT: std::time::Duration =
    std::time::Duration::from_secs(300);

/// One external text-generation capability.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run the model once on `conversation` and return every turn it produced,
    /// input echoes included.
    async fn complete(
        &self,
        conversation: &Conversation,
        options: &GenerationOptions,
    ) -> Result<Vec<ChatMessage>, GenerationError>;
}

/// Build the backend selected by configuration.
pub fn backend_from_config(config: &GenerationConfig) -> Arc<dyn GenerationBackend> {
    match config.backend {
        BackendKind::OpenAi => Arc::new(OpenAiCompatibleBackend::new(
            config.url.clone(),
            config.model.clone(),
            config.api_key.clone(),
        )),
        BackendKind::HfPipeline => Arc::new(PipelineBackend::new(
            config.url.clone(),
            config.api_key.clone(),
        )),
    }
}
