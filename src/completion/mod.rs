//! Completion client abstraction
//!
//! Provides a trait-based abstraction over the caller-supplied text
//! completion function so the refinement and enrichment paths can be
//! tested without a live model. Whether a client is available is
//! decided once at construction; there is no runtime capability
//! probing.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Trait for the optional LLM completion collaborator
///
/// The engine only ever uses this for refinement and enrichment.
/// Implementations may fail or time out freely; every call site treats
/// an error as "keep the deterministic result".
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue a single completion request and return the raw text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Shared handle to an optional completion client
pub type SharedCompletion = Option<Arc<dyn CompletionClient>>;

/// Mock implementation of [`CompletionClient`] for testing
///
/// Returns queued responses in order and records every prompt it was
/// asked to complete.
pub struct MockCompletionClient {
    responses: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub async fn add_response(&self, response: &str) {
        self.responses.lock().await.push(Ok(response.to_string()));
    }

    /// Queue an error response
    pub async fn add_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push(Err(anyhow::anyhow!(message.to_string())));
    }

    /// Get the prompts this client was asked to complete
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(anyhow::anyhow!("no mock response configured"));
        }
        responses.remove(0)
    }
}
