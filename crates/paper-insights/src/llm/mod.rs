//! Chat-completion client wrapper
//!
//! The comparison only ever needs "send one user prompt, get the first
//! answer back", so the seam is a single-method trait. [`OpenAiClient`] talks
//! to any OpenAI-compatible `/chat/completions` endpoint.

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;

use crate::error::ComparisonError;

/// A single-prompt chat-completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
}

/// Sends prompts to a hosted model
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `request` as one user message and return the content of the
    /// first choice.
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, ComparisonError>;
}
