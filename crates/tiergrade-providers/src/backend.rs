//! Chat-completion backend abstraction.

use async_trait::async_trait;

use crate::error::ProviderError;

/// One system + user exchange with a chat model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    pub model: String,
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
    /// Sampling temperature; 0.0 for reproducible verdicts.
    pub temperature: f64,
}

/// A chat-completion API that returns the model's text reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human-readable backend name (e.g. "anthropic").
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
