//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations wrap one chat completion service. Callers own timeouts;
/// providers only enforce their transport-level limits.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for the conversation in `request`
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
