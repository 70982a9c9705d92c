//! LLM Provider Trait
//!
//! Defines the common interface for text-completion providers.

use async_trait::async_trait;

use super::types::{LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig};

/// Trait that all text-completion providers must implement.
///
/// Provides a unified interface for:
/// - Single message completions (send_message)
/// - Prompt-in, text-out completion (complete)
/// - Health checking
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send messages and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history
    /// * `system` - Optional system prompt
    /// * `request_options` - Per-request overrides
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse>;

    /// Send a single prompt and return the raw reply text.
    ///
    /// A reply without text content yields an empty string.
    async fn complete(&self, prompt: &str, request_options: LlmRequestOptions) -> LlmResult<String> {
        let response = self
            .send_message(vec![Message::user(prompt)], None, request_options)
            .await?;
        Ok(response.content.unwrap_or_default())
    }

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> LlmResult<()>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;

    /// List available models (if supported by provider).
    ///
    /// Returns None if the provider doesn't support model listing.
    async fn list_models(&self) -> LlmResult<Option<Vec<String>>> {
        Ok(None)
    }
}
