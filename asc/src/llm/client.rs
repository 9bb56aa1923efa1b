//! LlmClient trait definition

use async_trait::async_trait;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmError, ModelReply};

/// Stateless LLM client - each call is independent
///
/// Conversation context is whatever the caller puts in the request; the
/// client itself keeps nothing between calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Send a request and resolve the response into a `ModelReply`
    async fn invoke(&self, request: CompletionRequest) -> Result<ModelReply, LlmError> {
        debug!(message_count = request.messages.len(), "LlmClient::invoke: called");
        let response = self.complete(request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            stop_reason = ?response.stop_reason,
            "LlmClient::invoke: response received"
        );
        Ok(ModelReply::from(response))
    }
}
