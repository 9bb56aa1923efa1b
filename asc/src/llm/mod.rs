//! LLM Client module for AutoScrum
//!
//! Provides the client trait, provider implementations and request/response types.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, ModelReply, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model(), "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::UnknownProvider(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "mystery".to_string(),
            ..Default::default()
        };
        let result = create_client(&config);
        assert!(matches!(result, Err(LlmError::UnknownProvider(ref p)) if p == "mystery"));
    }

    #[test]
    #[serial]
    fn test_create_client_missing_key() {
        let config = LlmConfig {
            api_key_env: Some("AUTOSCRUM_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        // SAFETY: serialized with every other test that touches the environment
        unsafe { std::env::remove_var("AUTOSCRUM_TEST_UNSET_KEY") };
        let result = create_client(&config);
        assert!(matches!(result, Err(LlmError::MissingApiKey(_))));
    }

    #[test]
    #[serial]
    fn test_create_client_openai_with_key() {
        let config = LlmConfig {
            api_key_env: Some("AUTOSCRUM_TEST_SET_KEY".to_string()),
            ..Default::default()
        };
        // SAFETY: serialized with every other test that touches the environment
        unsafe { std::env::set_var("AUTOSCRUM_TEST_SET_KEY", "sk-test") };
        assert!(create_client(&config).is_ok());
        unsafe { std::env::remove_var("AUTOSCRUM_TEST_SET_KEY") };
    }
}
