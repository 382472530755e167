// Text-generation providers
//
// The coach delegates to an external chat-completion API when no safety
// rule fires. Providers implement one request/response call with a fixed
// timeout; failures are returned as errors and mapped to a static reply by
// the caller.

use anyhow::Result;
use async_trait::async_trait;

pub mod types;

pub mod openai;

pub mod factory;

pub use factory::create_provider;
pub use openai::OpenAiCompatibleProvider;
pub use types::{ProviderRequest, ProviderResponse};

/// Trait for chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a request and wait for one assistant message
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Provider name (e.g., "deepseek", "openai")
    fn name(&self) -> &str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;
}
