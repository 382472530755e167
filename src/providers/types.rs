// Request/response types shared by text-generation providers

use serde::{Deserialize, Serialize};

use crate::conversation::ChatMessage;

/// Provider-agnostic chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    /// System prompt, sent ahead of the conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Conversation messages, oldest first
    pub messages: Vec<ChatMessage>,

    /// Model name (provider-specific); empty means provider default
    pub model: String,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            system: None,
            messages,
            model: String::new(),
            max_tokens: 400,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One assistant message returned by a provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    pub text: String,
    pub stop_reason: Option<String>,
    /// Provider name (e.g., "deepseek", "openai")
    pub provider: String,
}
