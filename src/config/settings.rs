// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a compassionate recovery coach using CBT and \
motivational interviewing. Be supportive, non-judgmental, and focus on practical recovery \
strategies. Remind users that you are not a substitute for professional therapy.";

/// Values accepted for `ai.provider`
pub const SUPPORTED_PROVIDERS: &[&str] = &["deepseek", "openai"];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ai.timeout_seconds must be greater than zero")]
    ZeroTimeout,
    #[error("ai.temperature must be between 0.0 and 2.0 (got {0})")]
    TemperatureOutOfRange(f32),
    #[error("ai.max_tokens must be greater than zero")]
    ZeroMaxTokens,
    #[error("chat.max_message_chars must be greater than zero")]
    ZeroMessageLimit,
    #[error("chat.history_cap must be greater than zero")]
    ZeroHistoryCap,
    #[error("server.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),
    #[error("ai.provider must be one of deepseek, openai (got {0})")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ai: AiConfig,
    pub chat: ChatConfig,
    pub crisis: CrisisConfig,
    /// Directory for per-reply metrics; `~/.recovery-coach/metrics` when unset
    pub metrics_dir: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_PROVIDERS.contains(&self.ai.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(self.ai.provider.clone()));
        }
        if self.ai.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.ai.temperature));
        }
        if self.ai.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }
        if self.chat.max_message_chars == 0 {
            return Err(ConfigError::ZeroMessageLimit);
        }
        if self.chat.history_cap == 0 {
            return Err(ConfigError::ZeroHistoryCap);
        }
        if self
            .server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::InvalidBindAddress(
                self.server.bind_address.clone(),
            ));
        }
        Ok(())
    }

    /// Resolved metrics directory, if one can be determined
    pub fn metrics_dir(&self) -> Option<PathBuf> {
        self.metrics_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".recovery-coach/metrics")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            cors_origin: None,
        }
    }
}

/// External text-generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    /// "deepseek" or "openai"
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    /// Recent messages sent along with the system prompt
    pub history_limit: usize,
    pub system_prompt: String,
}

impl AiConfig {
    /// API key, treating an empty string as missing
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "deepseek".to_string(),
            api_key: None,
            base_url: None,
            model: None,
            temperature: 0.7,
            max_tokens: 400,
            timeout_seconds: 20,
            history_limit: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// How replies are produced when no safety rule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Delegate to the text-generation provider
    #[default]
    Generative,
    /// Use the built-in topic/emotion template catalog
    Templates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub reply_mode: ReplyMode,
    /// Pause 0.8-3.3 s before template replies
    pub thinking_delay: bool,
    pub max_message_chars: usize,
    /// Messages kept per user
    pub history_cap: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_mode: ReplyMode::Generative,
            thinking_delay: true,
            max_message_chars: 2000,
            history_cap: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisConfig {
    /// JSON lexicon replacing the built-in trigger phrases
    pub lexicon_path: Option<PathBuf>,
}
