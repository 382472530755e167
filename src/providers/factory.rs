// Provider factory
//
// Creates the text-generation provider from configuration

use anyhow::{bail, Result};
use std::time::Duration;

use super::openai::OpenAiCompatibleProvider;
use super::LlmProvider;
use crate::config::AiConfig;

/// Create the configured provider
///
/// Returns `Ok(None)` when AI chat is disabled or no API key is set; the
/// coach then answers with its static fallback.
pub fn create_provider(config: &AiConfig) -> Result<Option<Box<dyn LlmProvider>>> {
    if !config.enabled {
        tracing::info!("AI chat disabled");
        return Ok(None);
    }

    let Some(api_key) = config.api_key() else {
        tracing::warn!(provider = %config.provider, "No API key configured for provider");
        return Ok(None);
    };

    let timeout = Duration::from_secs(config.timeout_seconds);

    let mut provider = match config.provider.as_str() {
        "deepseek" => OpenAiCompatibleProvider::new_deepseek(api_key.to_string(), timeout)?,
        "openai" => OpenAiCompatibleProvider::new_openai(api_key.to_string(), timeout)?,
        other => bail!("Unknown provider: {}", other),
    };

    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    if let Some(model) = &config.model {
        provider = provider.with_model(model.clone());
    }

    Ok(Some(Box::new(provider)))
}
