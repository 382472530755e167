// Configuration loader
// Reads ~/.recovery-coach/config.toml, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::errors::config_parse_error;

/// Environment variable naming an alternate config file
pub const CONFIG_PATH_ENV: &str = "RECOVERY_COACH_CONFIG";

/// Location of the config file, if one can be determined
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::home_dir().map(|home| home.join(".recovery-coach/config.toml"))
}

/// Load configuration from the config file (if present) and the environment
pub fn load_config() -> Result<Config> {
    let mut config = match default_config_path() {
        Some(path) if path.exists() => load_config_from(&path)?,
        _ => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Load configuration from a specific TOML file
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&contents)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Parse configuration TOML; every section is optional
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| anyhow::anyhow!(config_parse_error(&e.to_string())))
}

/// Apply environment overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let provider_key = match config.ai.provider.as_str() {
        "openai" => "OPENAI_API_KEY",
        _ => "DEEPSEEK_API_KEY",
    };
    if let Some(api_key) = non_empty(provider_key) {
        config.ai.api_key = Some(api_key);
    }

    if config.ai.provider == "deepseek" {
        if let Some(base_url) = non_empty("DEEPSEEK_BASE_URL") {
            config.ai.base_url = Some(base_url);
        }
    }

    if let Some(enabled) = non_empty("ENABLE_AI_CHAT") {
        config.ai.enabled = matches!(enabled.trim().to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(port) = non_empty("PORT") {
        let host = non_empty("HOST").unwrap_or_else(|| {
            config
                .server
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".to_string())
        });
        config.server.bind_address = format!("{}:{}", host, port.trim());
    }

    if let Some(origin) = non_empty("CORS_ORIGIN") {
        config.server.cors_origin = Some(origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplyMode;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3001");
        assert_eq!(config.ai.provider, "deepseek");
    }

    #[test]
    fn test_parse_sections() {
        let config = parse_config(
            r#"
            metrics_dir = "/tmp/coach-metrics"

            [server]
            bind_address = "0.0.0.0:8080"

            [ai]
            api_key = "sk-file"
            temperature = 0.2

            [chat]
            reply_mode = "templates"
            thinking_delay = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.ai.api_key(), Some("sk-file"));
        assert_eq!(config.ai.temperature, 0.2);
        assert_eq!(config.ai.max_tokens, 400);
        assert_eq!(config.chat.reply_mode, ReplyMode::Templates);
        assert!(!config.chat.thinking_delay);
        assert_eq!(config.metrics_dir, Some(PathBuf::from("/tmp/coach-metrics")));
    }

    #[test]
    fn test_parse_error_is_friendly() {
        let err = parse_config("[server\nbind_address = 1").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[crisis]\nlexicon_path = \"/etc/coach/lexicon.json\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(
            config.crisis.lexicon_path,
            Some(PathBuf::from("/etc/coach/lexicon.json"))
        );
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("DEEPSEEK_API_KEY", "sk-env"),
            ("DEEPSEEK_BASE_URL", "http://localhost:9999"),
            ("ENABLE_AI_CHAT", "false"),
            ("PORT", "4000"),
            ("CORS_ORIGIN", "http://localhost:3000"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned());

        assert_eq!(config.ai.api_key(), Some("sk-env"));
        assert_eq!(config.ai.base_url.as_deref(), Some("http://localhost:9999"));
        assert!(!config.ai.enabled);
        assert_eq!(config.server.bind_address, "127.0.0.1:4000");
        assert_eq!(config.server.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_openai_provider_reads_openai_key() {
        let vars = env(&[("OPENAI_API_KEY", "sk-openai"), ("DEEPSEEK_API_KEY", "sk-ds")]);
        let mut config = Config::default();
        config.ai.provider = "openai".to_string();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned());

        assert_eq!(config.ai.api_key(), Some("sk-openai"));
    }

    #[test]
    fn test_deepseek_base_url_ignored_for_openai() {
        let vars = env(&[("DEEPSEEK_BASE_URL", "https://proxy.example.com")]);

        let mut config = Config::default();
        config.ai.provider = "openai".to_string();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned());
        assert_eq!(config.ai.base_url, None);

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned());
        assert_eq!(
            config.ai.base_url.as_deref(),
            Some("https://proxy.example.com")
        );
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let vars = env(&[("DEEPSEEK_API_KEY", ""), ("ENABLE_AI_CHAT", " ")]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned());

        assert_eq!(config.ai.api_key(), None);
        assert!(config.ai.enabled);
    }
}
