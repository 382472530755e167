// User-friendly error messages
//
// Turns technical failures into messages that tell the operator what to
// check next. Used by the CLI and the config loader.

use std::fmt;

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(error: &str) -> String {
    format!(
        "Failed to parse config file\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat ~/.recovery-coach/config.toml\x1b[0m\n\n\
        2. Point at a different file:\n\
           \x1b[36mRECOVERY_COACH_CONFIG=/path/to/config.toml recovery-coach serve\x1b[0m\n\n\
        3. Common mistakes:\n\
           • Missing quotes around strings\n\
           • Unclosed section brackets []\n\
           • reply_mode must be \"generative\" or \"templates\"",
        error
    )
}

/// Format a bind failure with helpful suggestions
pub fn bind_failed_error(address: &str) -> String {
    format!(
        "Could not listen on {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Another process is already using the port\n\
        • The address is not assigned to this machine\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pick another port:\n\
           \x1b[36mrecovery-coach serve --bind 127.0.0.1:3002\x1b[0m\n\n\
        2. Find what is using the port:\n\
           \x1b[36mlsof -i :{}\x1b[0m",
        address,
        address.rsplit(':').next().unwrap_or(address)
    )
}

/// Format a missing API key notice for generative mode
pub fn api_key_missing_notice(provider: &str) -> String {
    let env_var = match provider {
        "openai" => "OPENAI_API_KEY",
        _ => "DEEPSEEK_API_KEY",
    };
    format!(
        "No {} API key configured; replies that need the AI service will use the fallback message.\n\
        Set \x1b[36m{}\x1b[0m, add api_key under [ai] in the config file, \
        or run with \x1b[36m--templates\x1b[0m.",
        provider, env_var
    )
}

/// Wrap a generic error with a suggestion
pub fn wrap_error_with_suggestion(error: impl fmt::Display, suggestion: &str) -> String {
    format!("{}\n\n\x1b[1;33mSuggestion:\x1b[0m {}", error, suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_error_mentions_path() {
        let msg = config_parse_error("expected `]`");
        assert!(msg.contains("expected `]`"));
        assert!(msg.contains("~/.recovery-coach/config.toml"));
    }

    #[test]
    fn test_bind_failed_mentions_port() {
        let msg = bind_failed_error("127.0.0.1:3001");
        assert!(msg.contains("lsof -i :3001"));
    }

    #[test]
    fn test_api_key_notice_names_env_var() {
        assert!(api_key_missing_notice("deepseek").contains("DEEPSEEK_API_KEY"));
        assert!(api_key_missing_notice("openai").contains("OPENAI_API_KEY"));
    }
}
