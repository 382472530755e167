// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_config_from, parse_config,
    CONFIG_PATH_ENV,
};
pub use settings::{
    AiConfig, ChatConfig, Config, ConfigError, CrisisConfig, ReplyMode, ServerConfig,
    DEFAULT_SYSTEM_PROMPT,
};
