//! Configuration loading and management for wepress.
//!
//! Loads settings from `wepress.toml` with environment variable overrides for
//! sensitive data. A missing config file is not an error: the defaults run
//! the app fully mocked, which is the out-of-the-box demo experience.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Review agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Provider to review with: "mock" or the name of a `[[providers]]` entry
    pub provider: String,
    /// Model identifier passed through to the endpoint
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "deepseek-chat".to_string(),
        }
    }
}

/// One text-generation backend entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Display name, also the value `agent.provider` refers to
    pub name: String,
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ProviderEntry {
    fn new(name: &str, endpoint: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            api_key: String::new(),
            enabled: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            providers: default_providers(),
        }
    }
}

/// The three providers the app ships with, keys unset and disabled,
/// mirroring a fresh workspace.
fn default_providers() -> Vec<ProviderEntry> {
    vec![
        ProviderEntry::new("OpenAI", "https://api.openai.com/v1/chat/completions"),
        ProviderEntry::new("Anthropic", "https://api.anthropic.com/v1/chat/completions"),
        ProviderEntry::new("Baidu", "https://qianfan.baidubce.com/v2/chat/completions"),
    ]
}

impl Config {
    /// Load configuration from the default location (wepress.toml in cwd or
    /// home), falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(config_path) => Self::load_from(&config_path),
            None => Ok(Self::apply_env_overrides(Self::default())),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Override API keys from environment variables. The conventional names
    /// (`OPENAI_API_KEY`) are read first; `WEPRESS_`-prefixed variants win
    /// when both are set.
    fn apply_env_overrides(mut config: Config) -> Config {
        let overrides = [
            ("openai", "OPENAI_API_KEY", "WEPRESS_OPENAI_KEY"),
            ("anthropic", "ANTHROPIC_API_KEY", "WEPRESS_ANTHROPIC_KEY"),
            ("baidu", "BAIDU_API_KEY", "WEPRESS_BAIDU_KEY"),
        ];
        for (name, var, app_var) in overrides {
            let key = std::env::var(app_var).or_else(|_| std::env::var(var));
            if let Ok(key) = key {
                if let Some(entry) = config
                    .providers
                    .iter_mut()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                {
                    entry.api_key = key;
                }
            }
        }
        config
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from("wepress.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("wepress").join("wepress.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Look up a provider entry by name, case-insensitively
    pub fn provider(&self, name: &str) -> Result<&ProviderEntry, ConfigError> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    /// Mutable lookup, used by the settings page
    pub fn provider_mut(&mut self, name: &str) -> Result<&mut ProviderEntry, ConfigError> {
        self.providers
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reviews_with_the_mock_provider() {
        let config = Config::default();
        assert_eq!(config.agent.provider, "mock");
        assert_eq!(config.providers.len(), 3);
        assert!(config.providers.iter().all(|p| !p.enabled));
        assert!(config.providers.iter().all(|p| p.api_key.is_empty()));
    }

    #[test]
    fn provider_lookup_is_case_insensitive() {
        let config = Config::default();
        assert_eq!(config.provider("openai").unwrap().name, "OpenAI");
        assert_eq!(config.provider("OPENAI").unwrap().name, "OpenAI");
        assert!(matches!(
            config.provider("deepmind"),
            Err(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [agent]
            provider = "OpenAI"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.agent.provider, "OpenAI");
        assert_eq!(parsed.providers.len(), 3);
    }

    #[test]
    fn providers_can_be_declared_in_toml() {
        let parsed: Config = toml::from_str(
            r#"
            [[providers]]
            name = "Local"
            endpoint = "http://127.0.0.1:11434/v1/chat/completions"
            api_key = "unused"
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(parsed.providers.len(), 1);
        assert!(parsed.providers[0].enabled);
        assert_eq!(parsed.agent.provider, "mock");
    }
}
