//! Configuration management
//!
//! API endpoint settings and storage locations, kept as TOML under the
//! platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::gateway::openai;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat-completion API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Settings for the chat-completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for every call
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    openai::DEFAULT_MODEL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the progress CSV location; defaults to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path
            .parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the config file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "orato", "orato")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "orato", "orato")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, openai::DEFAULT_BASE_URL);
        assert_eq!(config.api.model, openai::DEFAULT_MODEL);
        assert_eq!(config.storage.progress_path, None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.model, "gpt-4o");
        assert_eq!(config.api.base_url, openai::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.api.base_url = "https://proxy.internal/v1".to_string();
        config.storage.progress_path = Some(PathBuf::from("/tmp/progress.csv"));

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api.base_url, "https://proxy.internal/v1");
        assert_eq!(
            parsed.storage.progress_path,
            Some(PathBuf::from("/tmp/progress.csv"))
        );
    }
}
