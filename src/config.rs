use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ResponderError, Result};
use crate::scheduler::{DEFAULT_MAX_INTERVAL_MS, DEFAULT_MIN_INTERVAL_MS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_label_name")]
    pub label_name: String,
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            label_name: default_label_name(),
            body: default_body(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub dry_run: bool,
}

fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

fn default_max_interval_ms() -> u64 {
    DEFAULT_MAX_INTERVAL_MS
}

fn default_label_name() -> String {
    "Vacation Reply".to_string()
}

fn default_body() -> String {
    "I am currently out of office and will reply to your message when I return.".to_string()
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ResponderError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ResponderError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ResponderError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResponderError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content).await.map_err(|e| {
            ResponderError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.poll.min_interval_ms == 0 {
            return Err(ResponderError::ConfigError(
                "poll.min_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.poll.min_interval_ms > self.poll.max_interval_ms {
            return Err(ResponderError::ConfigError(format!(
                "poll.min_interval_ms ({}) cannot exceed poll.max_interval_ms ({})",
                self.poll.min_interval_ms, self.poll.max_interval_ms
            )));
        }

        if self.reply.label_name.trim().is_empty() {
            return Err(ResponderError::ConfigError(
                "reply.label_name must not be empty".to_string(),
            ));
        }
        if self.reply.body.trim().is_empty() {
            return Err(ResponderError::ConfigError(
                "reply.body must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Write an example configuration file with commented defaults
    pub async fn create_example(path: &Path) -> Result<()> {
        let example = r#"# vacation-responder configuration

[poll]
# Delay between inbox checks, drawn uniformly from [min, max] milliseconds
min_interval_ms = 45000
max_interval_ms = 120000

[reply]
# Marker label applied to every auto-replied thread
label_name = "Vacation Reply"
# Canned reply body
body = "I am currently out of office and will reply to your message when I return."

[execution]
# Log what would happen without sending or labeling
dry_run = false
"#;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ResponderError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        tokio::fs::write(path, example).await.map_err(|e| {
            ResponderError::ConfigError(format!("Failed to write example config: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll.min_interval_ms, 45_000);
        assert_eq!(config.poll.max_interval_ms, 120_000);
        assert_eq!(config.reply.label_name, "Vacation Reply");
        assert!(!config.execution.dry_run);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.poll.min_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_interval() {
        let mut config = Config::default();
        config.poll.min_interval_ms = 120_000;
        config.poll.max_interval_ms = 45_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_label() {
        let mut config = Config::default();
        config.reply.label_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_body() {
        let mut config = Config::default();
        config.reply.body = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [poll]
            min_interval_ms = 60000
            "#,
        )
        .unwrap();

        assert_eq!(config.poll.min_interval_ms, 60_000);
        assert_eq!(config.poll.max_interval_ms, 120_000);
        assert_eq!(config.reply.label_name, "Vacation Reply");
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).await.unwrap();
        assert_eq!(config.reply.label_name, "Vacation Reply");
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.reply.label_name = "Away".to_string();
        config.save(&path).await.unwrap();

        let loaded = Config::load(&path).await.unwrap();
        assert_eq!(loaded.reply.label_name, "Away");
    }

    #[tokio::test]
    async fn test_create_example_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("example.toml");

        Config::create_example(&path).await.unwrap();

        let loaded = Config::load(&path).await.unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded.poll.min_interval_ms, 45_000);
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[poll]\nmin_interval_ms = 0\n")
            .await
            .unwrap();

        assert!(Config::load(&path).await.is_err());
    }
}
