//! Configuration for the sandbox host.
//!
//! The GUI runtime settings are embedded as-is under `[gui]`, next to the
//! tick loop and logging sections.

use anyhow::{Context, Result};
use chest_gui::GuiSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}

fn default_tick_budget() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gui: GuiSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Tick loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Milliseconds between scheduler ticks
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Ticks to run before the sandbox shuts itself down
    #[serde(default = "default_tick_budget")]
    pub tick_budget: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            tick_budget: default_tick_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to emit structured JSON logs
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a TOML file, writing the defaults to
    /// `path` first if nothing is there yet.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config: AppConfig =
                toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.gui.validate()?;

        if self.scheduler.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chest_gui::MoveLimit;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.scheduler.tick_interval_ms, 50);
        assert_eq!(config.scheduler.tick_budget, 200);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.gui, GuiSettings::default());
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_creates_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sandbox.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.scheduler.tick_interval_ms, 50);
        assert!(path.exists());

        // The written file loads back to the same values
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.gui, config.gui);
        assert_eq!(reloaded.scheduler.tick_budget, config.scheduler.tick_budget);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[gui]
move_limit = "movable_only"
max_history = 4

[scheduler]
tick_interval_ms = 10

[logging]
level = "debug"
json_format = true
"#;
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.gui.move_limit, MoveLimit::MovableOnly);
        assert_eq!(config.gui.max_history, 4);
        assert_eq!(config.gui.max_rows, 6);
        assert_eq!(config.scheduler.tick_interval_ms, 10);
        assert_eq!(config.scheduler.tick_budget, 200);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_from_invalid_file() {
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), "[scheduler\ntick_interval_ms = ").await.unwrap();

        assert!(AppConfig::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));

        let mut config = AppConfig::default();
        config.scheduler.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.gui.max_history = 0;
        assert!(config.validate().is_err());
    }
}
