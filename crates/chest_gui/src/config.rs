//! Runtime settings for the GUI subsystem.
//!
//! Every field has a serde default, so a host can embed [`GuiSettings`] in its
//! own TOML config and only spell out what it changes.

use crate::container::{MAX_COLS, MAX_ROWS};
use crate::router::MoveLimit;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_HISTORY: usize = 32;

fn default_max_rows() -> usize {
    MAX_ROWS
}

fn default_max_cols() -> usize {
    MAX_COLS
}

fn default_navigation() -> String {
    crate::container::DEFAULT_NAVIGATION.to_string()
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_failure_message() -> String {
    "Something went wrong while handling that action.".to_string()
}

/// Tunables shared by every container a [`GuiManager`](crate::GuiManager)
/// drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiSettings {
    /// Tallest container the host can show
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Widest container the host can show
    #[serde(default = "default_max_cols")]
    pub max_cols: usize,
    /// What players may do with items in the top inventory
    #[serde(default)]
    pub move_limit: MoveLimit,
    /// Navigation context used by containers that do not name one
    #[serde(default = "default_navigation")]
    pub default_navigation: String,
    /// Entries kept per history direction
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Sent to a player when one of their handlers failed
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_cols: default_max_cols(),
            move_limit: MoveLimit::default(),
            default_navigation: default_navigation(),
            max_history: default_max_history(),
            failure_message: default_failure_message(),
        }
    }
}

impl GuiSettings {
    /// Checks the settings for values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rows == 0 || self.max_cols == 0 {
            return Err("max_rows and max_cols must be greater than 0".to_string());
        }
        if self.max_history == 0 {
            return Err("max_history must be greater than 0".to_string());
        }
        if self.default_navigation.trim().is_empty() {
            return Err("default_navigation cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = GuiSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_rows, 6);
        assert_eq!(settings.max_cols, 9);
        assert_eq!(settings.move_limit, MoveLimit::Locked);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: GuiSettings = toml::from_str(
            r#"
            move_limit = "movable_only"
            max_history = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.move_limit, MoveLimit::MovableOnly);
        assert_eq!(settings.max_history, 4);
        assert_eq!(settings.max_rows, 6);
        assert_eq!(settings.default_navigation, "default");
    }

    #[test]
    fn test_invalid_settings() {
        let settings = GuiSettings {
            max_history: 0,
            ..GuiSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = GuiSettings {
            default_navigation: "  ".into(),
            ..GuiSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
