//! Configuration file handling.
//!
//! Reads from `~/.config/passbook/passbook.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the stored credentials.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// How long a toast stays on screen, in milliseconds.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    /// Text shown in place of a hidden password.
    #[serde(default = "default_mask")]
    pub mask: String,
    /// Whether the form's password field starts out revealed.
    #[serde(default)]
    pub reveal_draft_by_default: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("passbook"))
        .unwrap_or_else(|| PathBuf::from("passbook-data"))
}

fn default_toast_duration_ms() -> u64 {
    3000
}

fn default_mask() -> String {
    "••••••••".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            toast_duration_ms: default_toast_duration_ms(),
            mask: default_mask(),
            reveal_draft_by_default: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path.
    /// Otherwise, load from the default XDG config location.
    /// Creates a default config file if it doesn't exist (only for default path).
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        match custom_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::load_from(&path)
            }
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    let config = Config::default();
                    config.save_to(&path)?;
                    tracing::info!("Created default config at {}", path.display());
                    return Ok(config);
                }
                Self::load_from(&path)
            }
        }
    }

    /// Parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("passbook").join("passbook.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str("toast_duration_ms = 500").unwrap();
        assert_eq!(config.toast_duration_ms, 500);
        assert_eq!(config.mask, "••••••••");
        assert!(!config.reveal_draft_by_default);
    }

    #[test]
    fn custom_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("passbook.toml");
        let config = Config {
            data_dir: dir.path().join("data"),
            toast_duration_ms: 1200,
            mask: "***".into(),
            reveal_draft_by_default: true,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load(Some(path)).unwrap(), config);
    }
}
