//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod types;

pub use types::{LoggingConfig, NamesConfig, PlacementConfig, RotationConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Rotation configuration
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Window placement configuration
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Friendly-name store configuration
    #[serde(default)]
    pub names: NamesConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, using defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file {} not found, using defaults", path.display());
        Ok(Self::default_config())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            logging: LoggingConfig::default(),
            rotation: RotationConfig::default(),
            placement: PlacementConfig::default(),
            names: NamesConfig::default(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        let margin = self.placement.default_margin;
        if !margin.is_finite() || margin < 0.0 {
            anyhow::bail!("default_margin must be a non-negative number, got {}", margin);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, log_dir: Option<PathBuf>, names_store: Option<PathBuf>) -> Self {
        if let Some(dir) = log_dir {
            self.logging.log_dir = Some(dir);
        }
        if let Some(path) = names_store {
            self.names.store_path = Some(path);
        }

        self
    }
}
