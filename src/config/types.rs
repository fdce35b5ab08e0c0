//! Configuration type definitions
//!
//! `[logging]`, `[rotation]` and `[names]` drive the command-line binary.
//! `[placement]` has no command-line consumer: the binary never tracks
//! windows. Applications embedding the library read it through
//! [`PlacementTracker::from_config`] and [`PlacementConfig::default_options`],
//! and pass `reconcile_on_dpi_change` to [`reconcile_on_change`].
//!
//! [`PlacementTracker::from_config`]: crate::placement::PlacementTracker::from_config
//! [`reconcile_on_change`]: crate::notify::reconcile_on_change

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::placement::PlacementOptions;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("error", "warn", "info", "debug", "trace")
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    pub format: String,

    /// Directory for a daily-rotated log file (None = stderr only)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            log_dir: None,
        }
    }
}

/// Rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Write rotations to the registry so they survive a reboot
    pub persist: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { persist: true }
    }
}

/// Window placement configuration, read by embedding applications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Activate windows when moving them
    pub activate: bool,

    /// Logical margin used when a placement does not name one
    pub default_margin: f64,

    /// Reconcile on DPI changes as well as display-settings changes
    pub reconcile_on_dpi_change: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            activate: false,
            default_margin: 0.0,
            reconcile_on_dpi_change: true,
        }
    }
}

impl PlacementConfig {
    /// Options for a placement that asks for nothing but a position
    pub fn default_options(&self) -> PlacementOptions {
        PlacementOptions::default().with_margin(self.default_margin)
    }
}

/// Friendly-name store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// JSON store file (None = platform config directory)
    pub store_path: Option<PathBuf>,
}

impl NamesConfig {
    /// Store file, falling back to `<config dir>/display-anchor/names.json`
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("display-anchor")
                .join("names.json")
        })
    }
}
