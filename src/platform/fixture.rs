//! Fixture Topology Backend
//!
//! An in-memory display topology described in TOML. Implements both display
//! backends so the CLI runs on any platform and integration tests can drive
//! enumeration, resolution and rotation end to end.
//!
//! ```toml
//! # Flag combinations answered with "invalid parameter"
//! reject_flags = [0x02]
//!
//! [[output]]
//! adapter_id = 0x12A4F
//! output_id = 4
//! gdi_name = '\\.\DISPLAY1'
//! friendly_name = "Studio Display"
//! manufacturer = "DEL"
//! product_code = 0xA0B1
//! x = 0
//! y = 0
//! width = 2560
//! height = 1440
//! ```

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::display::{
    encode_manufacturer_id, ApplyCode, BufferSizes, DisplayConfigBackend, LegacyDevice,
    LegacyDisplayBackend, LegacyMode, ModeUpdate, NativeError, Orientation, PathEndpoint,
    PixelRect, QueryScope, QueryStrategy, RawMode, RawModeKind, RawPath, RawTopology,
    TargetDeviceName,
};

fn default_true() -> bool {
    true
}

/// One output of a fixture topology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureOutput {
    /// Adapter id
    pub adapter_id: u64,

    /// Target id
    pub output_id: u32,

    /// Source id (defaults to the output's position in the file)
    #[serde(default)]
    pub source_id: Option<u32>,

    /// GDI device name; empty simulates a failing source-name query
    #[serde(default)]
    pub gdi_name: String,

    /// Device interface path
    #[serde(default)]
    pub device_path: String,

    /// Friendly name; empty simulates a failing target-name query
    #[serde(default)]
    pub friendly_name: String,

    /// Three-letter EDID manufacturer code
    #[serde(default)]
    pub manufacturer: Option<String>,

    /// EDID product code
    #[serde(default)]
    pub product_code: Option<u16>,

    /// Desktop x
    #[serde(default)]
    pub x: i32,

    /// Desktop y
    #[serde(default)]
    pub y: i32,

    /// Raster width
    pub width: u32,

    /// Raster height
    pub height: u32,

    /// Current orientation
    #[serde(default = "default_orientation")]
    pub orientation: Orientation,

    /// Path is active
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_orientation() -> Orientation {
    Orientation::Landscape
}

impl FixtureOutput {
    /// Desktop bounds
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_origin_size(self.x, self.y, self.width as i32, self.height as i32)
    }
}

/// Fixture file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureTopology {
    /// Strategy flag values rejected as invalid parameters
    #[serde(default)]
    pub reject_flags: Vec<u32>,

    /// Outputs in path order
    #[serde(default, rename = "output")]
    pub outputs: Vec<FixtureOutput>,
}

impl FixtureTopology {
    /// Parse a fixture from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse fixture topology")
    }

    fn source_id(&self, index: usize) -> u32 {
        self.outputs[index].source_id.unwrap_or(index as u32)
    }
}

/// Display backends over a [`FixtureTopology`]
pub struct FixtureBackend {
    topology: RwLock<FixtureTopology>,
}

impl FixtureBackend {
    /// Load a fixture file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read fixture file: {}", path.display()))?;
        Ok(Self::from_topology(FixtureTopology::from_toml(&content)?))
    }

    /// Wrap an already built topology
    pub fn from_topology(topology: FixtureTopology) -> Self {
        Self {
            topology: RwLock::new(topology),
        }
    }

    /// Replace the topology, simulating a hot-plug
    pub fn set_topology(&self, topology: FixtureTopology) {
        *self.topology.write() = topology;
    }

    /// Copy of the current topology
    pub fn topology(&self) -> FixtureTopology {
        self.topology.read().clone()
    }

    fn rejects(&self, strategy: QueryStrategy) -> bool {
        self.topology.read().reject_flags.contains(&strategy.flags())
    }
}

impl DisplayConfigBackend for FixtureBackend {
    fn buffer_sizes(&self, strategy: QueryStrategy) -> std::result::Result<BufferSizes, NativeError> {
        if self.rejects(strategy) {
            return Err(NativeError::INVALID_PARAMETER);
        }

        let count = self.topology.read().outputs.len() as u32;
        Ok(BufferSizes {
            paths: count,
            modes: count * 2,
        })
    }

    fn query(&self, strategy: QueryStrategy, _sizes: BufferSizes) -> std::result::Result<RawTopology, NativeError> {
        if self.rejects(strategy) {
            return Err(NativeError::INVALID_PARAMETER);
        }

        let topology = self.topology.read();
        let mut raw = RawTopology::default();

        for (index, output) in topology.outputs.iter().enumerate() {
            if strategy.scope == QueryScope::ActiveOnly && !output.active {
                continue;
            }

            let source = PathEndpoint {
                adapter_id: output.adapter_id,
                id: topology.source_id(index),
            };
            let target = PathEndpoint {
                adapter_id: output.adapter_id,
                id: output.output_id,
            };

            raw.paths.push(RawPath {
                source,
                target,
                active: output.active,
            });
            raw.modes.push(RawMode {
                endpoint: target,
                kind: RawModeKind::Target,
            });
            raw.modes.push(RawMode {
                endpoint: source,
                kind: RawModeKind::Source {
                    x: output.x,
                    y: output.y,
                    width: output.width,
                    height: output.height,
                },
            });
        }

        debug!("Fixture answered {} with {} paths", strategy, raw.paths.len());
        Ok(raw)
    }

    fn source_name(&self, source: PathEndpoint) -> std::result::Result<String, NativeError> {
        let topology = self.topology.read();
        topology
            .outputs
            .iter()
            .enumerate()
            .find(|(index, o)| o.adapter_id == source.adapter_id && topology.source_id(*index) == source.id)
            .map(|(_, o)| o.gdi_name.clone())
            .filter(|name| !name.is_empty())
            .ok_or(NativeError::GEN_FAILURE)
    }

    fn target_name(&self, target: PathEndpoint) -> std::result::Result<TargetDeviceName, NativeError> {
        let topology = self.topology.read();
        let output = topology
            .outputs
            .iter()
            .find(|o| o.adapter_id == target.adapter_id && o.output_id == target.id)
            .ok_or(NativeError::GEN_FAILURE)?;

        if output.friendly_name.is_empty() {
            return Err(NativeError::GEN_FAILURE);
        }

        Ok(TargetDeviceName {
            friendly_name: output.friendly_name.clone(),
            device_path: output.device_path.clone(),
            edid_manufacturer_id: output.manufacturer.as_deref().and_then(encode_manufacturer_id),
            edid_product_code: output.product_code,
        })
    }
}

impl LegacyDisplayBackend for FixtureBackend {
    fn devices(&self) -> Vec<LegacyDevice> {
        self.topology
            .read()
            .outputs
            .iter()
            .filter(|o| o.active && !o.gdi_name.is_empty())
            .map(|o| LegacyDevice {
                name: o.gdi_name.clone(),
                bounds: o.bounds(),
            })
            .collect()
    }

    fn current_mode(&self, device: &str) -> std::result::Result<LegacyMode, NativeError> {
        self.topology
            .read()
            .outputs
            .iter()
            .find(|o| o.gdi_name == device)
            .map(|o| LegacyMode {
                width: o.width,
                height: o.height,
                orientation: o.orientation.legacy_value(),
            })
            .ok_or(NativeError::GEN_FAILURE)
    }

    fn apply_mode(&self, device: &str, update: &ModeUpdate, persist: bool) -> ApplyCode {
        if update.width == 0 || update.height == 0 {
            return ApplyCode::BAD_MODE;
        }

        let mut topology = self.topology.write();
        let Some(output) = topology.outputs.iter_mut().find(|o| o.gdi_name == device) else {
            return ApplyCode::BAD_PARAM;
        };

        output.orientation = update.orientation;
        output.width = update.width;
        output.height = update.height;
        debug!("Fixture {} now {}x{} at {} (persist={})", device, update.width, update.height, update.orientation, persist);
        ApplyCode::SUCCESSFUL
    }
}
