//! Display Backend Traits
//!
//! Seams between the platform-independent display logic and the OS. The
//! Win32 implementation lives in `platform::win32`; `platform::fixture`
//! provides a TOML-described topology for tests and the CLI.

use std::fmt;

use crate::display::model::{Orientation, PixelRect};

/// Raw native result code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeError(pub i32);

impl NativeError {
    /// `ERROR_INVALID_PARAMETER`
    pub const INVALID_PARAMETER: NativeError = NativeError(87);

    /// `ERROR_NOT_SUPPORTED`
    pub const NOT_SUPPORTED: NativeError = NativeError(50);

    /// `ERROR_GEN_FAILURE`
    pub const GEN_FAILURE: NativeError = NativeError(31);

    /// The platform does not accept this flag combination
    pub fn is_invalid_parameter(&self) -> bool {
        *self == Self::INVALID_PARAMETER
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native error {}", self.0)
    }
}

/// Which paths a display-configuration query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    /// Only currently active paths
    ActiveOnly,
    /// The persisted database configuration
    Database,
    /// Every possible path, active or not
    AllPaths,
}

/// One flag combination for the display-configuration query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStrategy {
    /// Path scope
    pub scope: QueryScope,
    /// Request virtual-mode-aware records
    pub virtual_mode_aware: bool,
}

impl QueryStrategy {
    const QDC_ALL_PATHS: u32 = 0x0000_0001;
    const QDC_ONLY_ACTIVE_PATHS: u32 = 0x0000_0002;
    const QDC_DATABASE_CURRENT: u32 = 0x0000_0004;
    const QDC_VIRTUAL_MODE_AWARE: u32 = 0x0000_0010;

    /// Strategies in the order they are attempted
    pub const PRIORITY: [QueryStrategy; 6] = [
        QueryStrategy::new(QueryScope::ActiveOnly, false),
        QueryStrategy::new(QueryScope::ActiveOnly, true),
        QueryStrategy::new(QueryScope::Database, false),
        QueryStrategy::new(QueryScope::Database, true),
        QueryStrategy::new(QueryScope::AllPaths, false),
        QueryStrategy::new(QueryScope::AllPaths, true),
    ];

    /// Create a strategy
    pub const fn new(scope: QueryScope, virtual_mode_aware: bool) -> Self {
        Self {
            scope,
            virtual_mode_aware,
        }
    }

    /// Native `QDC_*` flag bits
    pub const fn flags(&self) -> u32 {
        let scope = match self.scope {
            QueryScope::ActiveOnly => Self::QDC_ONLY_ACTIVE_PATHS,
            QueryScope::Database => Self::QDC_DATABASE_CURRENT,
            QueryScope::AllPaths => Self::QDC_ALL_PATHS,
        };
        if self.virtual_mode_aware {
            scope | Self::QDC_VIRTUAL_MODE_AWARE
        } else {
            scope
        }
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            QueryScope::ActiveOnly => "active-only",
            QueryScope::Database => "database",
            QueryScope::AllPaths => "all-paths",
        };
        if self.virtual_mode_aware {
            write!(f, "{}+virtual-mode-aware", scope)
        } else {
            f.write_str(scope)
        }
    }
}

/// Size hints returned by the buffer size query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferSizes {
    /// Number of path records
    pub paths: u32,
    /// Number of mode records
    pub modes: u32,
}

/// Source or target end of a path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PathEndpoint {
    /// Adapter LUID, packed
    pub adapter_id: u64,
    /// Source or target id on the adapter
    pub id: u32,
}

/// Path record: one source (desktop surface) driving one target (connector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPath {
    /// Source end
    pub source: PathEndpoint,
    /// Target end
    pub target: PathEndpoint,
    /// Path is active
    pub active: bool,
}

/// Payload of a mode record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawModeKind {
    /// Source mode: desktop position and size
    Source {
        /// Desktop x
        x: i32,
        /// Desktop y
        y: i32,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Target (signal) mode
    Target,
    /// Desktop image mode (virtual-mode-aware queries)
    DesktopImage,
}

/// Mode record, tagged with the endpoint it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMode {
    /// Owning endpoint
    pub endpoint: PathEndpoint,
    /// Payload
    pub kind: RawModeKind,
}

/// Result of a successful data query
#[derive(Debug, Clone, Default)]
pub struct RawTopology {
    /// Path records, possibly with repeated targets
    pub paths: Vec<RawPath>,
    /// Mode records
    pub modes: Vec<RawMode>,
}

/// Target-side device information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDeviceName {
    /// Monitor friendly name
    pub friendly_name: String,
    /// Monitor device interface path
    pub device_path: String,
    /// Packed EDID manufacturer id, EDID byte order
    pub edid_manufacturer_id: Option<u16>,
    /// EDID product code
    pub edid_product_code: Option<u16>,
}

impl TargetDeviceName {
    /// `edidIdsValid` bit of the native target-name flags
    pub const EDID_IDS_VALID: u32 = 0x4;

    /// Build from a native target-name reply
    ///
    /// The manufacturer id arrives little-endian and is stored in EDID
    /// (big-endian) order. Both EDID fields are dropped unless `flags` has
    /// [`Self::EDID_IDS_VALID`] set; the friendly-name-from-EDID bit says
    /// nothing about them.
    pub fn from_native(
        friendly_name: String,
        device_path: String,
        flags: u32,
        manufacturer_id: u16,
        product_code: u16,
    ) -> Self {
        let edid_valid = flags & Self::EDID_IDS_VALID != 0;
        Self {
            friendly_name,
            device_path,
            edid_manufacturer_id: edid_valid.then(|| manufacturer_id.swap_bytes()),
            edid_product_code: edid_valid.then_some(product_code),
        }
    }
}

/// Access to the OS display-configuration subsystem
pub trait DisplayConfigBackend: Send + Sync {
    /// Query record counts for a strategy
    fn buffer_sizes(&self, strategy: QueryStrategy) -> Result<BufferSizes, NativeError>;

    /// Query path and mode records for a strategy
    fn query(&self, strategy: QueryStrategy, sizes: BufferSizes)
        -> Result<RawTopology, NativeError>;

    /// GDI logical device name of a source
    fn source_name(&self, source: PathEndpoint) -> Result<String, NativeError>;

    /// Friendly name, device path and EDID ids of a target
    fn target_name(&self, target: PathEndpoint) -> Result<TargetDeviceName, NativeError>;
}

/// Device reported by the legacy display-device enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDevice {
    /// Legacy device name
    pub name: String,
    /// Last-known bounds from the current settings
    pub bounds: PixelRect,
}

/// Current legacy display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyMode {
    /// Raster width
    pub width: u32,
    /// Raster height
    pub height: u32,
    /// Raw orientation value (0..=3)
    pub orientation: u32,
}

/// Fields written back by a rotation; nothing else is marked dirty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeUpdate {
    /// New orientation
    pub orientation: Orientation,
    /// New raster width
    pub width: u32,
    /// New raster height
    pub height: u32,
}

/// Result code of a legacy mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyCode(pub i32);

impl ApplyCode {
    /// `DISP_CHANGE_SUCCESSFUL`
    pub const SUCCESSFUL: ApplyCode = ApplyCode(0);
    /// `DISP_CHANGE_RESTART`
    pub const RESTART: ApplyCode = ApplyCode(1);
    /// `DISP_CHANGE_FAILED`
    pub const FAILED: ApplyCode = ApplyCode(-1);
    /// `DISP_CHANGE_BADMODE`
    pub const BAD_MODE: ApplyCode = ApplyCode(-2);
    /// `DISP_CHANGE_BADPARAM`
    pub const BAD_PARAM: ApplyCode = ApplyCode(-5);
}

/// Access to the legacy display-settings API
pub trait LegacyDisplayBackend: Send + Sync {
    /// Attached display devices with their current bounds
    fn devices(&self) -> Vec<LegacyDevice>;

    /// Current mode of a device
    fn current_mode(&self, device: &str) -> Result<LegacyMode, NativeError>;

    /// Apply orientation and raster size
    ///
    /// `persist` requests a registry-durable change.
    fn apply_mode(&self, device: &str, update: &ModeUpdate, persist: bool) -> ApplyCode;
}
