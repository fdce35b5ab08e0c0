//! Display Output Support Module
//!
//! Enumerates the active display outputs of the machine, resolves a requested
//! output from possibly stale identity data and rotates outputs.
//!
//! # Overview
//!
//! ```text
//! DisplayService
//!   ├─> OutputEnumerator   (display-configuration backend, multi-strategy query)
//!   ├─> resolver           (exact id → friendly-name substring → primary/leftmost)
//!   └─> RotationController (legacy display-settings backend)
//! ```
//!
//! # Enumeration
//!
//! The display-configuration query is attempted with several flag
//! combinations in priority order. A combination the platform rejects as an
//! invalid parameter is skipped; any other failure is surfaced immediately.
//! Every enumeration is a fresh query: outputs are never cached because a
//! cached record can go stale the instant the topology changes.
//!
//! The reduced list is deduplicated by [`OutputIdentity`] (clone groups
//! report the same target more than once) and ordered primary first, then by
//! `left`, then by `top`. Every "fall back to the first output" policy in this
//! crate depends on that order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use display_anchor::display::{DisplayService, Orientation, OutputIdentity};
//! use display_anchor::platform::fixture::FixtureBackend;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(FixtureBackend::load("topology.toml")?);
//! let service = DisplayService::new(backend.clone(), backend);
//!
//! for output in service.enumerate()? {
//!     println!("{}", output);
//! }
//!
//! let wanted = OutputIdentity::new(0x0000_0000_0001_2A4F, 4);
//! let output = service.resolve(wanted, Some("Studio"))?;
//! service.rotate(&output, Orientation::Portrait)?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod enumerator;
mod model;
mod resolver;
mod rotation;
mod service;

pub use backend::{
    ApplyCode, BufferSizes, DisplayConfigBackend, LegacyDevice, LegacyDisplayBackend, LegacyMode,
    ModeUpdate, NativeError, PathEndpoint, QueryScope, QueryStrategy, RawMode, RawModeKind,
    RawPath, RawTopology, TargetDeviceName,
};
pub use enumerator::{ordering_key, reduce_outputs, OutputEnumerator};
pub use model::{
    decode_manufacturer_id, encode_manufacturer_id, Orientation, OutputIdentity, OutputInfo,
    PixelRect,
};
pub use resolver::{find_by_id_in, find_by_name_in, resolve_in, ResolvedBy};
pub use rotation::{RotationController, RotationOutcome};
pub use service::DisplayService;

use std::fmt;
use thiserror::Error;

/// Display result type
pub type Result<T> = std::result::Result<T, DisplayError>;

/// Stage of the display-configuration query that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Buffer size query
    BufferSizes,
    /// Path/mode data query
    Query,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStage::BufferSizes => write!(f, "buffer size query"),
            QueryStage::Query => write!(f, "display configuration query"),
        }
    }
}

/// Display error types
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Every query strategy was exhausted, or one failed for a real reason
    #[error("Display enumeration failed during {stage} (native code {code})")]
    QueryFailure {
        /// Stage that failed
        stage: QueryStage,
        /// Native result code
        code: i32,
    },

    /// Enumeration succeeded but reported no outputs
    #[error("No active display outputs available")]
    NoOutputsAvailable,

    /// No legacy device name could be found for the output
    #[error("No legacy display device name could be resolved for output {0}")]
    DeviceNameUnresolved(OutputIdentity),

    /// Current display mode could not be read
    #[error("Failed to read display mode of {device} (native code {code})")]
    ModeQueryFailure {
        /// Legacy device name
        device: String,
        /// Native result code
        code: i32,
    },

    /// New display mode was rejected
    #[error("Failed to apply display mode to {device} (native code {code})")]
    ApplyFailure {
        /// Legacy device name
        device: String,
        /// Native result code
        code: i32,
    },

    /// Malformed output key
    #[error("Invalid output key: {0}")]
    InvalidIdentityKey(String),

    /// Rotation not a multiple of 90 degrees
    #[error("Invalid degree of rotation, multiples of 90 only, got {0}")]
    InvalidDegrees(isize),
}
