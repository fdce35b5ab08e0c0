//! Display Service
//!
//! Constructible entry point bundling enumeration, resolution and rotation
//! over injected backends. Holds no topology state of its own.

use std::sync::Arc;
use tracing::{debug, info};

use crate::display::backend::{DisplayConfigBackend, LegacyDisplayBackend};
use crate::display::enumerator::OutputEnumerator;
use crate::display::model::{Orientation, OutputIdentity, OutputInfo};
use crate::display::resolver::{find_by_id_in, find_by_name_in, resolve_in};
use crate::display::rotation::{RotationController, RotationOutcome};
use crate::display::Result;

/// Display enumeration, resolution and rotation
pub struct DisplayService {
    enumerator: OutputEnumerator,
    rotation: RotationController,
}

impl DisplayService {
    /// Create a service over the given backends
    pub fn new(
        config_backend: Arc<dyn DisplayConfigBackend>,
        legacy_backend: Arc<dyn LegacyDisplayBackend>,
    ) -> Self {
        Self {
            enumerator: OutputEnumerator::new(config_backend),
            rotation: RotationController::new(legacy_backend),
        }
    }

    /// Whether rotations are written to the registry (default: true)
    pub fn with_persistent_rotation(mut self, persist: bool) -> Self {
        self.rotation = self.rotation.with_persistence(persist);
        self
    }

    /// Fresh enumeration of active outputs
    pub fn enumerate(&self) -> Result<Vec<OutputInfo>> {
        self.enumerator.enumerate()
    }

    /// Exact identity lookup; absence is not an error
    pub fn find_by_id(&self, identity: OutputIdentity) -> Result<Option<OutputInfo>> {
        let outputs = self.enumerate()?;
        Ok(find_by_id_in(&outputs, identity).cloned())
    }

    /// Case-insensitive friendly-name substring lookup
    pub fn find_by_name(&self, needle: &str) -> Result<Option<OutputInfo>> {
        let outputs = self.enumerate()?;
        Ok(find_by_name_in(&outputs, needle).cloned())
    }

    /// Identity, then name hint, then the first output in enumeration order
    ///
    /// # Errors
    ///
    /// Fails with `NoOutputsAvailable` only when enumeration is empty.
    pub fn resolve(&self, identity: OutputIdentity, name_hint: Option<&str>) -> Result<OutputInfo> {
        let outputs = self.enumerate()?;
        let (output, by) = resolve_in(&outputs, identity, name_hint)?;
        debug!("Resolved {} to {} by {}", identity, output.identity, by);
        Ok(output.clone())
    }

    /// Rotate an output
    pub fn rotate(&self, output: &OutputInfo, target: Orientation) -> Result<RotationOutcome> {
        info!("Rotating output {} ({}) to {}", output.identity, output.label(), target);
        self.rotation.rotate(output, target)
    }

    /// Current orientation of an output
    pub fn current_orientation(&self, output: &OutputInfo) -> Result<Orientation> {
        self.rotation.current_orientation(output)
    }
}
