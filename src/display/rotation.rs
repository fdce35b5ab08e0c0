//! Rotation Controller
//!
//! Reads the current legacy display mode of an output and writes back a new
//! orientation. Rotating between landscape and portrait exchanges the raster
//! width and height; rotating by 180 degrees does not.

use std::sync::Arc;
use tracing::{debug, info};

use crate::display::backend::{ApplyCode, LegacyDisplayBackend, ModeUpdate};
use crate::display::model::{Orientation, OutputInfo};
use crate::display::{DisplayError, Result};

/// Result of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Mode applied immediately
    Applied,
    /// Mode stored; takes effect after a restart
    RestartRequired,
}

/// Applies orientation changes through a [`LegacyDisplayBackend`]
pub struct RotationController {
    backend: Arc<dyn LegacyDisplayBackend>,
    persist: bool,
}

impl RotationController {
    /// Create a controller that requests persistent (registry-durable) updates
    pub fn new(backend: Arc<dyn LegacyDisplayBackend>) -> Self {
        Self {
            backend,
            persist: true,
        }
    }

    /// Whether updates are written to the registry
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Rotate `output` to `target`
    ///
    /// Requesting the current orientation is legal and still issues the
    /// update.
    ///
    /// # Errors
    ///
    /// - [`DisplayError::DeviceNameUnresolved`] if no legacy device matches
    /// - [`DisplayError::ModeQueryFailure`] if the current mode is unreadable
    /// - [`DisplayError::ApplyFailure`] if the new mode is rejected
    pub fn rotate(&self, output: &OutputInfo, target: Orientation) -> Result<RotationOutcome> {
        let device = self.device_name(output)?;

        let mode = self
            .backend
            .current_mode(&device)
            .map_err(|e| DisplayError::ModeQueryFailure {
                device: device.clone(),
                code: e.0,
            })?;

        let current = Orientation::from_legacy(mode.orientation);
        let (width, height) = if current.swaps_dimensions_to(target) {
            (mode.height, mode.width)
        } else {
            (mode.width, mode.height)
        };

        debug!(
            "Rotating {} from {} to {}: {}x{} -> {}x{}",
            device, current, target, mode.width, mode.height, width, height
        );

        let update = ModeUpdate {
            orientation: target,
            width,
            height,
        };

        match self.backend.apply_mode(&device, &update, self.persist) {
            ApplyCode::SUCCESSFUL => {
                info!("Rotated {} to {}", device, target);
                Ok(RotationOutcome::Applied)
            }
            ApplyCode::RESTART => {
                info!("Rotated {} to {} (restart required)", device, target);
                Ok(RotationOutcome::RestartRequired)
            }
            ApplyCode(code) => Err(DisplayError::ApplyFailure { device, code }),
        }
    }

    /// Current orientation of `output` as reported by the legacy mode
    pub fn current_orientation(&self, output: &OutputInfo) -> Result<Orientation> {
        let device = self.device_name(output)?;
        let mode = self
            .backend
            .current_mode(&device)
            .map_err(|e| DisplayError::ModeQueryFailure {
                device,
                code: e.0,
            })?;
        Ok(Orientation::from_legacy(mode.orientation))
    }

    /// Legacy device name: the GDI name if known, otherwise the legacy device
    /// whose bounds center is nearest the output's
    fn device_name(&self, output: &OutputInfo) -> Result<String> {
        if !output.gdi_name.is_empty() {
            return Ok(output.gdi_name.clone());
        }

        let nearest = self
            .backend
            .devices()
            .into_iter()
            .filter(|device| !device.name.is_empty())
            .min_by(|a, b| {
                a.bounds
                    .center_distance(&output.bounds)
                    .total_cmp(&b.bounds.center_distance(&output.bounds))
            });

        match nearest {
            Some(device) => {
                debug!(
                    "No GDI name for {}, using nearest legacy device {}",
                    output.identity, device.name
                );
                Ok(device.name)
            }
            None => Err(DisplayError::DeviceNameUnresolved(output.identity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::backend::{LegacyDevice, LegacyMode, NativeError};
    use crate::display::model::{OutputIdentity, PixelRect};
    use parking_lot::Mutex;

    struct RecordingBackend {
        devices: Vec<LegacyDevice>,
        mode: Option<LegacyMode>,
        code: ApplyCode,
        applied: Mutex<Vec<(String, ModeUpdate, bool)>>,
    }

    impl RecordingBackend {
        fn new(orientation: u32) -> Self {
            Self {
                devices: vec![],
                mode: Some(LegacyMode {
                    width: 1920,
                    height: 1080,
                    orientation,
                }),
                code: ApplyCode::SUCCESSFUL,
                applied: Mutex::new(vec![]),
            }
        }
    }

    impl LegacyDisplayBackend for RecordingBackend {
        fn devices(&self) -> Vec<LegacyDevice> {
            self.devices.clone()
        }

        fn current_mode(&self, _device: &str) -> std::result::Result<LegacyMode, NativeError> {
            self.mode.ok_or(NativeError::GEN_FAILURE)
        }

        fn apply_mode(&self, device: &str, update: &ModeUpdate, persist: bool) -> ApplyCode {
            self.applied
                .lock()
                .push((device.to_string(), *update, persist));
            self.code
        }
    }

    fn output(gdi: &str, left: i32) -> OutputInfo {
        OutputInfo {
            identity: OutputIdentity::new(1, 2),
            gdi_name: gdi.to_string(),
            device_path: String::new(),
            friendly_name: String::new(),
            edid_manufacturer: None,
            edid_product_code: None,
            bounds: PixelRect::from_origin_size(left, 0, 1920, 1080),
            is_primary: left == 0,
        }
    }

    fn rotate(backend: &Arc<RecordingBackend>, out: &OutputInfo, to: Orientation) -> Result<RotationOutcome> {
        RotationController::new(backend.clone()).rotate(out, to)
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let backend = Arc::new(RecordingBackend::new(0));
        rotate(&backend, &output(r"\\.\DISPLAY1", 0), Orientation::Portrait).unwrap();

        let applied = backend.applied.lock();
        let (device, update, persist) = &applied[0];
        assert_eq!(device, r"\\.\DISPLAY1");
        assert_eq!((update.width, update.height), (1080, 1920));
        assert_eq!(update.orientation, Orientation::Portrait);
        assert!(*persist);
    }

    #[test]
    fn test_half_turn_and_noop_keep_dimensions() {
        for target in [Orientation::LandscapeFlipped, Orientation::Landscape] {
            let backend = Arc::new(RecordingBackend::new(0));
            rotate(&backend, &output(r"\\.\DISPLAY1", 0), target).unwrap();

            let applied = backend.applied.lock();
            assert_eq!((applied[0].1.width, applied[0].1.height), (1920, 1080));
        }
    }

    #[test]
    fn test_restart_required_is_success() {
        let mut backend = RecordingBackend::new(1);
        backend.code = ApplyCode::RESTART;
        let outcome = rotate(&Arc::new(backend), &output("X", 0), Orientation::LandscapeFlipped);
        assert_eq!(outcome.unwrap(), RotationOutcome::RestartRequired);
    }

    #[test]
    fn test_apply_failure_carries_code() {
        let mut backend = RecordingBackend::new(0);
        backend.code = ApplyCode::BAD_MODE;
        match rotate(&Arc::new(backend), &output("X", 0), Orientation::Portrait) {
            Err(DisplayError::ApplyFailure { device, code }) => {
                assert_eq!(device, "X");
                assert_eq!(code, -2);
            }
            other => panic!("expected ApplyFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_mode() {
        let mut backend = RecordingBackend::new(0);
        backend.mode = None;
        assert!(matches!(
            rotate(&Arc::new(backend), &output("X", 0), Orientation::Portrait),
            Err(DisplayError::ModeQueryFailure { .. })
        ));
    }

    #[test]
    fn test_nearest_legacy_device_fallback() {
        let mut backend = RecordingBackend::new(0);
        backend.devices = vec![
            LegacyDevice {
                name: r"\\.\DISPLAY1".to_string(),
                bounds: PixelRect::from_origin_size(0, 0, 1920, 1080),
            },
            LegacyDevice {
                name: r"\\.\DISPLAY2".to_string(),
                bounds: PixelRect::from_origin_size(1920, 0, 1920, 1080),
            },
        ];
        let backend = Arc::new(backend);

        rotate(&backend, &output("", 1900), Orientation::Portrait).unwrap();
        assert_eq!(backend.applied.lock()[0].0, r"\\.\DISPLAY2");
    }

    #[test]
    fn test_no_device_name() {
        let backend = Arc::new(RecordingBackend::new(0));
        assert!(matches!(
            rotate(&backend, &output("", 0), Orientation::Portrait),
            Err(DisplayError::DeviceNameUnresolved(_))
        ));
    }
}
