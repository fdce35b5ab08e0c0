//! Output Enumerator
//!
//! Queries the display-configuration backend and reduces the raw path/mode
//! records into one [`OutputInfo`] per active output.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::display::backend::{
    DisplayConfigBackend, NativeError, QueryStrategy, RawMode, RawModeKind, RawPath, RawTopology,
};
use crate::display::model::{decode_manufacturer_id, OutputIdentity, OutputInfo, PixelRect};
use crate::display::{DisplayError, QueryStage, Result};

/// Enumerates active outputs through a [`DisplayConfigBackend`]
pub struct OutputEnumerator {
    backend: Arc<dyn DisplayConfigBackend>,
}

impl OutputEnumerator {
    /// Create a new enumerator
    pub fn new(backend: Arc<dyn DisplayConfigBackend>) -> Self {
        Self { backend }
    }

    /// Enumerate active outputs
    ///
    /// The result is deduplicated by identity and ordered primary first, then
    /// by `left`, then by `top`.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::QueryFailure`] when a query fails for a reason
    /// other than an unsupported flag combination, or when every strategy was
    /// rejected.
    pub fn enumerate(&self) -> Result<Vec<OutputInfo>> {
        let (strategy, topology) = self.query_topology()?;

        debug!(
            "Display query accepted with {}: {} paths, {} modes",
            strategy,
            topology.paths.len(),
            topology.modes.len()
        );

        let outputs = topology
            .paths
            .iter()
            .filter(|path| {
                if !path.active {
                    debug!("Skipping inactive path to target {}", path.target.id);
                }
                path.active
            })
            .map(|path| self.build_output(path, &topology.modes))
            .collect();

        Ok(reduce_outputs(outputs))
    }

    fn query_topology(&self) -> Result<(QueryStrategy, RawTopology)> {
        let mut last_rejection = (QueryStage::BufferSizes, NativeError::INVALID_PARAMETER);

        for strategy in QueryStrategy::PRIORITY {
            let sizes = match self.backend.buffer_sizes(strategy) {
                Ok(sizes) => sizes,
                Err(e) if e.is_invalid_parameter() => {
                    debug!("Buffer size query rejected for {}, trying next", strategy);
                    last_rejection = (QueryStage::BufferSizes, e);
                    continue;
                }
                Err(e) => {
                    return Err(DisplayError::QueryFailure {
                        stage: QueryStage::BufferSizes,
                        code: e.0,
                    })
                }
            };

            match self.backend.query(strategy, sizes) {
                Ok(topology) => return Ok((strategy, topology)),
                Err(e) if e.is_invalid_parameter() => {
                    debug!("Display query rejected for {}, trying next", strategy);
                    last_rejection = (QueryStage::Query, e);
                }
                Err(e) => {
                    return Err(DisplayError::QueryFailure {
                        stage: QueryStage::Query,
                        code: e.0,
                    })
                }
            }
        }

        warn!("Every display query strategy was rejected");
        Err(DisplayError::QueryFailure {
            stage: last_rejection.0,
            code: last_rejection.1 .0,
        })
    }

    fn build_output(&self, path: &RawPath, modes: &[RawMode]) -> OutputInfo {
        // Matched by endpoint, not by the path's mode index
        let source_bounds = modes.iter().find_map(|mode| match mode.kind {
            RawModeKind::Source {
                x,
                y,
                width,
                height,
            } if mode.endpoint == path.source => Some(PixelRect::from_origin_size(
                x,
                y,
                width as i32,
                height as i32,
            )),
            _ => None,
        });

        if source_bounds.is_none() {
            debug!(
                "No source mode for source {} on adapter {:016X}",
                path.source.id, path.source.adapter_id
            );
        }

        let gdi_name = self.backend.source_name(path.source).unwrap_or_else(|e| {
            debug!("Source name query failed for source {}: {}", path.source.id, e);
            String::new()
        });

        let target = self.backend.target_name(path.target).unwrap_or_else(|e| {
            debug!("Target name query failed for target {}: {}", path.target.id, e);
            Default::default()
        });

        let bounds = source_bounds.unwrap_or_default();
        let is_primary = source_bounds.is_some() && bounds.left == 0 && bounds.top == 0;

        OutputInfo {
            identity: OutputIdentity::new(path.target.adapter_id, path.target.id),
            gdi_name,
            device_path: target.device_path,
            friendly_name: target.friendly_name,
            edid_manufacturer: target.edid_manufacturer_id.and_then(decode_manufacturer_id),
            edid_product_code: target.edid_product_code,
            bounds,
            is_primary,
        }
    }
}

/// Sort key of the enumeration order: primary first, then `left`, then `top`
pub fn ordering_key(output: &OutputInfo) -> (bool, i32, i32) {
    (!output.is_primary, output.bounds.left, output.bounds.top)
}

/// Deduplicate by identity (first occurrence wins) and apply the enumeration order
pub fn reduce_outputs(outputs: Vec<OutputInfo>) -> Vec<OutputInfo> {
    let mut seen = HashSet::new();
    let mut reduced: Vec<OutputInfo> = outputs
        .into_iter()
        .filter(|output| seen.insert(output.identity))
        .collect();

    reduced.sort_by_key(ordering_key);
    reduced
}
