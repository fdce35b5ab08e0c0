//! Placement Geometry
//!
//! Turns [`PlacementOptions`] (logical units) and an output's pixel bounds
//! into the rectangle handed to [`WindowHost::move_window`].
//!
//! [`WindowHost::move_window`]: crate::placement::WindowHost::move_window

use serde::{Deserialize, Serialize};

use crate::display::PixelRect;
use crate::placement::host::{MoveFlag, MoveFlags};

/// How a window is laid out on its output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Maximize on the output; size and margin are ignored
    pub maximize: bool,

    /// Requested logical width (absent = fill the available width)
    pub width: Option<f64>,

    /// Requested logical height (absent = fill the available height)
    pub height: Option<f64>,

    /// Logical margin kept free on every side of the output
    pub margin: f64,
}

impl PlacementOptions {
    /// Maximized placement
    pub fn maximized() -> Self {
        Self {
            maximize: true,
            ..Self::default()
        }
    }

    /// Centered placement of the given logical size
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Builder-style margin
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }
}

fn to_pixels(logical: f64, scale: f64) -> i32 {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let px = (logical * scale).round();
    if px.is_finite() {
        px.clamp(0.0, i32::MAX as f64) as i32
    } else {
        0
    }
}

/// Target rectangle and extra move flags for a window on `bounds`
///
/// `scale` is the window's logical-to-pixel factor.
pub fn placement_rect(bounds: &PixelRect, options: &PlacementOptions, scale: f64) -> (PixelRect, MoveFlags) {
    if options.maximize {
        return (*bounds, MoveFlags::from(MoveFlag::Maximize));
    }

    let margin = to_pixels(options.margin, scale);
    let area = bounds.deflate(margin, margin);

    let width = options
        .width
        .map_or(area.width(), |w| to_pixels(w, scale).min(area.width()));
    let height = options
        .height
        .map_or(area.height(), |h| to_pixels(h, scale).min(area.height()));

    let left = area.left + (area.width() - width) / 2;
    let top = area.top + (area.height() - height) / 2;

    (PixelRect::from_origin_size(left, top, width, height), MoveFlags::empty())
}
