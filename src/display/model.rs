//! Output Identity Model
//!
//! Value types shared by enumeration, resolution, rotation and placement.
//! Nothing in here talks to the OS.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::display::{DisplayError, Result};

/// Stable name of one physical connector on one graphics adapter
///
/// Survives resolution and DPI changes for the lifetime of the driver
/// session. A driver reinstall may hand out new adapter ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputIdentity {
    /// Adapter LUID packed as `(high << 32) | low`
    pub adapter_id: u64,

    /// Target (connector) id on that adapter
    pub output_id: u32,
}

impl OutputIdentity {
    /// Create a new identity
    pub const fn new(adapter_id: u64, output_id: u32) -> Self {
        Self {
            adapter_id,
            output_id,
        }
    }

    /// Canonical key used by the friendly-name store
    ///
    /// Format: 16 uppercase hex digits of the adapter id, a dash, then the
    /// output id in decimal.
    pub fn key(&self) -> String {
        format!("{:016X}-{}", self.adapter_id, self.output_id)
    }
}

impl fmt::Display for OutputIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for OutputIdentity {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DisplayError::InvalidIdentityKey(s.to_string());

        let (adapter, output) = s.trim().split_once('-').ok_or_else(invalid)?;
        if adapter.len() != 16 {
            return Err(invalid());
        }

        let adapter_id = u64::from_str_radix(adapter, 16).map_err(|_| invalid())?;
        let output_id = output.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self::new(adapter_id, output_id))
    }
}

/// Rectangle in virtual-desktop pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge (inclusive)
    pub left: i32,
    /// Top edge (inclusive)
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl PixelRect {
    /// Create from edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create from origin and size
    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Width in pixels
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Center point, used for nearest-device matching
    pub fn center(&self) -> (f64, f64) {
        (
            (self.left as f64 + self.right as f64) / 2.0,
            (self.top as f64 + self.bottom as f64) / 2.0,
        )
    }

    /// Euclidean distance between the centers of two rectangles
    pub fn center_distance(&self, other: &PixelRect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Shrink by `dx`/`dy` on each side, never past the center
    pub fn deflate(&self, dx: i32, dy: i32) -> PixelRect {
        let dx = dx.clamp(0, self.width().max(0) / 2);
        let dy = dy.clamp(0, self.height().max(0) / 2);
        PixelRect::new(
            self.left + dx,
            self.top + dy,
            self.right - dx,
            self.bottom - dy,
        )
    }
}

/// Display orientation
///
/// Discriminants match the legacy display-mode encoding (0..=3). Adjacent
/// values alternate between landscape and portrait, so the parity of the sum
/// of two values tells whether the raster dimensions must be exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// 0 degrees
    Landscape = 0,
    /// 90 degrees clockwise
    Portrait = 1,
    /// 180 degrees
    LandscapeFlipped = 2,
    /// 270 degrees clockwise
    PortraitFlipped = 3,
}

impl Orientation {
    /// Value used by the legacy display-mode API
    pub const fn legacy_value(self) -> u32 {
        self as u32
    }

    /// Convert a legacy display-mode value; only the low two bits matter
    pub const fn from_legacy(value: u32) -> Self {
        match value % 4 {
            0 => Self::Landscape,
            1 => Self::Portrait,
            2 => Self::LandscapeFlipped,
            _ => Self::PortraitFlipped,
        }
    }

    /// Clockwise degrees
    pub const fn degrees(self) -> isize {
        self as isize * 90
    }

    /// Parse clockwise degrees; negative values are counter-clockwise
    pub fn from_degrees(cw_degrees: isize) -> Result<Self> {
        match cw_degrees % 360 {
            0 => Ok(Self::Landscape),
            90 | -270 => Ok(Self::Portrait),
            180 | -180 => Ok(Self::LandscapeFlipped),
            270 | -90 => Ok(Self::PortraitFlipped),
            other => Err(DisplayError::InvalidDegrees(other)),
        }
    }

    /// Orientation after an additional clockwise rotation
    pub fn rotated_by(self, cw_degrees: isize) -> Result<Self> {
        if cw_degrees % 90 != 0 {
            return Err(DisplayError::InvalidDegrees(cw_degrees));
        }
        Self::from_degrees(self.degrees() + cw_degrees % 360)
    }

    /// True when moving from `self` to `target` exchanges width and height
    pub const fn swaps_dimensions_to(self, target: Orientation) -> bool {
        (self.legacy_value() + target.legacy_value()) % 2 == 1
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Decode a 5-bit packed EDID manufacturer id into its three letters
///
/// `packed` is in EDID byte order (big-endian): bits 14..10, 9..5 and 4..0
/// each hold one letter as `'@' + code`.
pub fn decode_manufacturer_id(packed: u16) -> Option<String> {
    let codes = [(packed >> 10) & 0x1F, (packed >> 5) & 0x1F, packed & 0x1F];

    if codes.iter().any(|&c| c == 0 || c > 26) {
        return None;
    }

    Some(codes.iter().map(|&c| char::from(b'@' + c as u8)).collect())
}

/// Inverse of [`decode_manufacturer_id`]
pub fn encode_manufacturer_id(code: &str) -> Option<u16> {
    let bytes = code.as_bytes();
    if bytes.len() != 3 {
        return None;
    }

    let mut packed = 0u16;
    for &b in bytes {
        let upper = b.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        packed = (packed << 5) | u16::from(upper - b'@');
    }
    Some(packed)
}

/// One active display output as reported by the latest enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInfo {
    /// Stable identity
    pub identity: OutputIdentity,

    /// GDI logical device name (e.g. `\\.\DISPLAY1`); empty if unavailable
    pub gdi_name: String,

    /// Device interface path, diagnostics only
    pub device_path: String,

    /// Manufacturer-provided monitor name; may be empty
    pub friendly_name: String,

    /// Three-letter EDID manufacturer code
    pub edid_manufacturer: Option<String>,

    /// EDID product code
    pub edid_product_code: Option<u16>,

    /// Bounds in virtual-desktop pixels
    pub bounds: PixelRect,

    /// Origin-at-(0,0) heuristic
    pub is_primary: bool,
}

impl OutputInfo {
    /// Best human-readable label: friendly name, then GDI name, then key
    pub fn label(&self) -> String {
        if !self.friendly_name.is_empty() {
            self.friendly_name.clone()
        } else if !self.gdi_name.is_empty() {
            self.gdi_name.clone()
        } else {
            self.identity.key()
        }
    }
}

impl fmt::Display for OutputInfo {
    /// Stable single-line diagnostic format consumed by operator tooling
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let product = self
            .edid_product_code
            .map(|p| format!("{:04X}", p))
            .unwrap_or_else(|| "-".to_string());

        write!(
            f,
            "Name={} Gdi={} Path={} Luid={:016X} TargetId={} EDID={}-{} Bounds=L={},T={},W={},H={} Primary={}",
            self.friendly_name,
            self.gdi_name,
            self.device_path,
            self.identity.adapter_id,
            self.identity.output_id,
            self.edid_manufacturer.as_deref().unwrap_or("???"),
            product,
            self.bounds.left,
            self.bounds.top,
            self.bounds.width(),
            self.bounds.height(),
            self.is_primary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_format() {
        let id = OutputIdentity::new(0x1A2B3C4D5E6F7081, 3);
        assert_eq!(id.key(), "1A2B3C4D5E6F7081-3");

        let small = OutputIdentity::new(0xBEEF, 42);
        assert_eq!(small.key(), "000000000000BEEF-42");
    }

    #[test]
    fn test_identity_key_parse() {
        let id: OutputIdentity = "1A2B3C4D5E6F7081-3".parse().unwrap();
        assert_eq!(id, OutputIdentity::new(0x1A2B3C4D5E6F7081, 3));

        assert!("1A2B-3".parse::<OutputIdentity>().is_err());
        assert!("1A2B3C4D5E6F7081".parse::<OutputIdentity>().is_err());
        assert!("1A2B3C4D5E6F708G-3".parse::<OutputIdentity>().is_err());
        assert!("1A2B3C4D5E6F7081-x".parse::<OutputIdentity>().is_err());
    }

    #[test]
    fn test_rect_geometry() {
        let r = PixelRect::from_origin_size(-1920, 0, 1920, 1080);
        assert_eq!(r.width(), 1920);
        assert_eq!(r.height(), 1080);
        assert_eq!(r.center(), (-960.0, 540.0));

        let other = PixelRect::from_origin_size(0, 0, 1920, 1080);
        assert_eq!(r.center_distance(&other), 1920.0);
    }

    #[test]
    fn test_rect_deflate_clamps_at_center() {
        let r = PixelRect::new(0, 0, 100, 50);
        assert_eq!(r.deflate(10, 5), PixelRect::new(10, 5, 90, 45));
        assert_eq!(r.deflate(500, 500), PixelRect::new(50, 25, 50, 25));
    }

    #[test]
    fn test_orientation_degrees() {
        assert_eq!(Orientation::from_degrees(0).unwrap(), Orientation::Landscape);
        assert_eq!(Orientation::from_degrees(90).unwrap(), Orientation::Portrait);
        assert_eq!(Orientation::from_degrees(-90).unwrap(), Orientation::PortraitFlipped);
        assert_eq!(Orientation::from_degrees(540).unwrap(), Orientation::LandscapeFlipped);
        assert!(Orientation::from_degrees(45).is_err());

        assert_eq!(
            Orientation::PortraitFlipped.rotated_by(90).unwrap(),
            Orientation::Landscape
        );
    }

    #[test]
    fn test_rotated_by_extreme_deltas() {
        assert!(matches!(
            Orientation::Portrait.rotated_by(isize::MAX),
            Err(DisplayError::InvalidDegrees(isize::MAX))
        ));
        let big = isize::MAX - isize::MAX % 360;
        assert_eq!(Orientation::PortraitFlipped.rotated_by(big).unwrap(), Orientation::PortraitFlipped);
        assert_eq!(
            Orientation::Landscape.rotated_by(isize::MIN + 8).unwrap(),
            Orientation::Landscape
        );
        assert_eq!(Orientation::Portrait.rotated_by(-90 - 3600).unwrap(), Orientation::Landscape);
    }

    #[test]
    fn test_orientation_swap_parity() {
        use Orientation::*;

        assert!(Landscape.swaps_dimensions_to(Portrait));
        assert!(Portrait.swaps_dimensions_to(LandscapeFlipped));
        assert!(!Landscape.swaps_dimensions_to(LandscapeFlipped));
        assert!(!Landscape.swaps_dimensions_to(Landscape));
        assert!(!Portrait.swaps_dimensions_to(PortraitFlipped));
    }

    #[test]
    fn test_manufacturer_id_codec() {
        // "DEL" as stored in EDID bytes 8..9 (0x10, 0xAC)
        assert_eq!(decode_manufacturer_id(0x10AC).as_deref(), Some("DEL"));
        assert_eq!(encode_manufacturer_id("DEL"), Some(0x10AC));
        assert_eq!(encode_manufacturer_id("gsm"), encode_manufacturer_id("GSM"));

        assert_eq!(decode_manufacturer_id(0), None);
        assert_eq!(encode_manufacturer_id("DE"), None);
        assert_eq!(encode_manufacturer_id("D3L"), None);
    }

    #[test]
    fn test_diagnostic_line() {
        let output = OutputInfo {
            identity: OutputIdentity::new(0x1A2B, 7),
            gdi_name: r"\\.\DISPLAY2".to_string(),
            device_path: r"\\?\DISPLAY#DEL40F7#5".to_string(),
            friendly_name: "DELL U2720Q".to_string(),
            edid_manufacturer: Some("DEL".to_string()),
            edid_product_code: Some(0x40F7),
            bounds: PixelRect::from_origin_size(1920, -120, 2560, 1440),
            is_primary: false,
        };

        assert_eq!(
            output.to_string(),
            r"Name=DELL U2720Q Gdi=\\.\DISPLAY2 Path=\\?\DISPLAY#DEL40F7#5 Luid=0000000000001A2B TargetId=7 EDID=DEL-40F7 Bounds=L=1920,T=-120,W=2560,H=1440 Primary=false"
        );
    }

    #[test]
    fn test_diagnostic_line_without_edid() {
        let output = OutputInfo {
            identity: OutputIdentity::new(1, 0),
            gdi_name: String::new(),
            device_path: String::new(),
            friendly_name: String::new(),
            edid_manufacturer: None,
            edid_product_code: None,
            bounds: PixelRect::from_origin_size(0, 0, 800, 600),
            is_primary: true,
        };

        assert!(output.to_string().contains("EDID=???--"));
        assert_eq!(output.label(), "0000000000000001-0");
    }
}
