//! Window Host
//!
//! The window-positioning primitive and window-lifetime observation the
//! tracker depends on. The tracker never owns a window: it only holds a
//! [`WindowHandle`] and asks the host whether it is still valid.

use enumflags2::{bitflags, BitFlags};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::display::{NativeError, PixelRect};

/// Native window handle value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Z-order and activation flags for a window move
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveFlag {
    /// Keep the current z-order
    NoZOrder = 0b0001,
    /// Do not activate the window
    NoActivate = 0b0010,
    /// Maximize after moving; with `NoActivate` focus stays where it was
    Maximize = 0b0100,
}

/// Set of [`MoveFlag`]
pub type MoveFlags = BitFlags<MoveFlag>;

/// Registration of a closed-window callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Invoked once when a watched window is destroyed
pub type ClosedCallback = Box<dyn Fn() + Send + Sync>;

/// Window operations provided by the embedding application or platform
pub trait WindowHost: Send + Sync {
    /// Whether the handle still names a live window
    fn is_window_alive(&self, window: WindowHandle) -> bool;

    /// Window title, for diagnostics
    fn window_title(&self, window: WindowHandle) -> Option<String>;

    /// Logical-to-pixel scale of the window (1.0 = 96 DPI)
    fn scale_factor(&self, _window: WindowHandle) -> f64 {
        1.0
    }

    /// Move/resize the window to `rect`
    fn move_window(
        &self,
        window: WindowHandle,
        rect: PixelRect,
        flags: MoveFlags,
    ) -> Result<(), NativeError>;

    /// Register a callback for window destruction
    ///
    /// Returns `None` when the host cannot observe closing; the tracker then
    /// relies on lazy reaping alone. The callback may run on any thread,
    /// including synchronously from inside `watch_closed` when the window is
    /// already gone.
    fn watch_closed(&self, window: WindowHandle, callback: ClosedCallback) -> Option<WatchId>;

    /// Detach a callback registered with [`WindowHost::watch_closed`]
    fn unwatch(&self, id: WatchId);
}
