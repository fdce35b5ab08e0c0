//! Window Placement Module
//!
//! Places windows on display outputs and keeps them there across topology
//! changes.
//!
//! # Overview
//!
//! ```text
//! PlacementTracker
//!   ├─> DisplayService   (enumerate once per reconcile, resolve per window)
//!   ├─> placement_rect   (logical options → pixel rectangle)
//!   └─> WindowHost       (liveness, DPI scale, move, closed-watch)
//! ```
//!
//! The tracker is in-memory only; an application rebuilds it on every run by
//! calling [`PlacementTracker::place`] for the windows it wants anchored.

mod arena;
mod geometry;
mod host;
mod tracker;

pub use geometry::{placement_rect, PlacementOptions};
pub use host::{ClosedCallback, MoveFlag, MoveFlags, WatchId, WindowHandle, WindowHost};
pub use tracker::{
    PlacementTracker, ReconcileReport, ReconciledWindow, TrackedSetChanged, TrackedWindowSnapshot,
};

use thiserror::Error;

use crate::display::DisplayError;

/// Placement result type
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Placement error types
#[derive(Error, Debug)]
pub enum PlacementError {
    /// Enumeration or resolution failed
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// The window no longer exists
    #[error("Window {0} no longer exists")]
    WindowGone(WindowHandle),

    /// The host refused to move the window
    #[error("Failed to move window {window} (native code {code})")]
    MoveFailed {
        /// Window that was not moved
        window: WindowHandle,
        /// Native result code
        code: i32,
    },
}
