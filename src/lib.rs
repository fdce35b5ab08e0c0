//! # display-anchor
//!
//! Stable display-output identities, window placement that survives
//! topology changes, and output rotation.
//!
//! This crate integrates:
//! - [`display`] - enumeration, identity resolution and rotation
//! - [`placement`] - the window placement tracker
//! - [`notify`] - topology change fan-out
//! - [`names`] - user-chosen output names
//! - [`platform`] - Win32 and fixture backends
//!
//! # Architecture
//!
//! ```text
//! display-anchor
//!   ├─> DisplayService (enumerate → resolve → rotate)
//!   │     ├─> DisplayConfigBackend (display-configuration query)
//!   │     └─> LegacyDisplayBackend (legacy display settings)
//!   ├─> PlacementTracker (window → output, replayed on change)
//!   │     └─> WindowHost (liveness, DPI, move, closed-watch)
//!   └─> TopologyNotifier (platform bridge → tracker.reconcile)
//! ```
//!
//! # Data Flow
//!
//! **Topology change:** Platform bridge → TopologyNotifier → PlacementTracker
//! → DisplayService (one enumeration) → WindowHost::move_window per window

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Application configuration
pub mod config;

/// Display outputs
pub mod display;

/// Friendly-name store
pub mod names;

/// Topology change notification
pub mod notify;

/// Window placement
pub mod placement;

/// Platform backends
pub mod platform;

/// Utility functions
pub mod utils;
