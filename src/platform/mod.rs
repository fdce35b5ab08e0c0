//! Platform Backends
//!
//! Concrete implementations of the display and window traits:
//!
//! - [`win32`]: the real OS APIs (Windows only)
//! - [`fixture`]: a TOML-described topology for tests and non-Windows hosts

pub mod fixture;

#[cfg(windows)]
pub mod win32;
