//! Utility Functions
//!
//! User-friendly error formatting for the command-line front end.
//!
//! ```rust,no_run
//! use display_anchor::utils::format_user_error;
//!
//! # fn operation() -> anyhow::Result<()> { Ok(()) }
//! if let Err(e) = operation() {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```
//!
//! Error categories with context-aware help:
//! - Enumeration errors → session type, driver resets
//! - Rotation errors → driver support, stale output keys
//! - Name store errors → malformed JSON, store location
//! - Config errors → syntax, invalid values

pub mod errors;

pub use errors::format_user_error;
