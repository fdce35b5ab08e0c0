//! Identity Resolver
//!
//! Finds an output by exact identity, by friendly-name substring, or falls
//! back to the best available output. These functions work on an already
//! enumerated list so one query can serve many lookups; [`DisplayService`]
//! wraps them with a fresh enumeration.
//!
//! [`DisplayService`]: crate::display::DisplayService

use std::fmt;

use crate::display::enumerator::ordering_key;
use crate::display::model::{OutputIdentity, OutputInfo};
use crate::display::{DisplayError, Result};

/// How [`resolve_in`] arrived at its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    /// Exact identity match
    Identity,
    /// Friendly-name substring match
    Name,
    /// First output in enumeration order
    Fallback,
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedBy::Identity => write!(f, "identity"),
            ResolvedBy::Name => write!(f, "name"),
            ResolvedBy::Fallback => write!(f, "fallback"),
        }
    }
}

/// Exact identity match
pub fn find_by_id_in(outputs: &[OutputInfo], identity: OutputIdentity) -> Option<&OutputInfo> {
    outputs.iter().find(|o| o.identity == identity)
}

/// Case-insensitive substring match against the friendly name
///
/// A blank needle matches nothing. Several matches are ranked by the
/// enumeration order.
pub fn find_by_name_in<'a>(outputs: &'a [OutputInfo], needle: &str) -> Option<&'a OutputInfo> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    outputs
        .iter()
        .filter(|o| o.friendly_name.to_lowercase().contains(&needle))
        .min_by_key(|o| ordering_key(o))
}

/// Identity, then name hint, then the first output
///
/// Never fails while `outputs` is non-empty.
pub fn resolve_in<'a>(
    outputs: &'a [OutputInfo],
    identity: OutputIdentity,
    name_hint: Option<&str>,
) -> Result<(&'a OutputInfo, ResolvedBy)> {
    if let Some(output) = find_by_id_in(outputs, identity) {
        return Ok((output, ResolvedBy::Identity));
    }

    if let Some(output) = name_hint.and_then(|hint| find_by_name_in(outputs, hint)) {
        return Ok((output, ResolvedBy::Name));
    }

    outputs
        .iter()
        .min_by_key(|o| ordering_key(o))
        .map(|output| (output, ResolvedBy::Fallback))
        .ok_or(DisplayError::NoOutputsAvailable)
}
