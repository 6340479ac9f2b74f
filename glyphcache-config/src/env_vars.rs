//! Environment overrides for rendering policy.
//!
//! Each priority variable is read once. Only the first character is
//! significant and it must be an ASCII digit; anything else is ignored.

use crate::types::RenderPriorities;

/// Overrides `RenderPriorities::embedded_bitmap`.
pub const EMBEDDED_BITMAP_PRIORITY: &str = "GLYPHCACHE_EMBEDDED_BITMAP_PRIORITY";
/// Overrides `RenderPriorities::anti_alias`.
pub const ANTIALIAS_PRIORITY: &str = "GLYPHCACHE_ANTIALIAS_PRIORITY";
/// Overrides `RenderPriorities::auto_hint`.
pub const AUTOHINT_PRIORITY: &str = "GLYPHCACHE_AUTOHINT_PRIORITY";
/// Overrides the shaping segment cache size when larger than [`MIN_SHAPING_CACHE_SIZE`].
pub const SHAPING_CACHE_SIZE: &str = "GLYPHCACHE_SHAPING_CACHE_SIZE";

/// Smallest shaping segment cache size accepted from the environment.
pub const MIN_SHAPING_CACHE_SIZE: usize = 500;

/// Parse a single-digit priority knob.
pub fn parse_priority(value: &str) -> Option<i32> {
    value
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as i32)
}

fn read_priority(var: &str) -> Option<i32> {
    let value = std::env::var(var).ok()?;
    let parsed = parse_priority(&value);
    if parsed.is_none() {
        log::warn!("Ignoring {}={:?}: expected a leading digit", var, value);
    }
    parsed
}

/// Apply the three priority overrides found in the environment.
pub fn apply_priority_overrides(priorities: &mut RenderPriorities) {
    if let Some(v) = read_priority(EMBEDDED_BITMAP_PRIORITY) {
        priorities.embedded_bitmap = v;
    }
    if let Some(v) = read_priority(ANTIALIAS_PRIORITY) {
        priorities.anti_alias = v;
    }
    if let Some(v) = read_priority(AUTOHINT_PRIORITY) {
        priorities.auto_hint = v;
    }
    log::debug!("Rendering priorities after env overrides: {:?}", priorities);
}

/// Shaping segment cache size from the environment, if set and large enough.
pub fn shaping_cache_override() -> Option<usize> {
    std::env::var(SHAPING_CACHE_SIZE)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&size| size > MIN_SHAPING_CACHE_SIZE)
}
