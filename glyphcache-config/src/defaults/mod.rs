//! Default values for glyph cache configuration.

use std::path::PathBuf;

pub fn embedded_bitmap_priority() -> i32 {
    2
}

pub fn anti_alias_priority() -> i32 {
    1
}

pub fn auto_hint_priority() -> i32 {
    1
}

pub fn enabled() -> bool {
    true
}

pub fn cache_capacity() -> usize {
    64 // Rendering instances kept alive by the LRU container
}

pub fn shaping_cache_size() -> usize {
    0 // Segment cache disabled
}

pub fn load_system_fonts() -> bool {
    false
}

pub fn font_dirs() -> Vec<PathBuf> {
    Vec::new()
}

/// UI language from the locale environment, e.g. `ja_JP.UTF-8` → `ja-JP`.
pub fn ui_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
        .map(|value| {
            value
                .split(['.', '@'])
                .next()
                .unwrap_or_default()
                .replace('_', "-")
        })
}
