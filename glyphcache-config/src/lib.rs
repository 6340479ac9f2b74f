//! Configuration system for the glyphcache font subsystem.
//!
//! This crate provides configuration loading, default values and
//! environment overrides for the glyph cache. It includes:
//!
//! - Rendering priority knobs (embedded bitmaps, antialiasing, autohinting)
//! - Per-session font options (hinting, hint style, antialiasing)
//! - Font directory and cache sizing settings
//! - Environment variable overrides read once at subsystem init

pub mod config;
pub mod defaults;
pub mod env_vars;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::GlyphCacheConfig;
pub use error::ConfigError;
pub use types::{AutoHint, FontOptions, HintStyle, RenderPriorities};
