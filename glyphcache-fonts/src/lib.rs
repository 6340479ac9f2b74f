//! Font glyph cache and rasterization subsystem.
//!
//! This crate provides:
//! - Shared, reference-counted memory mappings of font files
//! - Registered faces with lazily created native handles and table access
//! - A font manager that registers, scans and announces faces and builds
//!   sized rendering instances with an LRU instance cache
//! - Rendering instances that map characters to glyphs, apply vertical and
//!   GSUB substitutions, render 1-bit and 8-bit rasters and extract outlines
//!
//! # Architecture
//!
//! [`FontSubsystem`] owns a [`FontManager`], which owns one [`FontInfo`] per
//! registered face. Faces share [`FontFile`] mappings; a [`ServerFont`]
//! holds a face reference for its whole life, so the file stays mapped
//! exactly as long as some instance needs it.
//!
//! Everything is single-threaded and built on `Rc`.

pub mod attributes;
pub mod bitmap;
pub mod charmap;
pub mod error;
pub mod file_mapping;
pub mod font_info;
pub mod font_manager;
pub mod gamma;
pub mod glyph;
pub mod gsub;
pub mod metrics;
pub mod outline;
pub mod pattern;
pub mod server_font;
pub mod sfnt;
pub mod shaping;
pub mod subsystem;
pub mod vertical;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use attributes::{DevFontAttributes, FamilyType, Pitch, Slant, Weight};
pub use bitmap::{BitDepth, RawBitmap};
pub use error::{FontError, Result};
pub use file_mapping::{FileMapper, FontFile, MappedBytes, MmapFileMapper};
pub use font_info::FontInfo;
pub use font_manager::{FontCollection, FontManager};
pub use glyph::{GlyphData, GlyphFlags, GlyphId};
pub use metrics::FontMetric;
pub use outline::{GlyphOutline, OutlinePoint, PointFlag, PolyArgs};
pub use pattern::{FontEntry, FontId, FontSelectPattern};
pub use server_font::{FontCapabilities, FontState, ServerFont};
pub use subsystem::FontSubsystem;
