//! Shared integration test helpers for glyphcache-fonts.
//!
//! Include with `mod common;` at the top of a test file. Fonts are built
//! on the fly by [`font_builder`] and written into a temporary directory,
//! so the tests never depend on fonts installed on the machine.

#![allow(dead_code)]

pub mod font_builder;

use std::path::PathBuf;
use std::rc::Rc;

use glyphcache_config::GlyphCacheConfig;
use glyphcache_fonts::{DevFontAttributes, FontId, FontManager, MmapFileMapper};
use tempfile::TempDir;

use font_builder::TestFont;

/// A manager plus the temporary directory its fonts live in.
///
/// Keep the context alive for as long as the fonts are used.
pub struct TestContext {
    pub dir: TempDir,
    pub manager: FontManager,
}

impl TestContext {
    pub fn new() -> Self {
        let config = GlyphCacheConfig {
            ui_language: None,
            load_system_fonts: false,
            font_dirs: Vec::new(),
            ..GlyphCacheConfig::default()
        };
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
            manager: FontManager::new(Rc::new(MmapFileMapper), &config),
        }
    }

    /// Write `font` as `file_name` and register it as `font_id`.
    pub fn register(&mut self, font: &TestFont, file_name: &str, font_id: FontId) -> PathBuf {
        self.register_with(font, file_name, font_id, DevFontAttributes::new("Glyph Test"))
    }

    pub fn register_with(
        &mut self,
        font: &TestFont,
        file_name: &str,
        font_id: FontId,
        attributes: DevFontAttributes,
    ) -> PathBuf {
        let path = font.write_to(self.dir.path(), file_name);
        assert!(self.manager.add_font_file(&path, 0, font_id, attributes));
        path
    }
}
