//! Shared helpers for the glyphcache CLI tests.
//!
//! Fonts come from the same in-memory builder the font crate tests use.

#![allow(dead_code)]

#[path = "../../glyphcache-fonts/tests/common/font_builder.rs"]
pub mod font_builder;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use font_builder::TestFont;

/// A temporary directory holding one test font and an empty config file.
pub struct CliFixture {
    pub dir: TempDir,
    pub font: PathBuf,
    pub config: PathBuf,
}

impl CliFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let font = TestFont::new().write_to(dir.path(), "plain.ttf");
        let config = dir.path().join("config.toml");
        fs::write(&config, "load_system_fonts = false\nfont_dirs = []\n").expect("write config");
        Self { dir, font, config }
    }

    /// Arguments for `glyphcache --config <config> <rest...>`.
    pub fn args(&self, rest: &[&str]) -> Vec<String> {
        let mut args = vec![
            "glyphcache".to_string(),
            "--config".to_string(),
            self.config.display().to_string(),
        ];
        args.extend(rest.iter().map(|s| s.to_string()));
        args
    }

    pub fn font_arg(&self) -> String {
        self.font.display().to_string()
    }
}
