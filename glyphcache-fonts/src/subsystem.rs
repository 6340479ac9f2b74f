//! Process-wide entry point of the font subsystem.

use std::rc::Rc;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use glyphcache_config::GlyphCacheConfig;

use crate::file_mapping::{FileMapper, MmapFileMapper};
use crate::font_manager::FontManager;
use crate::gamma::GAMMA_TABLE;

/// The font subsystem: one per process, created by the embedding
/// application and passed to every font operation.
///
/// Everything inside is reference counted with `Rc`, so the subsystem can't
/// leave the thread that created it.
#[derive(Debug)]
pub struct FontSubsystem {
    manager: FontManager,
}

impl FontSubsystem {
    /// Start the subsystem with memory-mapped font files.
    ///
    /// Applies the environment overrides to `config`, then scans
    /// `config.font_dirs` and, if enabled, the system fonts.
    pub fn init(config: &GlyphCacheConfig) -> Result<Self> {
        Self::with_mapper(config, Rc::new(MmapFileMapper))
    }

    /// Like [`init`](Self::init) with a custom file mapper.
    pub fn with_mapper(config: &GlyphCacheConfig, mapper: Rc<dyn FileMapper>) -> Result<Self> {
        let mut config = config.clone();
        config.apply_env_overrides();
        LazyLock::force(&GAMMA_TABLE);

        let mut manager = FontManager::new(mapper, &config);
        for dir in &config.font_dirs {
            manager
                .add_fonts_from_dir(dir)
                .with_context(|| format!("Failed to scan font directory {}", dir.display()))?;
        }
        if config.load_system_fonts {
            manager.add_system_fonts();
        }
        log::info!(
            "Font subsystem ready: {} fonts in {} files",
            manager.font_count(),
            manager.file_count()
        );
        Ok(Self { manager })
    }

    pub fn manager(&self) -> &FontManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut FontManager {
        &mut self.manager
    }

    /// Release every registered face.
    pub fn shutdown(mut self) {
        self.manager.clear_font_list();
        log::info!("Font subsystem shut down");
    }
}
