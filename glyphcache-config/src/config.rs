//! The top-level `GlyphCacheConfig` and its TOML persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::env_vars;
use crate::error::ConfigError;
use crate::types::{FontOptions, RenderPriorities};

/// Configuration for the font subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphCacheConfig {
    /// Rendering strategy priorities
    #[serde(default)]
    pub priorities: RenderPriorities,

    /// Session font options
    #[serde(default)]
    pub font_options: FontOptions,

    /// Maximum number of rendering instances kept by the LRU cache
    #[serde(default = "defaults::cache_capacity")]
    pub cache_capacity: usize,

    /// UI language used to prefer language-specific font files (e.g. "ja-JP")
    #[serde(default = "defaults::ui_language")]
    pub ui_language: Option<String>,

    /// Directories scanned for fonts at init
    #[serde(default = "defaults::font_dirs")]
    pub font_dirs: Vec<PathBuf>,

    /// Also register the platform's system fonts at init
    #[serde(default = "defaults::load_system_fonts")]
    pub load_system_fonts: bool,

    /// Segment cache size handed to the complex-script shaping face
    #[serde(default = "defaults::shaping_cache_size")]
    pub shaping_cache_size: usize,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self {
            priorities: RenderPriorities::default(),
            font_options: FontOptions::default(),
            cache_capacity: defaults::cache_capacity(),
            ui_language: defaults::ui_language(),
            font_dirs: defaults::font_dirs(),
            load_system_fonts: defaults::load_system_fonts(),
            shaping_cache_size: defaults::shaping_cache_size(),
        }
    }
}

impl GlyphCacheConfig {
    /// Default config file location: `<config_dir>/glyphcache/config.toml`.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glyphcache")
            .join("config.toml")
    }

    /// Load configuration from the default path, or defaults if the file is absent.
    ///
    /// Environment overrides are applied on top of either.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        log::info!("Config path: {:?}", path);
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            log::info!("No config file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, contents).map_err(io_err)
    }

    /// Apply the `GLYPHCACHE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        env_vars::apply_priority_overrides(&mut self.priorities);
        if let Some(size) = env_vars::shaping_cache_override() {
            self.shaping_cache_size = size;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
