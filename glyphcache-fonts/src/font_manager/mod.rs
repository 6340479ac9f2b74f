//! Registry of known faces and factory for rendering instances.
//!
//! The manager owns:
//! - the deduplicated font file registry
//! - one [`FontInfo`] per registered font id
//! - the session's rendering priorities and font options
//! - an LRU cache of recently used [`ServerFont`] instances
//!
//! Registration is idempotent, so scanners may announce the same faces
//! again without creating duplicates.

mod scan;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glyphcache_config::{FontOptions, GlyphCacheConfig, RenderPriorities};
use lru::LruCache;

use crate::attributes::DevFontAttributes;
use crate::file_mapping::{FileMapper, FontFileRegistry};
use crate::font_info::FontInfo;
use crate::pattern::{FontId, FontSelectKey, FontSelectPattern};
use crate::server_font::ServerFont;

/// Receiver of [`FontManager::announce_fonts`].
pub trait FontCollection {
    fn add_face(&mut self, info: &Rc<FontInfo>);
}

/// Collects announced faces into a list.
impl FontCollection for Vec<Rc<FontInfo>> {
    fn add_face(&mut self, info: &Rc<FontInfo>) {
        self.push(Rc::clone(info));
    }
}

pub struct FontManager {
    files: FontFileRegistry,
    fonts: HashMap<FontId, Rc<FontInfo>>,
    /// (path, face index) of every face added by a scan
    scanned_faces: HashSet<(PathBuf, u32)>,
    max_font_id: FontId,
    priorities: RenderPriorities,
    font_options: FontOptions,
    shaping_cache_size: usize,
    instances: LruCache<FontSelectKey, Rc<ServerFont>>,
}

impl fmt::Debug for FontManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontManager")
            .field("fonts", &self.fonts.len())
            .field("files", &self.files.len())
            .field("max_font_id", &self.max_font_id)
            .field("cached_instances", &self.instances.len())
            .finish()
    }
}

impl FontManager {
    /// An empty registry using `config`'s policy. Environment overrides are
    /// expected to be applied to `config` already.
    pub fn new(mapper: Rc<dyn FileMapper>, config: &GlyphCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            files: FontFileRegistry::new(mapper, config.ui_language.as_deref()),
            fonts: HashMap::new(),
            scanned_faces: HashSet::new(),
            max_font_id: 0,
            priorities: config.priorities,
            font_options: config.font_options,
            shaping_cache_size: config.shaping_cache_size,
            instances: LruCache::new(capacity),
        }
    }

    /// Register face `face_index` of `path` as `font_id`.
    ///
    /// Returns false without doing anything when the id is already known or
    /// the path is empty.
    pub fn add_font_file(
        &mut self,
        path: &Path,
        face_index: u32,
        font_id: FontId,
        attributes: DevFontAttributes,
    ) -> bool {
        if path.as_os_str().is_empty() || self.fonts.contains_key(&font_id) {
            return false;
        }
        self.max_font_id = self.max_font_id.max(font_id);

        let file = self.files.find_or_create(path);
        log::debug!(
            "Registered font {} ({}) from {:?} face {}",
            font_id,
            attributes.family_name,
            path,
            face_index
        );
        let info = FontInfo::new(file, face_index, font_id, attributes, self.shaping_cache_size);
        self.fonts.insert(font_id, Rc::new(info));
        true
    }

    /// Report every registered face to `collection`, in no particular order.
    pub fn announce_fonts(&self, collection: &mut dyn FontCollection) {
        for info in self.fonts.values() {
            collection.add_face(info);
        }
        log::debug!("Announced {} fonts", self.fonts.len());
    }

    /// Build a new rendering instance for `pattern`.
    ///
    /// `None` only when the pattern's font id is unknown. Check
    /// [`ServerFont::is_valid`] on the result.
    pub fn create_font(&self, pattern: &FontSelectPattern) -> Option<Rc<ServerFont>> {
        let Some(info) = self.fonts.get(&pattern.font_id) else {
            log::warn!("No font registered with id {}", pattern.font_id);
            return None;
        };
        let mut font = ServerFont::new(pattern.clone(), Rc::clone(info), self.priorities);
        font.set_font_options(&self.font_options);
        let font = Rc::new(font);
        if let Some(entry) = &pattern.font_entry {
            entry.set_server_font(&font);
        }
        Some(font)
    }

    /// A cached instance for `pattern`, created on a miss.
    ///
    /// Invalid instances are handed out but never cached.
    pub fn cached_font(&mut self, pattern: &FontSelectPattern) -> Option<Rc<ServerFont>> {
        let key = pattern.cache_key();
        if let Some(font) = self.instances.get(&key) {
            if let Some(entry) = &pattern.font_entry {
                entry.set_server_font(font);
            }
            return Some(Rc::clone(font));
        }

        let font = self.create_font(pattern)?;
        if font.is_valid()
            && let Some((_, evicted)) = self.instances.push(key, Rc::clone(&font))
        {
            log::debug!(
                "Evicted font instance {} at {}px",
                evicted.font_info().font_id(),
                evicted.pattern().height
            );
        }
        Some(font)
    }

    /// Replace the session font options. Cached instances are dropped since
    /// their load flags were derived from the old options.
    pub fn set_font_options(&mut self, options: FontOptions) {
        self.font_options = options;
        self.instances.clear();
    }

    /// Forget every registered face and cached instance.
    ///
    /// Instances still held elsewhere keep their face alive until dropped.
    pub fn clear_font_list(&mut self) {
        self.instances.clear();
        self.fonts.clear();
        self.scanned_faces.clear();
        self.files.clear();
        log::info!("Cleared font list");
    }

    pub fn font_info(&self, font_id: FontId) -> Option<&Rc<FontInfo>> {
        self.fonts.get(&font_id)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Highest font id ever registered.
    pub fn max_font_id(&self) -> FontId {
        self.max_font_id
    }

    pub fn cached_count(&self) -> usize {
        self.instances.len()
    }

    pub fn priorities(&self) -> RenderPriorities {
        self.priorities
    }

    pub fn font_options(&self) -> &FontOptions {
        &self.font_options
    }
}
