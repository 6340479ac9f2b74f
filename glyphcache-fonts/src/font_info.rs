//! One registered face and its lazily created native handle.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, Range};
use std::rc::Rc;

use swash::{CacheKey, FontRef};

use crate::attributes::{DevFontAttributes, is_star_symbol};
use crate::charmap::{FontCharMap, SYMBOL_PRIVATE_USE, collapse_codepoints, parse_cmap};
use crate::file_mapping::{FontFile, MappedBytes};
use crate::pattern::FontId;
use crate::sfnt::{Tag, find_table, tag};
use crate::shaping::ShapingFace;

pub const TAG_CMAP: Tag = tag(b"cmap");
pub const TAG_SILF: Tag = tag(b"Silf");

/// Code points at or below this may be remapped into the symbol area.
const SYMBOL_ALIAS_LIMIT: u32 = 0xFF;
const SYMBOL_ALIAS_BASE: u32 = 0xF000;

/// What survives of a parsed `FontRef` between uses. The bytes themselves
/// live in the file mapping.
#[derive(Debug, Clone, Copy)]
struct FaceHandle {
    offset: u32,
    key: CacheKey,
    glyph_count: u16,
    units_per_em: u16,
}

/// A table's bytes inside the mapped file.
///
/// Holds the mapping alive for as long as the table is in use.
#[derive(Clone)]
pub struct TableData {
    bytes: Rc<MappedBytes>,
    range: Range<usize>,
}

impl Deref for TableData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[self.range.clone()]
    }
}

impl fmt::Debug for TableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableData")
            .field("range", &self.range)
            .finish()
    }
}

/// One face of one font file.
pub struct FontInfo {
    file: Rc<FontFile>,
    face_index: u32,
    font_id: FontId,
    attributes: DevFontAttributes,
    shaping_cache_size: usize,
    face_refs: Cell<u32>,
    face: Cell<Option<FaceHandle>>,
    char_to_glyph: RefCell<HashMap<u32, u16>>,
    char_map: OnceCell<Rc<FontCharMap>>,
    shaping_face: OnceCell<Option<Rc<ShapingFace>>>,
}

impl fmt::Debug for FontInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontInfo")
            .field("font_id", &self.font_id)
            .field("path", &self.file.path())
            .field("face_index", &self.face_index)
            .field("family", &self.attributes.family_name)
            .field("face_refs", &self.face_refs.get())
            .finish()
    }
}

/// Holds a face reference for a scope.
pub struct FaceGuard<'a> {
    info: &'a FontInfo,
    valid: bool,
}

impl FaceGuard<'_> {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Drop for FaceGuard<'_> {
    fn drop(&mut self) {
        self.info.release_face();
    }
}

impl FontInfo {
    /// Wrap a face, biasing its quality towards low ids and matching
    /// language file names.
    pub fn new(
        file: Rc<FontFile>,
        face_index: u32,
        font_id: FontId,
        mut attributes: DevFontAttributes,
        shaping_cache_size: usize,
    ) -> Self {
        let biased = i64::from(attributes.quality) + 10000 - i64::from(font_id)
            + i64::from(file.lang_boost());
        attributes.quality = biased.clamp(i32::MIN.into(), i32::MAX.into()) as i32;
        if is_star_symbol(&attributes.family_name) {
            attributes.symbol = true;
        }
        Self {
            file,
            face_index,
            font_id,
            attributes,
            shaping_cache_size,
            face_refs: Cell::new(0),
            face: Cell::new(None),
            char_to_glyph: RefCell::new(HashMap::new()),
            char_map: OnceCell::new(),
            shaping_face: OnceCell::new(),
        }
    }

    pub fn font_id(&self) -> FontId {
        self.font_id
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn file(&self) -> &Rc<FontFile> {
        &self.file
    }

    pub fn attributes(&self) -> &DevFontAttributes {
        &self.attributes
    }

    pub fn is_symbol(&self) -> bool {
        self.attributes.symbol
    }

    pub fn face_ref_count(&self) -> u32 {
        self.face_refs.get()
    }

    pub fn has_face(&self) -> bool {
        self.face.get().is_some()
    }

    // ========================================================================
    // Face lifecycle
    // ========================================================================

    /// Take a face reference, creating the native face on the first one.
    ///
    /// Returns whether a usable face exists. Like [`FontFile::map`], the
    /// reference is taken even on failure and must be released. A face that
    /// failed to open stays failed until every reference is released.
    pub fn acquire_face(&self) -> bool {
        let refs = self.face_refs.get() + 1;
        self.face_refs.set(refs);
        if refs == 1 {
            let handle = if self.file.map() { self.open_face() } else { None };
            if handle.is_none() {
                log::warn!(
                    "Could not create face {} of {:?}",
                    self.face_index,
                    self.file.path()
                );
            }
            self.face.set(handle);
        }
        self.has_face()
    }

    /// Drop a face reference; the last one destroys the face and unmaps.
    pub fn release_face(&self) {
        let refs = self.face_refs.get();
        if refs == 0 {
            log::warn!("Unbalanced face release for font {}", self.font_id);
            return;
        }
        self.face_refs.set(refs - 1);
        if refs == 1 {
            self.face.set(None);
            self.file.unmap();
        }
    }

    /// Acquire a face reference released when the guard drops.
    pub fn face_guard(&self) -> FaceGuard<'_> {
        let valid = self.acquire_face();
        FaceGuard { info: self, valid }
    }

    fn open_face(&self) -> Option<FaceHandle> {
        let bytes = self.file.buffer()?;
        let font = FontRef::from_index(&bytes, self.face_index as usize)?;
        let metrics = font.metrics(&[]);
        if metrics.glyph_count == 0 {
            return None;
        }
        Some(FaceHandle {
            offset: font.offset,
            key: font.key,
            glyph_count: metrics.glyph_count,
            units_per_em: metrics.units_per_em,
        })
    }

    /// Run `f` on the native face, if one is currently acquired.
    pub fn with_face<R>(&self, f: impl FnOnce(FontRef<'_>) -> R) -> Option<R> {
        let handle = self.face.get()?;
        let bytes = self.file.buffer()?;
        let font = FontRef {
            data: &bytes,
            offset: handle.offset,
            key: handle.key,
        };
        Some(f(font))
    }

    pub fn glyph_count(&self) -> u16 {
        self.face.get().map_or(0, |h| h.glyph_count)
    }

    pub fn units_per_em(&self) -> u16 {
        self.face.get().map_or(0, |h| h.units_per_em)
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Raw bytes of the table `tag` in this face.
    ///
    /// Only available while the file is mapped. Offsets are checked against
    /// the mapped extent.
    pub fn get_table(&self, tag: Tag) -> Option<TableData> {
        let bytes = self.file.buffer()?;
        let range = find_table(&bytes, self.face_index, tag)?;
        Some(TableData { bytes, range })
    }

    // ========================================================================
    // Character lookup
    // ========================================================================

    /// Cached code point to glyph lookup through the native charmap.
    pub fn glyph_index(&self, ch: u32) -> u16 {
        self.glyph_index_with(ch, |c| {
            self.with_face(|font| font.charmap().map(c)).unwrap_or(0)
        })
    }

    /// Cached lookup with a caller-supplied native query.
    ///
    /// `query` runs only on a cache miss; symbol fonts get a second query in
    /// the 0xF000 area for Latin-1 code points. Misses are cached as 0.
    pub fn glyph_index_with(&self, ch: u32, mut query: impl FnMut(u32) -> u16) -> u16 {
        if let Some(&glyph) = self.char_to_glyph.borrow().get(&ch) {
            return glyph;
        }
        let mut glyph = query(ch);
        if glyph == 0 && ch <= SYMBOL_ALIAS_LIMIT && self.is_symbol() {
            glyph = query(ch | SYMBOL_ALIAS_BASE);
        }
        self.char_to_glyph.borrow_mut().insert(ch, glyph);
        glyph
    }

    /// Coverage of this face, built once and shared.
    pub fn char_map(&self) -> Rc<FontCharMap> {
        self.char_map
            .get_or_init(|| match self.code_ranges() {
                Some(map) => Rc::new(map),
                None => {
                    log::debug!("Using default coverage for font {}", self.font_id);
                    FontCharMap::default_map(self.is_symbol())
                }
            })
            .clone()
    }

    /// Build the coverage from `cmap`, or from the native charmap when the
    /// table can't be parsed. Symbol fonts without any coverage get the
    /// private-use placeholder.
    pub fn code_ranges(&self) -> Option<FontCharMap> {
        let _face = self.face_guard();

        if let Some(map) = self.get_table(TAG_CMAP).and_then(|t| parse_cmap(&t)) {
            return Some(map);
        }

        let mut codepoints = Vec::new();
        self.with_face(|font| {
            font.charmap().enumerate(|cp, gid| {
                if gid != 0 {
                    codepoints.push(cp);
                }
            })
        });
        if !codepoints.is_empty() {
            return Some(FontCharMap::new(
                collapse_codepoints(codepoints),
                self.is_symbol(),
            ));
        }

        self.is_symbol()
            .then(|| FontCharMap::new(vec![SYMBOL_PRIVATE_USE], true))
    }

    // ========================================================================
    // Complex script shaping
    // ========================================================================

    /// Shaping face for fonts carrying a `Silf` table.
    ///
    /// The table is checked exactly once; a negative answer is cached too.
    pub fn shaping_face(self: &Rc<Self>) -> Option<Rc<ShapingFace>> {
        self.shaping_face
            .get_or_init(|| {
                let _face = self.face_guard();
                self.get_table(TAG_SILF)?;
                log::debug!("Font {} has a Silf table", self.font_id);
                Some(Rc::new(ShapingFace::new(self, self.shaping_cache_size)))
            })
            .clone()
    }
}
