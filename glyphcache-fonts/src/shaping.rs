//! Complex-script shaping face.
//!
//! Created by [`FontInfo::shaping_face`] for fonts that carry their own
//! shaping tables. The engine reads tables through [`ShapingFace::table`],
//! which resolves them against the owning face's mapped file.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};

use lru::LruCache;
use rustybuzz::{Face, UnicodeBuffer};

use crate::font_info::{FontInfo, TableData};
use crate::sfnt::Tag;

/// One positioned glyph, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph_id: u32,
    /// Byte offset of the source cluster in the input text
    pub cluster: u32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

pub struct ShapingFace {
    info: Weak<FontInfo>,
    segment_cache: Option<RefCell<LruCache<String, Rc<[ShapedGlyph]>>>>,
}

impl fmt::Debug for ShapingFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapingFace")
            .field("cached", &self.segment_cache.is_some())
            .finish()
    }
}

impl ShapingFace {
    /// A face bound to `info`. A non-zero `cache_size` keeps that many
    /// shaped segments.
    pub(crate) fn new(info: &Rc<FontInfo>, cache_size: usize) -> Self {
        let segment_cache =
            NonZeroUsize::new(cache_size).map(|cap| RefCell::new(LruCache::new(cap)));
        Self {
            info: Rc::downgrade(info),
            segment_cache,
        }
    }

    /// Table access for the shaping engine.
    ///
    /// `None` when the table is absent, the face is gone or its file is not
    /// currently mapped.
    pub fn table(&self, tag: Tag) -> Option<TableData> {
        self.info.upgrade()?.get_table(tag)
    }

    /// Shape `text` with the face's own tables.
    pub fn shape(&self, text: &str) -> Option<Rc<[ShapedGlyph]>> {
        if let Some(cache) = &self.segment_cache
            && let Some(hit) = cache.borrow_mut().get(text)
        {
            return Some(Rc::clone(hit));
        }

        let info = self.info.upgrade()?;
        let face_ref = info.face_guard();
        if !face_ref.is_valid() {
            return None;
        }
        let bytes = info.file().buffer()?;
        let face = Face::from_slice(&bytes, info.face_index())?;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&face, &[], buffer);

        let glyphs: Rc<[ShapedGlyph]> = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                x_advance: pos.x_advance,
                y_advance: pos.y_advance,
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
            })
            .collect();

        if let Some(cache) = &self.segment_cache
            && let Some((evicted, _)) = cache
                .borrow_mut()
                .push(text.to_string(), Rc::clone(&glyphs))
            && evicted != text
        {
            log::trace!("Shaping cache evicted {evicted:?}");
        }
        Some(glyphs)
    }
}
