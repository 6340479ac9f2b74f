//! Glyph identities and per-glyph metrics.

use bitflags::bitflags;

bitflags! {
    /// Rendering side-channel carried alongside a glyph index.
    ///
    /// These travel with the glyph from index lookup to rasterization so that
    /// every consumer sees the same rotation and substitution decisions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GlyphFlags: u8 {
        /// Rotate 90° counter-clockwise (vertical writing of a horizontal glyph)
        const ROTATE_LEFT = 1 << 0;
        /// Rotate 90° clockwise (brackets in vertical writing)
        const ROTATE_RIGHT = 1 << 1;
        /// Load without hinting
        const UNHINTED = 1 << 2;
        /// Index came from a GSUB or vertical-forms substitution
        const GSUB = 1 << 3;
        /// Index is a code point still to be resolved
        const IS_CHAR = 1 << 4;
    }
}

/// Rotation requested by the flags of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphRotation {
    None,
    Left,
    Right,
}

impl GlyphFlags {
    pub fn rotation(self) -> GlyphRotation {
        if self.contains(Self::ROTATE_RIGHT) {
            GlyphRotation::Right
        } else if self.contains(Self::ROTATE_LEFT) {
            GlyphRotation::Left
        } else {
            GlyphRotation::None
        }
    }

    /// True when either rotation bit is set.
    pub fn is_rotated(self) -> bool {
        self.intersects(Self::ROTATE_LEFT | Self::ROTATE_RIGHT)
    }
}

/// A glyph index plus its rendering flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphId {
    pub index: u32,
    pub flags: GlyphFlags,
}

impl GlyphId {
    pub const NOTDEF: GlyphId = GlyphId::new(0);

    pub const fn new(index: u32) -> Self {
        Self {
            index,
            flags: GlyphFlags::empty(),
        }
    }

    pub const fn with_flags(index: u32, flags: GlyphFlags) -> Self {
        Self { index, flags }
    }

    /// A not-yet-resolved glyph identified by its code point.
    pub const fn from_char(codepoint: u32) -> Self {
        Self {
            index: codepoint,
            flags: GlyphFlags::IS_CHAR,
        }
    }

    pub fn is_notdef(self) -> bool {
        self.index == 0 && !self.flags.contains(GlyphFlags::IS_CHAR)
    }
}

/// Metrics of one rendered glyph, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphData {
    /// Advance width before rotation
    pub char_width: i32,
    /// Advance vector after the glyph transform
    pub delta: (i32, i32),
    /// Top-left of the ink box relative to the pen position (y down)
    pub offset: (i32, i32),
    /// Ink box size
    pub size: (i32, i32),
}
