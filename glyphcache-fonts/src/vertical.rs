//! Vertical writing helpers: alternate code points and rotation classes.

use crate::glyph::GlyphFlags;

/// Code points with a dedicated vertical presentation form.
const VERTICAL_FORMS: &[(u32, u32)] = &[
    (0x0028, 0xFE35),
    (0x0029, 0xFE36),
    (0x002C, 0x3001), // comma → ideographic comma
    (0x002E, 0x3002), // full stop → ideographic full stop
    (0x005F, 0xFE33),
    (0x007B, 0xFE37),
    (0x007D, 0xFE38),
    (0x2013, 0xFE32),
    (0x2014, 0xFE31),
    (0x2018, 0xFE41),
    (0x2019, 0xFE42),
    (0x201C, 0xFE43),
    (0x201D, 0xFE44),
    (0x2025, 0xFE30),
    (0x3008, 0xFE3F),
    (0x3009, 0xFE40),
    (0x300A, 0xFE3D),
    (0x300B, 0xFE3E),
    (0x300C, 0xFE41),
    (0x300D, 0xFE42),
    (0x300E, 0xFE43),
    (0x300F, 0xFE44),
    (0x3010, 0xFE3B),
    (0x3011, 0xFE3C),
    (0x3014, 0xFE39),
    (0x3015, 0xFE3A),
    (0xFE4F, 0xFE34),
];

/// The vertical presentation form of `ch`, if one exists.
pub fn vertical_char(ch: u32) -> Option<u32> {
    VERTICAL_FORMS
        .binary_search_by_key(&ch, |&(from, _)| from)
        .ok()
        .map(|i| VERTICAL_FORMS[i].1)
}

fn is_cjk(ch: u32) -> bool {
    matches!(ch,
        0x1100..=0x11F9   // Hangul Jamo
        | 0x2030..=0x2031 // per mille, per ten thousand
        | 0x3000..=0xFAFF // CJK symbols through compatibility ideographs
        | 0xFE20..=0xFE6F // combining half marks, vertical and small forms
        | 0xFF00..=0xFFFD // halfwidth and fullwidth forms
    )
}

fn is_bracket(ch: u32) -> bool {
    matches!(ch, 0x3008..=0x301C if ch != 0x3012)
        || matches!(ch, 0xFF08 | 0xFF09 | 0xFF3B | 0xFF3D | 0xFF5B | 0xFF5D)
}

/// Rotation to apply to `ch` in vertical writing.
///
/// Upright CJK characters get no flags. Brackets and the prolonged sound
/// mark turn clockwise. Everything else is laid on its side.
pub fn vertical_flags(ch: u32) -> GlyphFlags {
    if ch == 0x30FC {
        return GlyphFlags::ROTATE_RIGHT;
    }
    if is_cjk(ch) {
        if is_bracket(ch) {
            GlyphFlags::ROTATE_RIGHT
        } else {
            GlyphFlags::empty()
        }
    } else {
        GlyphFlags::ROTATE_LEFT
    }
}
