//! Raw sfnt container access.
//!
//! Everything here reads big-endian integers out of untrusted font bytes
//! through [`Reader`], which bounds-checks every access. Table offsets
//! taken from a font are never trusted without a range check against the
//! mapped extent.

use std::ops::Range;

/// A 4-byte OpenType tag packed big-endian into a `u32`.
pub type Tag = u32;

/// Build a [`Tag`] from its four ASCII bytes.
pub const fn tag(bytes: &[u8; 4]) -> Tag {
    u32::from_be_bytes(*bytes)
}

/// Render a tag as text for logs and CLI output.
pub fn tag_to_string(tag: Tag) -> String {
    tag.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// TrueType collection header signature (`ttcf`).
pub const SIG_COLLECTION: u32 = tag(b"ttcf");
/// TrueType outlines, version 1.0.
pub const SIG_TRUETYPE: u32 = 0x0001_0000;
/// Apple TrueType signature (`true`).
pub const SIG_APPLE_TRUE: u32 = tag(b"true");
/// CFF-flavored OpenType signature (`OTTO`).
pub const SIG_OPENTYPE_CFF: u32 = tag(b"OTTO");

pub const TAG_GSUB: Tag = tag(b"GSUB");
pub const TAG_GPOS: Tag = tag(b"GPOS");
pub const TAG_HHEA: Tag = tag(b"hhea");
pub const TAG_KERN: Tag = tag(b"kern");
pub const TAG_OS2: Tag = tag(b"OS/2");

/// Files smaller than this are not searched for tables.
pub const MIN_FONT_FILE_SIZE: usize = 1024;

/// Directories with this many tables or more are treated as corrupt.
const MAX_TABLE_COUNT: u16 = 64;

/// Bounds-checked big-endian cursor over a byte slice.
///
/// Reads are offset-based so that nested structures (GSUB lists, subtables)
/// can be addressed relative to their own start.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    fn array<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        let end = offset.checked_add(N)?;
        self.data.get(offset..end)?.try_into().ok()
    }

    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        self.array(offset).map(u16::from_be_bytes)
    }

    pub fn i16_at(&self, offset: usize) -> Option<i16> {
        self.array(offset).map(i16::from_be_bytes)
    }

    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        self.array(offset).map(u32::from_be_bytes)
    }

    /// A reader over the bytes starting at `offset`.
    pub fn sub(&self, offset: usize) -> Option<Reader<'a>> {
        self.data.get(offset..).map(Reader::new)
    }
}

/// Locate a table in an sfnt file or collection member.
///
/// Returns the byte range of the table within `data`, or `None` when the
/// container signature is unknown, the directory is implausible, the tag is
/// absent, or the table would extend past the end of the file.
pub fn find_table(data: &[u8], face_index: u32, wanted: Tag) -> Option<Range<usize>> {
    if data.len() < MIN_FONT_FILE_SIZE {
        return None;
    }
    let reader = Reader::new(data);

    // Table records follow the 12-byte offset table.
    let mut records = 12usize;
    match reader.u32_at(0)? {
        SIG_COLLECTION => {
            let slot = 12usize.checked_add(4usize.checked_mul(face_index as usize)?)?;
            let face_offset = reader.u32_at(slot)? as usize;
            records = records.checked_add(face_offset)?;
        }
        SIG_TRUETYPE | SIG_APPLE_TRUE | SIG_OPENTYPE_CFF => {}
        _ => return None,
    }

    let table_count = reader.u16_at(records - 8)?;
    if table_count >= MAX_TABLE_COUNT {
        log::debug!("Implausible sfnt table count {}", table_count);
        return None;
    }

    (0..table_count as usize)
        .map(|i| records + 16 * i)
        .find(|&record| reader.u32_at(record) == Some(wanted))
        .and_then(|record| {
            let offset = reader.u32_at(record + 8)? as usize;
            let length = reader.u32_at(record + 12)? as usize;
            let end = offset.checked_add(length)?;
            (end <= data.len()).then_some(offset..end)
        })
}

/// Scalar metrics from the `hhea` table, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HheaMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl HheaMetrics {
    pub fn parse(table: &[u8]) -> Option<Self> {
        let r = Reader::new(table);
        Some(Self {
            ascender: r.i16_at(4)?,
            descender: r.i16_at(6)?,
            line_gap: r.i16_at(8)?,
        })
    }
}

/// The subset of the `OS/2` table used for metrics and capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Os2Table {
    pub version: u16,
    pub panose: [u8; 10],
    pub unicode_range: [u32; 4],
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    /// Present from table version 1 on.
    pub code_page_range: Option<[u32; 2]>,
}

impl Os2Table {
    pub fn parse(table: &[u8]) -> Option<Self> {
        let r = Reader::new(table);
        let version = r.u16_at(0)?;
        let panose = r.array::<10>(32)?;
        let unicode_range = [r.u32_at(42)?, r.u32_at(46)?, r.u32_at(50)?, r.u32_at(54)?];
        let code_page_range = if version >= 1 {
            r.u32_at(78).zip(r.u32_at(82)).map(|(a, b)| [a, b])
        } else {
            None
        };
        Some(Self {
            version,
            panose,
            unicode_range,
            typo_ascender: r.i16_at(68)?,
            typo_descender: r.i16_at(70)?,
            typo_line_gap: r.i16_at(72)?,
            win_ascent: r.u16_at(74)?,
            win_descent: r.u16_at(76)?,
            code_page_range,
        })
    }
}

/// `unitsPerEm` from the `head` table.
pub fn units_per_em(head: &[u8]) -> Option<u16> {
    Reader::new(head).u16_at(18).filter(|&upem| upem != 0)
}
