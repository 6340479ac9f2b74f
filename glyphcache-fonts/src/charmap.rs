//! Character coverage of a font as a list of half-open code point ranges.

use std::rc::Rc;

use rustybuzz::ttf_parser::PlatformId;
use rustybuzz::ttf_parser::cmap;

/// A half-open code point range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ch: u32) -> bool {
        (self.start..self.end).contains(&ch)
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

const DEFAULT_UNICODE_RANGES: &[CodeRange] = &[
    CodeRange::new(0x0020, 0xD800),
    CodeRange::new(0xE000, 0xFFF0),
];

const DEFAULT_SYMBOL_RANGES: &[CodeRange] = &[
    CodeRange::new(0x0020, 0x0100),
    CodeRange::new(0xF020, 0xF100),
];

/// Placeholder coverage for symbol fonts whose coverage can't be discovered.
pub const SYMBOL_PRIVATE_USE: CodeRange = CodeRange::new(0xF020, 0xF100);

thread_local! {
    static DEFAULT_UNICODE_MAP: Rc<FontCharMap> = Rc::new(FontCharMap {
        ranges: DEFAULT_UNICODE_RANGES.to_vec(),
        symbolic: false,
        default_map: true,
    });
    static DEFAULT_SYMBOL_MAP: Rc<FontCharMap> = Rc::new(FontCharMap {
        ranges: DEFAULT_SYMBOL_RANGES.to_vec(),
        symbolic: true,
        default_map: true,
    });
}

/// Sorted, non-overlapping coverage ranges of a font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCharMap {
    ranges: Vec<CodeRange>,
    symbolic: bool,
    default_map: bool,
}

impl FontCharMap {
    pub fn new(ranges: Vec<CodeRange>, symbolic: bool) -> Self {
        Self {
            ranges,
            symbolic,
            default_map: false,
        }
    }

    /// The shared fallback coverage used when a font's own can't be built.
    pub fn default_map(symbolic: bool) -> Rc<FontCharMap> {
        if symbolic {
            DEFAULT_SYMBOL_MAP.with(Rc::clone)
        } else {
            DEFAULT_UNICODE_MAP.with(Rc::clone)
        }
    }

    pub fn ranges(&self) -> &[CodeRange] {
        &self.ranges
    }

    pub fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    pub fn is_default_map(&self) -> bool {
        self.default_map
    }

    pub fn has_char(&self, ch: u32) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= ch);
        self.ranges.get(idx).is_some_and(|r| r.contains(ch))
    }

    pub fn char_count(&self) -> u32 {
        self.ranges.iter().map(CodeRange::len).sum()
    }
}

/// Collapse a set of code points into sorted `[start, end)` runs.
pub fn collapse_codepoints(mut codepoints: Vec<u32>) -> Vec<CodeRange> {
    codepoints.sort_unstable();
    codepoints.dedup();
    let mut ranges: Vec<CodeRange> = Vec::new();
    for cp in codepoints {
        match ranges.last_mut() {
            Some(last) if last.end == cp => last.end = cp + 1,
            _ => ranges.push(CodeRange::new(cp, cp + 1)),
        }
    }
    ranges
}

/// Coverage from a raw `cmap` table.
///
/// Unicode subtables win; a Windows symbol subtable (3,0) is used only when
/// no Unicode subtable yields anything, and marks the result symbolic.
pub fn parse_cmap(data: &[u8]) -> Option<FontCharMap> {
    let table = cmap::Table::parse(data)?;
    let mut unicode = Vec::new();
    let mut symbol = Vec::new();
    for subtable in table.subtables {
        if subtable.platform_id == PlatformId::Windows && subtable.encoding_id == 0 {
            subtable.codepoints(|cp| symbol.push(cp));
        } else if subtable.is_unicode() {
            subtable.codepoints(|cp| unicode.push(cp));
        }
    }
    unicode.retain(|&cp| cp != 0xFFFF);
    symbol.retain(|&cp| cp != 0xFFFF);

    if !unicode.is_empty() {
        Some(FontCharMap::new(collapse_codepoints(unicode), false))
    } else if !symbol.is_empty() {
        Some(FontCharMap::new(collapse_codepoints(symbol), true))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// cmap with one (platform, encoding) format 4 subtable mapping `chars`.
    fn cmap_format4(platform: u16, encoding: u16, chars: &[u16]) -> Vec<u8> {
        let mut segments: Vec<(u16, u16)> = chars.iter().map(|&c| (c, c)).collect();
        segments.push((0xFFFF, 0xFFFF));
        let seg_count = segments.len() as u16;

        let mut sub = Vec::new();
        sub.extend_from_slice(&4u16.to_be_bytes());
        sub.extend_from_slice(&(16 + 8 * seg_count).to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes());
        sub.extend_from_slice(&(seg_count * 2).to_be_bytes());
        sub.extend_from_slice(&[0u8; 6]);
        for (_, end) in &segments {
            sub.extend_from_slice(&end.to_be_bytes());
        }
        sub.extend_from_slice(&0u16.to_be_bytes());
        for (start, _) in &segments {
            sub.extend_from_slice(&start.to_be_bytes());
        }
        for (i, _) in segments.iter().enumerate() {
            // Map each char to glyph i + 1
            let delta = (i as u16 + 1).wrapping_sub(segments[i].0);
            sub.extend_from_slice(&delta.to_be_bytes());
        }
        for _ in &segments {
            sub.extend_from_slice(&0u16.to_be_bytes());
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&platform.to_be_bytes());
        out.extend_from_slice(&encoding.to_be_bytes());
        out.extend_from_slice(&12u32.to_be_bytes());
        out.extend_from_slice(&sub);
        out
    }

    #[test]
    fn test_collapse_codepoints() {
        let ranges = collapse_codepoints(vec![0x43, 0x41, 0x42, 0x42, 0x50, 0x10]);
        assert_eq!(
            ranges,
            vec![
                CodeRange::new(0x10, 0x11),
                CodeRange::new(0x41, 0x44),
                CodeRange::new(0x50, 0x51)
            ]
        );
        assert!(collapse_codepoints(Vec::new()).is_empty());
    }

    #[test]
    fn test_has_char_and_count() {
        let map = FontCharMap::new(
            vec![CodeRange::new(0x20, 0x80), CodeRange::new(0x100, 0x101)],
            false,
        );
        assert!(map.has_char(0x20));
        assert!(map.has_char(0x7F));
        assert!(!map.has_char(0x80));
        assert!(map.has_char(0x100));
        assert!(!map.has_char(0x1F));
        assert_eq!(map.char_count(), 0x61);
    }

    #[test]
    fn test_default_maps_are_shared() {
        let a = FontCharMap::default_map(false);
        let b = FontCharMap::default_map(false);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(a.is_default_map());
        assert!(FontCharMap::default_map(true).has_char(0xF041));
    }

    #[test]
    fn test_parse_cmap_unicode() {
        let data = cmap_format4(3, 1, &[0x41, 0x42, 0x44]);
        let map = parse_cmap(&data).unwrap();
        assert!(!map.is_symbolic());
        assert_eq!(
            map.ranges(),
            &[CodeRange::new(0x41, 0x43), CodeRange::new(0x44, 0x45)]
        );
    }

    #[test]
    fn test_parse_cmap_symbol() {
        let data = cmap_format4(3, 0, &[0xF041]);
        let map = parse_cmap(&data).unwrap();
        assert!(map.is_symbolic());
        assert_eq!(map.ranges(), &[CodeRange::new(0xF041, 0xF042)]);
    }

    #[test]
    fn test_parse_cmap_garbage() {
        assert!(parse_cmap(&[0, 0, 0, 5]).is_none());
    }
}
