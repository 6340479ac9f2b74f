//! Synthetic TrueType font builder.
//!
//! Produces small but complete `glyf`-flavoured fonts so tests don't depend
//! on font files installed on the machine. Every glyph is made of straight
//! on-curve contours.

use std::fs;
use std::path::{Path, PathBuf};

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;

/// Glyph id of the "L"-shaped glyph mapped from 'A'.
pub const GLYPH_A: u16 = 1;
pub const A_ADVANCE: u16 = 600;

/// One glyph: an advance and straight-line contours in font units (y up).
#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub advance: u16,
    pub contours: Vec<Vec<(i16, i16)>>,
}

impl TestGlyph {
    pub fn empty(advance: u16) -> Self {
        Self {
            advance,
            contours: Vec::new(),
        }
    }
}

/// A tall stem with a foot to the right; asymmetric under every rotation.
pub fn l_shape() -> TestGlyph {
    TestGlyph {
        advance: A_ADVANCE,
        contours: vec![vec![
            (100, 0),
            (100, 700),
            (300, 700),
            (300, 200),
            (600, 200),
            (600, 0),
        ]],
    }
}

/// A horizontal bar, used as a substitute glyph.
pub fn bar() -> TestGlyph {
    TestGlyph {
        advance: A_ADVANCE,
        contours: vec![vec![(100, 300), (100, 400), (500, 400), (500, 300)]],
    }
}

#[derive(Debug, Clone)]
pub struct TestFont {
    family: String,
    glyphs: Vec<TestGlyph>,
    cmap: Vec<(u32, u16)>,
    with_cmap: bool,
    symbol_cmap: bool,
    code_page_range: [u32; 2],
    extra_tables: Vec<([u8; 4], Vec<u8>)>,
}

impl Default for TestFont {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFont {
    /// `.notdef` plus the L glyph for 'A'.
    pub fn new() -> Self {
        Self {
            family: "Glyph Test".to_string(),
            glyphs: vec![TestGlyph::empty(500), l_shape()],
            cmap: vec![('A' as u32, GLYPH_A)],
            with_cmap: true,
            symbol_cmap: false,
            code_page_range: [1, 0],
            extra_tables: Vec::new(),
        }
    }

    pub fn family(mut self, name: &str) -> Self {
        self.family = name.to_string();
        self
    }

    /// Append a glyph, optionally mapped from `ch`. It gets the next glyph id.
    pub fn glyph(mut self, ch: Option<char>, glyph: TestGlyph) -> Self {
        let gid = self.glyphs.len() as u16;
        self.glyphs.push(glyph);
        if let Some(ch) = ch {
            self.cmap.push((ch as u32, gid));
        }
        self
    }

    /// Map an extra code point to an existing glyph.
    pub fn map(mut self, ch: u32, gid: u16) -> Self {
        self.cmap.push((ch, gid));
        self
    }

    pub fn without_cmap(mut self) -> Self {
        self.with_cmap = false;
        self
    }

    /// Emit the cmap as a Windows symbol (3,0) subtable.
    pub fn symbol_cmap(mut self) -> Self {
        self.symbol_cmap = true;
        self
    }

    pub fn code_page_range(mut self, range: [u32; 2]) -> Self {
        self.code_page_range = range;
        self
    }

    pub fn table(mut self, tag: &[u8; 4], data: Vec<u8>) -> Self {
        self.extra_tables.push((*tag, data));
        self
    }

    pub fn glyph_count(&self) -> u16 {
        self.glyphs.len() as u16
    }

    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"OS/2", self.os2()),
            (*b"glyf", glyf),
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"hmtx", self.hmtx()),
            (*b"loca", loca),
            (*b"maxp", self.maxp()),
            (*b"name", self.name()),
            (*b"post", post()),
        ];
        if self.with_cmap {
            tables.push((*b"cmap", self.cmap_table()));
        }
        tables.extend(self.extra_tables.iter().cloned());
        tables.sort_by(|a, b| a.0.cmp(&b.0));
        assemble(&tables)
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.build()).expect("write test font");
        path
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for glyph in &self.glyphs {
            u32_be(&mut loca, glyf.len() as u32);
            glyf.extend_from_slice(&encode_glyph(glyph));
        }
        u32_be(&mut loca, glyf.len() as u32);
        (glyf, loca)
    }

    fn head(&self) -> Vec<u8> {
        let mut t = Vec::new();
        u32_be(&mut t, 0x0001_0000);
        u32_be(&mut t, 0x0001_0000);
        u32_be(&mut t, 0);
        u32_be(&mut t, 0x5F0F_3CF5);
        u16_be(&mut t, 0x000B);
        u16_be(&mut t, UNITS_PER_EM);
        t.extend_from_slice(&[0; 16]);
        i16_be(&mut t, 0);
        i16_be(&mut t, DESCENDER);
        i16_be(&mut t, 1000);
        i16_be(&mut t, ASCENDER);
        u16_be(&mut t, 0);
        u16_be(&mut t, 8);
        i16_be(&mut t, 2);
        i16_be(&mut t, 1); // long loca
        i16_be(&mut t, 0);
        t
    }

    fn hhea(&self) -> Vec<u8> {
        let max_advance = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let mut t = Vec::new();
        u32_be(&mut t, 0x0001_0000);
        i16_be(&mut t, ASCENDER);
        i16_be(&mut t, DESCENDER);
        i16_be(&mut t, 0);
        u16_be(&mut t, max_advance);
        t.extend_from_slice(&[0; 6]);
        i16_be(&mut t, 1);
        t.extend_from_slice(&[0; 14]);
        u16_be(&mut t, self.glyph_count());
        t
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut t = Vec::new();
        for glyph in &self.glyphs {
            u16_be(&mut t, glyph.advance);
            let lsb = glyph
                .contours
                .iter()
                .flatten()
                .map(|p| p.0)
                .min()
                .unwrap_or(0);
            i16_be(&mut t, lsb);
        }
        t
    }

    fn maxp(&self) -> Vec<u8> {
        let points = self
            .glyphs
            .iter()
            .map(|g| g.contours.iter().map(Vec::len).sum::<usize>())
            .max()
            .unwrap_or(0);
        let contours = self.glyphs.iter().map(|g| g.contours.len()).max().unwrap_or(0);
        let mut t = Vec::new();
        u32_be(&mut t, 0x0001_0000);
        u16_be(&mut t, self.glyph_count());
        u16_be(&mut t, points as u16);
        u16_be(&mut t, contours as u16);
        u16_be(&mut t, 0);
        u16_be(&mut t, 0);
        u16_be(&mut t, 2);
        t.extend_from_slice(&[0; 16]);
        t
    }

    fn os2(&self) -> Vec<u8> {
        let mut t = Vec::new();
        u16_be(&mut t, 4);
        i16_be(&mut t, 500);
        u16_be(&mut t, 400);
        u16_be(&mut t, 5);
        u16_be(&mut t, 0);
        t.extend_from_slice(&[0; 20]);
        i16_be(&mut t, 0); // sFamilyClass
        t.extend_from_slice(&[2, 11, 6, 3, 0, 0, 0, 0, 0, 0]); // panose: swiss, variable
        t.extend_from_slice(&[0; 16]);
        t.extend_from_slice(b"TEST");
        u16_be(&mut t, 0x0040);
        u16_be(&mut t, 0x20);
        u16_be(&mut t, 0x7E);
        i16_be(&mut t, ASCENDER);
        i16_be(&mut t, DESCENDER);
        i16_be(&mut t, 0);
        u16_be(&mut t, ASCENDER as u16);
        u16_be(&mut t, (-DESCENDER) as u16);
        u32_be(&mut t, self.code_page_range[0]);
        u32_be(&mut t, self.code_page_range[1]);
        t.extend_from_slice(&[0; 10]);
        t
    }

    fn name(&self) -> Vec<u8> {
        let records = [
            (1u16, self.family.clone()),
            (2, "Regular".to_string()),
            (4, format!("{} Regular", self.family)),
            (6, self.family.replace(' ', "")),
        ];
        let mut strings = Vec::new();
        let mut t = Vec::new();
        u16_be(&mut t, 0);
        u16_be(&mut t, records.len() as u16);
        u16_be(&mut t, (6 + 12 * records.len()) as u16);
        for (name_id, value) in &records {
            let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
            u16_be(&mut t, 3);
            u16_be(&mut t, 1);
            u16_be(&mut t, 0x0409);
            u16_be(&mut t, *name_id);
            u16_be(&mut t, encoded.len() as u16);
            u16_be(&mut t, strings.len() as u16);
            strings.extend_from_slice(&encoded);
        }
        t.extend_from_slice(&strings);
        t
    }

    fn cmap_table(&self) -> Vec<u8> {
        let mut segments: Vec<(u16, u16)> = self
            .cmap
            .iter()
            .filter(|(ch, _)| *ch < 0xFFFF)
            .map(|&(ch, gid)| (ch as u16, gid))
            .collect();
        segments.sort_unstable();
        segments.push((0xFFFF, 0));

        let seg_count = segments.len() as u16;
        let entry_selector = 15 - seg_count.leading_zeros() as u16;
        let search_range = 2 * (1u16 << entry_selector);

        let mut sub = Vec::new();
        u16_be(&mut sub, 4);
        u16_be(&mut sub, 16 + 8 * seg_count);
        u16_be(&mut sub, 0);
        u16_be(&mut sub, seg_count * 2);
        u16_be(&mut sub, search_range);
        u16_be(&mut sub, entry_selector);
        u16_be(&mut sub, seg_count * 2 - search_range);
        for (ch, _) in &segments {
            u16_be(&mut sub, *ch);
        }
        u16_be(&mut sub, 0);
        for (ch, _) in &segments {
            u16_be(&mut sub, *ch);
        }
        for &(ch, gid) in &segments {
            let delta = if ch == 0xFFFF { 1 } else { gid.wrapping_sub(ch) };
            u16_be(&mut sub, delta);
        }
        for _ in &segments {
            u16_be(&mut sub, 0);
        }

        let (platform, encoding) = if self.symbol_cmap { (3, 0) } else { (3, 1) };
        let mut t = Vec::new();
        u16_be(&mut t, 0);
        u16_be(&mut t, 1);
        u16_be(&mut t, platform);
        u16_be(&mut t, encoding);
        u32_be(&mut t, 12);
        t.extend_from_slice(&sub);
        t
    }
}

/// A GSUB table whose only feature is a required `vert` feature made of one
/// single substitution (format 2, coverage format 1).
pub fn vert_gsub(pairs: &[(u16, u16)]) -> Vec<u8> {
    let mut pairs = pairs.to_vec();
    pairs.sort_unstable();

    let mut script_list = Vec::new();
    u16_be(&mut script_list, 1);
    script_list.extend_from_slice(b"kana");
    u16_be(&mut script_list, 8);
    u16_be(&mut script_list, 4); // default langsys
    u16_be(&mut script_list, 0);
    u16_be(&mut script_list, 0);
    u16_be(&mut script_list, 0); // required feature index
    u16_be(&mut script_list, 0);

    let mut feature_list = Vec::new();
    u16_be(&mut feature_list, 1);
    feature_list.extend_from_slice(b"vert");
    u16_be(&mut feature_list, 8);
    u16_be(&mut feature_list, 0);
    u16_be(&mut feature_list, 1);
    u16_be(&mut feature_list, 0);

    let mut subtable = Vec::new();
    u16_be(&mut subtable, 2);
    u16_be(&mut subtable, (6 + 2 * pairs.len()) as u16);
    u16_be(&mut subtable, pairs.len() as u16);
    for (_, to) in &pairs {
        u16_be(&mut subtable, *to);
    }
    u16_be(&mut subtable, 1);
    u16_be(&mut subtable, pairs.len() as u16);
    for (from, _) in &pairs {
        u16_be(&mut subtable, *from);
    }

    let mut lookup_list = Vec::new();
    u16_be(&mut lookup_list, 1);
    u16_be(&mut lookup_list, 4);
    u16_be(&mut lookup_list, 1);
    u16_be(&mut lookup_list, 0);
    u16_be(&mut lookup_list, 1);
    u16_be(&mut lookup_list, 8);
    lookup_list.extend_from_slice(&subtable);

    let script_ofs = 10u16;
    let feature_ofs = script_ofs + script_list.len() as u16;
    let lookup_ofs = feature_ofs + feature_list.len() as u16;
    let mut t = Vec::new();
    u16_be(&mut t, 1);
    u16_be(&mut t, 0);
    u16_be(&mut t, script_ofs);
    u16_be(&mut t, feature_ofs);
    u16_be(&mut t, lookup_ofs);
    t.extend_from_slice(&script_list);
    t.extend_from_slice(&feature_list);
    t.extend_from_slice(&lookup_list);
    t
}

fn post() -> Vec<u8> {
    let mut t = Vec::new();
    u32_be(&mut t, 0x0003_0000);
    u32_be(&mut t, 0);
    i16_be(&mut t, -100);
    i16_be(&mut t, 50);
    t.extend_from_slice(&[0; 20]);
    t
}

fn encode_glyph(glyph: &TestGlyph) -> Vec<u8> {
    if glyph.contours.is_empty() {
        return Vec::new();
    }
    let points: Vec<(i16, i16)> = glyph.contours.iter().flatten().copied().collect();
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);

    let mut t = Vec::new();
    i16_be(&mut t, glyph.contours.len() as i16);
    i16_be(&mut t, x_min);
    i16_be(&mut t, y_min);
    i16_be(&mut t, x_max);
    i16_be(&mut t, y_max);
    let mut end = 0u16;
    for contour in &glyph.contours {
        end += contour.len() as u16;
        u16_be(&mut t, end - 1);
    }
    u16_be(&mut t, 0); // no instructions
    t.extend(std::iter::repeat_n(0x01u8, points.len())); // on-curve, 16-bit deltas
    let mut prev = 0i16;
    for &(x, _) in &points {
        i16_be(&mut t, x - prev);
        prev = x;
    }
    prev = 0;
    for &(_, y) in &points {
        i16_be(&mut t, y - prev);
        prev = y;
    }
    while t.len() % 4 != 0 {
        t.push(0);
    }
    t
}

fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let count = tables.len() as u16;
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = 16 * (1u16 << entry_selector);

    let mut out = Vec::new();
    u32_be(&mut out, 0x0001_0000);
    u16_be(&mut out, count);
    u16_be(&mut out, search_range);
    u16_be(&mut out, entry_selector);
    u16_be(&mut out, count * 16 - search_range);

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in tables {
        out.extend_from_slice(tag);
        u32_be(&mut out, checksum(data));
        u32_be(&mut out, offset as u32);
        u32_be(&mut out, data.len() as u32);
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend_from_slice(&body);
    // Table lookups refuse files under 1 KiB.
    if out.len() < 1024 {
        out.resize(1024, 0);
    }
    out
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn u16_be(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn i16_be(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn u32_be(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
