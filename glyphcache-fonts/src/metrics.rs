//! Font-wide metrics with table fallbacks.

use crate::attributes::{DevFontAttributes, FamilyType, Pitch};
use crate::sfnt::{HheaMetrics, Os2Table};

/// Which source the vertical line metrics came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// The rasterizer's own scaled metrics
    Scaler,
    Hhea,
    Os2Typo,
    Os2Win,
    /// No scaler metrics and no usable table; a synthetic split of the em box
    EmBox,
}

/// Ascent, descent and line gap in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub ext_leading: i32,
    pub source: MetricSource,
}

impl LineMetrics {
    fn is_usable(&self) -> bool {
        self.ascent != 0 || self.descent != 0
    }
}

/// Scaled metrics as reported by the rasterizer, in pixels.
///
/// `descent` is positive below the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaledMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub leading: f32,
}

fn round_px(units: f64, scale: f64) -> i32 {
    (units * scale + 0.5).floor() as i32
}

/// Pick line metrics from the first source that yields a non-zero box.
///
/// Order: scaler metrics, `hhea`, OS/2 typo (or win when typo is zero).
/// When none of them yields a box the scaler metrics are taken as they are,
/// and only without those is the em box split 4:1. `scale` is pixels per
/// font unit.
pub fn line_metrics(
    scaled: Option<ScaledMetrics>,
    hhea: Option<&HheaMetrics>,
    os2: Option<&Os2Table>,
    scale: f64,
    pixel_height: u32,
) -> LineMetrics {
    let from_scaler = scaled.map(|m| {
        let ascent = m.ascent.round() as i32;
        let descent = m.descent.round() as i32;
        let height = (m.ascent + m.descent + m.leading).round() as i32;
        LineMetrics {
            ascent,
            descent,
            ext_leading: height - (ascent + descent),
            source: MetricSource::Scaler,
        }
    });
    if let Some(candidate) = from_scaler.filter(LineMetrics::is_usable) {
        return candidate;
    }

    if let Some(h) = hhea {
        let candidate = LineMetrics {
            ascent: round_px(h.ascender as f64, scale),
            descent: round_px(-(h.descender as f64), scale),
            ext_leading: round_px(h.line_gap as f64, scale),
            source: MetricSource::Hhea,
        };
        if candidate.is_usable() {
            return candidate;
        }
    }

    if let Some(os2) = os2.filter(|t| t.version != 0xFFFF) {
        let candidate = if os2.typo_ascender != 0 || os2.typo_descender != 0 {
            LineMetrics {
                ascent: round_px(os2.typo_ascender as f64, scale),
                descent: round_px(-(os2.typo_descender as f64), scale),
                ext_leading: round_px(os2.typo_line_gap as f64, scale),
                source: MetricSource::Os2Typo,
            }
        } else {
            LineMetrics {
                ascent: round_px(os2.win_ascent as f64, scale),
                descent: round_px(os2.win_descent as f64, scale),
                ext_leading: 0,
                source: MetricSource::Os2Win,
            }
        };
        if candidate.is_usable() {
            return candidate;
        }
    }

    if let Some(candidate) = from_scaler {
        return candidate;
    }

    let ascent = (pixel_height * 4).div_ceil(5) as i32;
    LineMetrics {
        ascent,
        descent: pixel_height as i32 - ascent,
        ext_leading: 0,
        source: MetricSource::EmBox,
    }
}

/// Family classification from PANOSE byte 0.
pub fn panose_family(panose: &[u8; 10]) -> FamilyType {
    match panose[0] {
        1 => FamilyType::Roman,
        2 => FamilyType::Swiss,
        3 => FamilyType::Modern,
        4 => FamilyType::Script,
        5 => FamilyType::Decorative,
        _ => FamilyType::DontKnow,
    }
}

/// Pitch from PANOSE byte 3 (proportion).
pub fn panose_pitch(panose: &[u8; 10]) -> Pitch {
    match panose[3] {
        2..=8 => Pitch::Variable,
        9 => Pitch::Fixed,
        _ => Pitch::DontKnow,
    }
}

/// Complete metrics of a sized font instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontMetric {
    pub attributes: DevFontAttributes,
    pub ascent: i32,
    pub descent: i32,
    pub int_leading: i32,
    pub ext_leading: i32,
    /// Width in pixels; the pixel height when none was requested
    pub width: u32,
    /// Orientation in tenths of a degree
    pub orientation: i32,
    /// Advance of U+0640 ARABIC TATWEEL, 0 if absent
    pub min_kashida: i32,
    pub kernable: bool,
    pub scalable: bool,
}

impl FontMetric {
    /// Fill ascent, descent and leadings from `line`.
    ///
    /// Internal leading is what the line box adds on top of the em height.
    pub fn set_line_metrics(&mut self, line: LineMetrics, em_pixels: i32) {
        self.ascent = line.ascent;
        self.descent = line.descent;
        self.ext_leading = line.ext_leading;
        self.int_leading = line.ascent + line.descent - em_pixels;
    }

    /// Override family type and pitch from PANOSE when an OS/2 table exists.
    pub fn apply_panose(&mut self, os2: &Os2Table) {
        if os2.version == 0xFFFF {
            return;
        }
        self.attributes.family_type = panose_family(&os2.panose);
        self.attributes.pitch = panose_pitch(&os2.panose);
    }
}
