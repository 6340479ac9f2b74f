//! Sized, styled rendering instances of a registered face.
//!
//! A [`ServerFont`] owns one face reference for its whole life. Construction
//! never fails outright: an instance whose setup went wrong reports
//! [`ServerFont::is_valid`] as false and every rendering call on it yields
//! an empty result.

mod native;
mod render;

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::fmt;
use std::rc::Rc;

use glyphcache_config::{AutoHint, FontOptions, HintStyle, RenderPriorities};
use rustybuzz::ttf_parser::{self, PlatformId, cmap};
use swash::scale::ScaleContext;

use crate::attributes::Weight;
use crate::bitmap::rotate_placement;
use crate::font_info::{FontInfo, TAG_CMAP};
use crate::glyph::{GlyphData, GlyphFlags, GlyphId, GlyphRotation};
use crate::gsub::{FEATURE_VERT, GlyphSubstitution, GsubRequest, parse_single_substitutions, script_tags};
use crate::metrics::{FontMetric, ScaledMetrics, line_metrics};
use crate::pattern::FontSelectPattern;
use crate::sfnt::{HheaMetrics, Os2Table, TAG_GPOS, TAG_GSUB, TAG_HHEA, TAG_KERN, TAG_OS2, Tag};
use crate::vertical::{vertical_char, vertical_flags};

pub use native::{
    AlphaImage, CBox, GlyphImage, LoadFlags, Matrix, NativeGlyph, NativeOutline, Segment,
    SizeRequest, mul_fix,
};

/// Stretch factors beyond this overflow the 16.16 transform math.
const MAX_STRETCH: f64 = 64.0;

/// Code page bits for Thai, Japanese, both Chinese and both Korean sets.
const CODEPAGE_RANGE1_CJKT: u32 = 0x3F_0000;

/// Emboldened CJK text below this pixel height gets the contrast curve.
const GAMMA_MAX_HEIGHT: u32 = 20;

const KASHIDA: u32 = 0x0640;

/// Construction progress of a [`ServerFont`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontState {
    Uninitialized,
    FaceAcquired,
    SizeConfigured,
    ScriptTablesApplied,
    Ready,
    Failed,
}

/// Line metrics of the sized face in 26.6, descender negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeMetrics {
    pub ascender: i64,
    pub descender: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharmapKind {
    Unicode,
    /// Windows symbol subtable (3,0)
    Symbol,
}

/// Outcome of [`ServerFont::apply_glyph_transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphTransform {
    /// Rotation still to be applied to the raster, in tenths of a degree
    pub angle: i32,
    /// The rotation/stretch matrix was applied to the outline
    pub matrix_applied: bool,
}

/// OpenType coverage information of the face.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontCapabilities {
    pub gsub_script_tags: Option<Vec<Tag>>,
    pub unicode_range: Option<[u32; 4]>,
    pub code_page_range: Option<[u32; 2]>,
}

pub struct ServerFont {
    pattern: FontSelectPattern,
    info: Rc<FontInfo>,
    state: FontState,
    face_acquired: bool,
    width: u32,
    stretch: f64,
    cos: i64,
    sin: i64,
    size: Option<SizeRequest>,
    size_metrics: SizeMetrics,
    charmap: CharmapKind,
    priorities: RenderPriorities,
    font_options: Option<FontOptions>,
    load_flags: LoadFlags,
    substitutions: GlyphSubstitution,
    art_bold: bool,
    art_italic: bool,
    use_gamma: bool,
    scale_context: RefCell<ScaleContext>,
}

impl fmt::Debug for ServerFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerFont")
            .field("font_id", &self.info.font_id())
            .field("height", &self.pattern.height)
            .field("width", &self.width)
            .field("orientation", &self.pattern.orientation)
            .field("state", &self.state)
            .field("load_flags", &self.load_flags)
            .finish()
    }
}

impl Drop for ServerFont {
    fn drop(&mut self) {
        if self.face_acquired {
            self.info.release_face();
        }
    }
}

impl ServerFont {
    /// Build an instance of `info` for `pattern`.
    ///
    /// Check [`is_valid`](Self::is_valid) before relying on the result.
    pub fn new(pattern: FontSelectPattern, info: Rc<FontInfo>, priorities: RenderPriorities) -> Self {
        let mut font = Self {
            pattern,
            info,
            state: FontState::Uninitialized,
            face_acquired: false,
            width: 0,
            stretch: 1.0,
            cos: 0x10000,
            sin: 0,
            size: None,
            size_metrics: SizeMetrics::default(),
            charmap: CharmapKind::Unicode,
            priorities,
            font_options: None,
            load_flags: LoadFlags::empty(),
            substitutions: GlyphSubstitution::new(),
            art_bold: false,
            art_italic: false,
            use_gamma: false,
            scale_context: RefCell::new(ScaleContext::new()),
        };
        if !font.construct() {
            log::warn!(
                "Font instance for font {} at {}px failed in state {:?}",
                font.info.font_id(),
                font.pattern.height,
                font.state
            );
            font.state = FontState::Failed;
        }
        font
    }

    fn construct(&mut self) -> bool {
        let orientation = self.pattern.orientation;
        if orientation != 0 {
            let rad = orientation as f64 * (TAU / 3600.0);
            self.cos = (65536.0 * rad.cos()).round() as i64;
            self.sin = (65536.0 * rad.sin()).round() as i64;
        }

        let height = self.pattern.height;
        self.width = if self.pattern.width == 0 {
            height
        } else {
            self.pattern.width
        };
        if height == 0 {
            return false;
        }
        self.stretch = self.width as f64 / height as f64;
        if self.stretch.abs() > MAX_STRETCH {
            return false;
        }

        self.face_acquired = true;
        if !self.info.acquire_face() {
            return false;
        }
        self.state = FontState::FaceAcquired;

        let Some((request, metrics)) = self.configure_size() else {
            return false;
        };
        self.size = Some(request);
        self.size_metrics = metrics;
        self.state = FontState::SizeConfigured;

        if self.info.is_symbol() && self.with_symbol_subtable(|_| ()).is_some() {
            self.charmap = CharmapKind::Symbol;
        }

        self.apply_gsub();

        let face = self.info.attributes();
        self.art_italic = self.pattern.slant.is_slanted() && !face.slant.is_slanted();
        self.art_bold = self.pattern.weight > Weight::MEDIUM && face.weight <= Weight::MEDIUM;
        if self.art_bold {
            let cjk = self
                .os2()
                .and_then(|os2| os2.code_page_range)
                .is_some_and(|range| range[0] & CODEPAGE_RANGE1_CJKT != 0);
            self.use_gamma = cjk && height < GAMMA_MAX_HEIGHT;
        }

        if (self.cos != 0 && self.sin != 0) || self.priorities.embedded_bitmap <= 0 {
            self.load_flags |= LoadFlags::NO_BITMAP;
        }
        self.state = FontState::Ready;
        true
    }

    fn configure_size(&self) -> Option<(SizeRequest, SizeMetrics)> {
        let size = self.pattern.height as f32;
        let glyph_count = self.info.glyph_count();
        let scaled = self
            .info
            .with_face(|font| font.metrics(&[]).scale(size))?;
        if glyph_count == 0 || self.info.units_per_em() == 0 {
            return None;
        }
        let ascender = (scaled.ascent.abs() * 64.0).ceil() as i64;
        let descender = -(scaled.descent.abs() * 64.0).ceil() as i64;
        let height = ((scaled.ascent.abs() + scaled.descent.abs() + scaled.leading) * 64.0).round() as i64;
        let metrics = SizeMetrics {
            ascender: (ascender + 63) & !63,
            descender: descender & !63,
            height: (height + 32) & !63,
        };
        let request = SizeRequest {
            size,
            x_scale: self.stretch as f32,
            glyph_count,
        };
        Some((request, metrics))
    }

    fn apply_gsub(&mut self) {
        if !self.pattern.vertical {
            return;
        }
        let Some(table) = self.info.get_table(TAG_GSUB) else {
            return;
        };
        let features = [FEATURE_VERT];
        let request = GsubRequest {
            features: &features,
            script: self.pattern.script,
            language: self.pattern.language,
            glyph_count: self.info.glyph_count(),
        };
        self.substitutions = parse_single_substitutions(&table, &request);
        log::debug!(
            "Font {}: {} vertical substitutions",
            self.info.font_id(),
            self.substitutions.len()
        );
        self.state = FontState::ScriptTablesApplied;
    }

    /// Apply session font options to the load flags and priorities.
    pub fn set_font_options(&mut self, options: &FontOptions) {
        self.font_options = Some(*options);

        let auto_hint = match options.auto_hint {
            AutoHint::DontKnow if self.use_gamma => AutoHint::Yes,
            AutoHint::DontKnow => AutoHint::No,
            other => other,
        };
        if auto_hint == AutoHint::Yes {
            self.load_flags |= LoadFlags::FORCE_AUTOHINT;
        }

        // Hinting only for 0/90/180/270 degrees
        if self.sin != 0 && self.cos != 0 {
            self.load_flags |= LoadFlags::NO_HINTING;
        }

        options.restrict(&mut self.priorities);
        if self.priorities.auto_hint <= 0 {
            self.load_flags |= LoadFlags::NO_HINTING;
        }

        if !self.load_flags.contains(LoadFlags::NO_HINTING) {
            match options.hint_style {
                HintStyle::None => self.load_flags |= LoadFlags::NO_HINTING,
                HintStyle::Slight => self.load_flags |= LoadFlags::TARGET_LIGHT,
                HintStyle::Medium | HintStyle::Full => {}
            }
        }

        if self.priorities.embedded_bitmap <= 0 {
            self.load_flags |= LoadFlags::NO_BITMAP;
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_valid(&self) -> bool {
        self.state == FontState::Ready
    }

    pub fn state(&self) -> FontState {
        self.state
    }

    pub fn pattern(&self) -> &FontSelectPattern {
        &self.pattern
    }

    pub fn font_info(&self) -> &Rc<FontInfo> {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn stretch(&self) -> f64 {
        self.stretch
    }

    /// Rotation cosine and sine in 16.16.
    pub fn cos_sin(&self) -> (i64, i64) {
        (self.cos, self.sin)
    }

    pub fn size_metrics(&self) -> SizeMetrics {
        self.size_metrics
    }

    pub fn load_flags(&self) -> LoadFlags {
        self.load_flags
    }

    pub fn priorities(&self) -> RenderPriorities {
        self.priorities
    }

    pub fn font_options(&self) -> Option<&FontOptions> {
        self.font_options.as_ref()
    }

    pub fn substitutions(&self) -> &GlyphSubstitution {
        &self.substitutions
    }

    pub fn is_art_bold(&self) -> bool {
        self.art_bold
    }

    pub fn is_art_italic(&self) -> bool {
        self.art_italic
    }

    pub fn uses_gamma(&self) -> bool {
        self.use_gamma
    }

    pub fn antialias_advice(&self) -> bool {
        !self.pattern.non_antialiased && self.priorities.anti_alias > 0
    }

    fn os2(&self) -> Option<Os2Table> {
        self.info.get_table(TAG_OS2).and_then(|t| Os2Table::parse(&t))
    }

    // ========================================================================
    // Glyph lookup
    // ========================================================================

    fn with_symbol_subtable<R>(&self, f: impl FnOnce(cmap::Subtable<'_>) -> R) -> Option<R> {
        let table = self.info.get_table(TAG_CMAP)?;
        let cmap = cmap::Table::parse(&table)?;
        let subtable = cmap
            .subtables
            .into_iter()
            .find(|s| s.platform_id == PlatformId::Windows && s.encoding_id == 0)?;
        Some(f(subtable))
    }

    fn variant_glyph(&self, ch: u32, selector: u32) -> Option<u16> {
        let bytes = self.info.file().buffer()?;
        let face = ttf_parser::Face::parse(&bytes, self.info.face_index()).ok()?;
        let glyph = face.glyph_variation_index(char::from_u32(ch)?, char::from_u32(selector)?)?;
        Some(glyph.0)
    }

    /// Glyph index for `ch`, trying the variation `selector` first when it
    /// is non-zero.
    pub fn raw_glyph_index(&self, ch: u32, selector: u32) -> u32 {
        if !self.is_valid() {
            return 0;
        }
        if selector != 0
            && let Some(glyph) = self.variant_glyph(ch, selector).filter(|&g| g != 0)
        {
            return glyph as u32;
        }
        let glyph = match self.charmap {
            CharmapKind::Unicode => self.info.glyph_index(ch),
            CharmapKind::Symbol => self.info.glyph_index_with(ch, |c| {
                self.with_symbol_subtable(|sub| sub.glyph_index(c))
                    .flatten()
                    .map_or(0, |g| g.0)
            }),
        };
        glyph as u32
    }

    /// Apply vertical-writing substitutions and rotation flags.
    pub fn fixup_glyph_index(&self, glyph: u32, ch: u32) -> GlyphId {
        let mut index = glyph;
        let mut flags = GlyphFlags::empty();

        if self.pattern.vertical {
            let substitute = u16::try_from(glyph)
                .ok()
                .and_then(|g| self.substitutions.get(&g));
            match substitute {
                Some(&sub) => {
                    index = sub as u32;
                    flags |= GlyphFlags::GSUB | GlyphFlags::ROTATE_LEFT;
                }
                None => {
                    let alternate = vertical_char(ch).map_or(0, |v| self.raw_glyph_index(v, 0));
                    if alternate != 0 {
                        index = alternate;
                        flags |= GlyphFlags::GSUB | GlyphFlags::ROTATE_LEFT;
                    } else {
                        flags |= vertical_flags(ch);
                    }
                }
            }
        }

        if index == 0 {
            GlyphId::NOTDEF
        } else {
            GlyphId::with_flags(index, flags)
        }
    }

    pub fn glyph_index(&self, ch: u32) -> GlyphId {
        let raw = self.raw_glyph_index(ch, 0);
        self.fixup_glyph_index(raw, ch)
    }

    /// Separate the rendering flags, resolving code point glyphs.
    pub fn split_glyph_flags(&self, glyph: GlyphId) -> (u32, GlyphFlags) {
        let flags = glyph.flags - GlyphFlags::IS_CHAR;
        let index = if glyph.flags.contains(GlyphFlags::IS_CHAR) {
            self.raw_glyph_index(glyph.index, 0)
        } else {
            glyph.index
        };
        (index, flags)
    }

    // ========================================================================
    // Loading and transforms
    // ========================================================================

    /// Load a glyph at this instance's size, emboldening if needed.
    pub fn load_glyph(&self, index: u32, flags: LoadFlags) -> Option<NativeGlyph> {
        let request = self.size.filter(|_| self.is_valid())?;
        let glyph_id = u16::try_from(index).ok()?;
        let mut context = self.scale_context.borrow_mut();
        self.info
            .with_face(|font| {
                native::load_glyph(&mut context, font, glyph_id, request, flags, self.art_bold)
            })
            .flatten()
    }

    /// Move and rotate a loaded glyph for its flags and the orientation.
    ///
    /// Right-angle rotations of unstretched glyphs are left to the raster
    /// and come back in the returned angle.
    pub fn apply_glyph_transform(
        &self,
        flags: GlyphFlags,
        glyph: &mut NativeGlyph,
        for_bitmap: bool,
    ) -> GlyphTransform {
        let mut angle = self.pattern.orientation;
        if angle == 0 && flags.is_empty() {
            return GlyphTransform {
                angle,
                matrix_applied: false,
            };
        }

        let metrics = self.size_metrics;
        let stretch = self.stretch;
        let (cos, sin) = (self.cos as f64, self.sin as f64);
        let mut stretched = false;

        let (vector, matrix) = match flags.rotation() {
            GlyphRotation::None => (
                (0, 0),
                Matrix {
                    xx: self.cos,
                    xy: -self.sin,
                    yx: self.sin,
                    yy: self.cos,
                },
            ),
            GlyphRotation::Left => {
                angle += 900;
                stretched = stretch != 1.0;
                (
                    (
                        (metrics.descender as f64 * stretch) as i64,
                        -metrics.ascender,
                    ),
                    Matrix {
                        xx: (-sin / stretch) as i64,
                        xy: (-cos * stretch) as i64,
                        yx: (cos / stretch) as i64,
                        yy: (-sin * stretch) as i64,
                    },
                )
            }
            GlyphRotation::Right => {
                angle -= 900;
                stretched = stretch != 1.0;
                let descender = metrics.descender as f64;
                (
                    (
                        -glyph.hori_advance + (descender * sin / 65536.0) as i64,
                        (-descender * stretch * cos / 65536.0) as i64,
                    ),
                    Matrix {
                        xx: (sin / stretch) as i64,
                        xy: (cos * stretch) as i64,
                        yx: (-cos / stretch) as i64,
                        yy: (sin * stretch) as i64,
                    },
                )
            }
        };

        if angle < 0 {
            angle = angle.rem_euclid(3600);
        }

        let mut matrix_applied = false;
        match &mut glyph.image {
            GlyphImage::Outline(outline) => {
                outline.translate(vector.0, vector.1);
                if stretched || (for_bitmap && angle % 900 != 0) {
                    matrix_applied = true;
                }
            }
            GlyphImage::Bitmap(bitmap) => {
                bitmap.left += ((vector.0 + 32) >> 6) as i32;
                bitmap.top += ((vector.1 + 32) >> 6) as i32;
            }
        }
        if matrix_applied {
            glyph.transform(&matrix);
            angle = 0;
        }

        GlyphTransform {
            angle,
            matrix_applied,
        }
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    /// Advance, ink offset and ink size of one glyph in device pixels.
    ///
    /// The offset and size describe the raster [`glyph_bitmap1`] and
    /// [`glyph_bitmap8`] produce, right-angle rotation included.
    ///
    /// [`glyph_bitmap1`]: Self::glyph_bitmap1
    /// [`glyph_bitmap8`]: Self::glyph_bitmap8
    pub fn init_glyph_data(&self, glyph: GlyphId) -> GlyphData {
        let (_, flags) = self.split_glyph_flags(glyph);
        let Some((native, angle)) = self.load_for_raster(glyph, self.load_flags) else {
            return GlyphData::default();
        };

        let char_width = if native.zero_width {
            0
        } else if flags.is_rotated() {
            let metrics = self.size_metrics;
            let width = ((metrics.height + metrics.descender) as f64 * self.stretch) as i64;
            ((width + 32) >> 6) as i32
        } else {
            ((native.hori_advance + 32) >> 6) as i32
        };

        let delta = (
            ((native.advance.0 + 0x8000) >> 16) as i32,
            -(((native.advance.1 + 0x8000) >> 16) as i32),
        );

        let mut cbox = native.image.cbox().to_pixels();
        if cbox.y_min > cbox.y_max {
            std::mem::swap(&mut cbox.y_min, &mut cbox.y_max);
        }

        let extent = (
            (cbox.x_max - cbox.x_min).max(0) as u32,
            (cbox.y_max - cbox.y_min).max(0) as u32,
        );
        let offset = rotate_placement((cbox.x_min as i32, -cbox.y_max as i32), extent, angle);
        let (width, height) = if angle.rem_euclid(1800) == 900 {
            (extent.1, extent.0)
        } else {
            extent
        };
        GlyphData {
            char_width,
            delta,
            offset,
            size: (width as i32 + 1, height as i32),
        }
    }

    /// Line metrics and classification of the sized face.
    pub fn fetch_font_metric(&self) -> FontMetric {
        let mut metric = FontMetric {
            attributes: self.info.attributes().clone(),
            scalable: true,
            orientation: self.pattern.orientation,
            width: self.width,
            ..FontMetric::default()
        };
        if !self.is_valid() {
            return metric;
        }

        metric.kernable =
            self.info.get_table(TAG_KERN).is_some() || self.info.get_table(TAG_GPOS).is_some();

        let height = self.pattern.height;
        let scale = height as f64 / self.info.units_per_em() as f64;
        let m = self.size_metrics;
        let scaled = ScaledMetrics {
            ascent: m.ascender as f32 / 64.0,
            descent: -m.descender as f32 / 64.0,
            leading: (m.height - m.ascender + m.descender) as f32 / 64.0,
        };
        let hhea = self.info.get_table(TAG_HHEA).and_then(|t| HheaMetrics::parse(&t));
        let os2 = self.os2();
        let line = line_metrics(Some(scaled), hhea.as_ref(), os2.as_ref(), scale, height);
        let em_pixels = (self.info.units_per_em() as f64 * scale + 0.5).floor() as i32;
        metric.set_line_metrics(line, em_pixels);

        if let Some(os2) = &os2 {
            metric.apply_panose(os2);
        }

        let kashida = self.raw_glyph_index(KASHIDA, 0);
        if kashida != 0 {
            metric.min_kashida = self.init_glyph_data(GlyphId::new(kashida)).char_width;
        }
        metric
    }

    /// GSUB scripts and OS/2 coverage bits.
    pub fn font_capabilities(&self) -> FontCapabilities {
        let mut caps = FontCapabilities {
            gsub_script_tags: self.info.get_table(TAG_GSUB).map(|t| script_tags(&t)),
            ..FontCapabilities::default()
        };
        if let Some(os2) = self.os2() {
            caps.unicode_range = Some(os2.unicode_range);
            caps.code_page_range = os2.code_page_range;
        }
        caps
    }
}
