//! Loaded glyphs in the form the instance transforms work on.
//!
//! swash scales outlines to float pixels. They are converted here into
//! 26.6 fixed point so rotation, stretch and italic matrices run in the
//! same 16.16 arithmetic for every glyph, and handed back to zeno only for
//! rasterization.

use bitflags::bitflags;
use swash::FontRef;
use swash::scale::image::{Content, Image};
use swash::scale::{ScaleContext, StrikeWith};
use swash::zeno::{Command, Format, Mask, Origin, PathData, Vector};

use crate::outline::{FixedPoint, OutlineSink};

bitflags! {
    /// How a glyph is loaded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LoadFlags: u8 {
        const NO_HINTING = 1 << 0;
        /// Skip embedded bitmap strikes
        const NO_BITMAP = 1 << 1;
        const FORCE_AUTOHINT = 1 << 2;
        const TARGET_LIGHT = 1 << 3;
        const TARGET_MONO = 1 << 4;
    }
}

impl LoadFlags {
    pub const TARGETS: LoadFlags = LoadFlags::TARGET_LIGHT.union(LoadFlags::TARGET_MONO);
}

/// `(a * b) / 0x10000` rounded half away from zero.
pub fn mul_fix(a: i64, b: i64) -> i64 {
    let product = a * b;
    if product >= 0 {
        (product + 0x8000) >> 16
    } else {
        -((-product + 0x8000) >> 16)
    }
}

/// A 2x2 transform in 16.16 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix {
    pub xx: i64,
    pub xy: i64,
    pub yx: i64,
    pub yy: i64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        xx: 0x10000,
        xy: 0,
        yx: 0,
        yy: 0x10000,
    };

    /// Horizontal shear used for synthetic italics.
    pub const ITALIC: Matrix = Matrix {
        xx: 0x10000,
        xy: 0x6000,
        yx: 0,
        yy: 0x10000,
    };

    pub fn apply(&self, x: i64, y: i64) -> (i64, i64) {
        (
            mul_fix(x, self.xx) + mul_fix(y, self.xy),
            mul_fix(x, self.yx) + mul_fix(y, self.yy),
        )
    }
}

/// Control box in 26.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl CBox {
    pub fn is_empty_area(&self) -> bool {
        self.x_max == self.x_min || self.y_max == self.y_min
    }

    /// The box snapped outwards to whole pixels, in pixels.
    pub fn to_pixels(self) -> CBox {
        CBox {
            x_min: self.x_min.div_euclid(64),
            y_min: self.y_min.div_euclid(64),
            x_max: (self.x_max + 63).div_euclid(64),
            y_max: (self.y_max + 63).div_euclid(64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    MoveTo(FixedPoint),
    LineTo(FixedPoint),
    QuadTo(FixedPoint, FixedPoint),
    CubicTo(FixedPoint, FixedPoint, FixedPoint),
    Close,
}

fn to_fixed(v: Vector, x_scale: f32) -> FixedPoint {
    FixedPoint::new(
        (v.x * x_scale * 64.0).round() as i64,
        (v.y * 64.0).round() as i64,
    )
}

/// Line back to the contour start unless the pen is already there.
fn finish_contour(sink: &mut impl OutlineSink, start: &mut Option<FixedPoint>, at: FixedPoint) {
    if let Some(s) = start.take()
        && s != at
    {
        sink.line_to(s);
    }
}

/// Pixels, y flipped to point down.
fn to_vector(p: FixedPoint) -> Vector {
    Vector::new(p.x as f32 / 64.0, -p.y as f32 / 64.0)
}

/// A glyph outline in 26.6 fixed point, y up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeOutline {
    segments: Vec<Segment>,
}

impl NativeOutline {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Convert pixel-space path commands, scaling x by `x_scale`.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>, x_scale: f32) -> Self {
        let segments = commands
            .into_iter()
            .map(|cmd| match cmd {
                Command::MoveTo(p) => Segment::MoveTo(to_fixed(p, x_scale)),
                Command::LineTo(p) => Segment::LineTo(to_fixed(p, x_scale)),
                Command::QuadTo(c, p) => {
                    Segment::QuadTo(to_fixed(c, x_scale), to_fixed(p, x_scale))
                }
                Command::CurveTo(c1, c2, p) => Segment::CubicTo(
                    to_fixed(c1, x_scale),
                    to_fixed(c2, x_scale),
                    to_fixed(p, x_scale),
                ),
                Command::Close => Segment::Close,
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of points, counting control points.
    pub fn point_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::MoveTo(_) | Segment::LineTo(_) => 1,
                Segment::QuadTo(..) => 2,
                Segment::CubicTo(..) => 3,
                Segment::Close => 0,
            })
            .sum()
    }

    fn points_mut(&mut self) -> impl Iterator<Item = &mut FixedPoint> {
        self.segments.iter_mut().flat_map(|s| {
            let points: Vec<&mut FixedPoint> = match s {
                Segment::MoveTo(p) | Segment::LineTo(p) => vec![p],
                Segment::QuadTo(c, p) => vec![c, p],
                Segment::CubicTo(c1, c2, p) => vec![c1, c2, p],
                Segment::Close => Vec::new(),
            };
            points
        })
    }

    fn points(&self) -> impl Iterator<Item = FixedPoint> + '_ {
        self.segments.iter().flat_map(|s| {
            let points: Vec<FixedPoint> = match *s {
                Segment::MoveTo(p) | Segment::LineTo(p) => vec![p],
                Segment::QuadTo(c, p) => vec![c, p],
                Segment::CubicTo(c1, c2, p) => vec![c1, c2, p],
                Segment::Close => Vec::new(),
            };
            points
        })
    }

    pub fn transform(&mut self, matrix: &Matrix) {
        for p in self.points_mut() {
            (p.x, p.y) = matrix.apply(p.x, p.y);
        }
    }

    pub fn translate(&mut self, dx: i64, dy: i64) {
        if dx == 0 && dy == 0 {
            return;
        }
        for p in self.points_mut() {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Bounds of all points, control points included.
    pub fn cbox(&self) -> CBox {
        let mut points = self.points();
        let Some(first) = points.next() else {
            return CBox::default();
        };
        points.fold(
            CBox {
                x_min: first.x,
                y_min: first.y,
                x_max: first.x,
                y_max: first.y,
            },
            |b, p| CBox {
                x_min: b.x_min.min(p.x),
                y_min: b.y_min.min(p.y),
                x_max: b.x_max.max(p.x),
                y_max: b.y_max.max(p.y),
            },
        )
    }

    /// Walk the contours, always finishing each one back on its start
    /// point before the next one begins.
    pub fn decompose(&self, sink: &mut impl OutlineSink) {
        let mut start: Option<FixedPoint> = None;
        let mut position = FixedPoint::default();

        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => {
                    finish_contour(sink, &mut start, position);
                    sink.move_to(p);
                    start = Some(p);
                    position = p;
                }
                Segment::LineTo(p) => {
                    sink.line_to(p);
                    position = p;
                }
                Segment::QuadTo(c, p) => {
                    sink.conic_to(c, p);
                    position = p;
                }
                Segment::CubicTo(c1, c2, p) => {
                    sink.cubic_to(c1, c2, p);
                    position = p;
                }
                Segment::Close => {
                    if let Some(s) = start {
                        finish_contour(sink, &mut start, position);
                        position = s;
                    }
                }
            }
        }
        finish_contour(sink, &mut start, position);
    }

    /// The outline as zeno path commands in pixels, y down.
    pub fn to_commands(&self) -> Vec<Command> {
        self.segments
            .iter()
            .map(|s| match *s {
                Segment::MoveTo(p) => Command::MoveTo(to_vector(p)),
                Segment::LineTo(p) => Command::LineTo(to_vector(p)),
                Segment::QuadTo(c, p) => Command::QuadTo(to_vector(c), to_vector(p)),
                Segment::CubicTo(c1, c2, p) => {
                    Command::CurveTo(to_vector(c1), to_vector(c2), to_vector(p))
                }
                Segment::Close => Command::Close,
            })
            .collect()
    }

    /// Rasterize to 8-bit coverage, top row first.
    pub fn render(&self) -> AlphaImage {
        let commands = self.to_commands();
        let (data, placement) = Mask::new(commands.as_slice())
            .format(Format::Alpha)
            .origin(Origin::TopLeft)
            .render();
        AlphaImage {
            left: placement.left,
            top: -placement.top,
            width: placement.width,
            height: placement.height,
            data,
        }
    }
}

/// 8-bit coverage with its placement relative to the pen position (y up).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlphaImage {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl AlphaImage {
    fn from_strike(image: Image) -> Self {
        let (width, height) = (image.placement.width, image.placement.height);
        let pixels = (width * height) as usize;
        let data = match image.content {
            Content::Mask => image.data,
            Content::Color => image.data.chunks_exact(4).map(|px| px[3]).collect(),
            Content::SubpixelMask => {
                let stride = if pixels > 0 {
                    image.data.len() / pixels
                } else {
                    1
                };
                image
                    .data
                    .chunks_exact(stride.max(1))
                    .map(|px| px.iter().copied().max().unwrap_or(0))
                    .collect()
            }
        };
        Self {
            left: image.placement.left,
            top: image.placement.top,
            width,
            height,
            data,
        }
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Bounds in 26.6.
    pub fn cbox(&self) -> CBox {
        let x_min = self.left as i64 * 64;
        let y_max = self.top as i64 * 64;
        CBox {
            x_min,
            y_min: y_max - self.height as i64 * 64,
            x_max: x_min + self.width as i64 * 64,
            y_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphImage {
    Outline(NativeOutline),
    /// An embedded strike; never transformed, only moved.
    Bitmap(AlphaImage),
}

impl GlyphImage {
    pub fn cbox(&self) -> CBox {
        match self {
            GlyphImage::Outline(outline) => outline.cbox(),
            GlyphImage::Bitmap(bitmap) => bitmap.cbox(),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, GlyphImage::Bitmap(_))
    }
}

/// One loaded glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeGlyph {
    pub image: GlyphImage,
    /// Horizontal advance in 26.6
    pub hori_advance: i64,
    /// Advance vector in 16.16, transformed along with the outline
    pub advance: (i64, i64),
    /// The advance was zero before any emboldening
    pub zero_width: bool,
}

impl NativeGlyph {
    pub fn transform(&mut self, matrix: &Matrix) {
        if let GlyphImage::Outline(outline) = &mut self.image {
            outline.transform(matrix);
        }
        self.advance = matrix.apply(self.advance.0, self.advance.1);
    }
}

/// A sized face: everything needed to load glyphs at one pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRequest {
    /// Pixel height
    pub size: f32,
    /// Horizontal scale relative to the height
    pub x_scale: f32,
    pub glyph_count: u16,
}

/// Load `glyph_id` at `request`.
///
/// Embedded strikes are preferred unless `NO_BITMAP` is set. `embolden`
/// grows outlines by 1/24 em and widens non-zero advances to match.
pub fn load_glyph(
    context: &mut ScaleContext,
    font: FontRef<'_>,
    glyph_id: u16,
    request: SizeRequest,
    flags: LoadFlags,
    embolden: bool,
) -> Option<NativeGlyph> {
    if glyph_id >= request.glyph_count {
        return None;
    }
    let hinting = !flags.contains(LoadFlags::NO_HINTING);
    let mut scaler = context
        .builder(font)
        .size(request.size)
        .hint(hinting)
        .build();

    let advance_px = font
        .glyph_metrics(&[])
        .scale(request.size)
        .advance_width(glyph_id)
        * request.x_scale;
    let advance_px = if hinting {
        advance_px.round()
    } else {
        advance_px
    };
    let mut hori_advance = (advance_px * 64.0).round() as i64;
    let zero_width = hori_advance == 0;

    let strike = if flags.contains(LoadFlags::NO_BITMAP) {
        None
    } else {
        scaler.scale_bitmap(glyph_id, StrikeWith::ExactSize)
    };
    let image = match strike {
        Some(strike) => GlyphImage::Bitmap(AlphaImage::from_strike(strike)),
        None => {
            let outline = scaler.scale_outline(glyph_id).map(|mut outline| {
                if embolden {
                    let strength = request.size / 24.0;
                    outline.embolden(strength, strength);
                }
                NativeOutline::from_commands(outline.path().commands(), request.x_scale)
            });
            GlyphImage::Outline(outline.unwrap_or_default())
        }
    };

    if embolden && !zero_width {
        hori_advance += (request.size * 64.0 / 24.0).round() as i64;
    }

    Some(NativeGlyph {
        image,
        hori_advance,
        advance: (hori_advance << 10, 0),
        zero_width,
    })
}
