//! Glyph rasterization and outline extraction for [`ServerFont`].

use super::{AlphaImage, GlyphImage, LoadFlags, Matrix, NativeGlyph, ServerFont};
use crate::bitmap::{BitDepth, RawBitmap};
use crate::gamma::GAMMA_TABLE;
use crate::glyph::{GlyphFlags, GlyphId};
use crate::outline::{GlyphOutline, PolyArgs};

/// Angles the raster rotation handles, in tenths of a degree.
const RIGHT_ANGLES: [i32; 4] = [-900, 900, 1800, 2700];

/// OR every bit with its left neighbour, row by row.
fn smear_bold(bitmap: &mut RawBitmap) {
    let stride = bitmap.scanline_size;
    if stride == 0 {
        return;
    }
    for row in bitmap.bits.chunks_exact_mut(stride) {
        let mut last = 0u8;
        for byte in row {
            let carry = *byte << 7;
            *byte |= (*byte >> 1) | last;
            last = carry;
        }
    }
}

fn rasterize(image: GlyphImage) -> AlphaImage {
    match image {
        GlyphImage::Outline(outline) => outline.render(),
        GlyphImage::Bitmap(bitmap) => bitmap,
    }
}

fn rotate_raster(bitmap: &mut RawBitmap, angle: i32) {
    if RIGHT_ANGLES.contains(&angle) && !bitmap.rotate(angle) {
        log::debug!("Raster rotation by {angle} skipped");
    }
}

impl ServerFont {
    /// Load and transform `glyph` the way the rasterizers see it.
    ///
    /// Also returns the right angle still to be applied to the raster.
    pub(super) fn load_for_raster(&self, glyph: GlyphId, flags: LoadFlags) -> Option<(NativeGlyph, i32)> {
        let (index, glyph_flags) = self.split_glyph_flags(glyph);
        let mut native = self.load_glyph(index, flags)?;
        let transform = self.apply_glyph_transform(glyph_flags, &mut native, true);
        if self.art_italic {
            native.transform(&Matrix::ITALIC);
        }
        Some((native, transform.angle))
    }

    /// Render `glyph` as a 1-bit raster.
    ///
    /// `None` when the instance is invalid or the glyph can't be loaded.
    pub fn glyph_bitmap1(&self, glyph: GlyphId) -> Option<RawBitmap> {
        if !self.is_valid() {
            return None;
        }
        let mut flags = (self.load_flags - LoadFlags::TARGETS) | LoadFlags::TARGET_MONO;
        if self.art_italic {
            flags |= LoadFlags::NO_BITMAP;
        }
        // Unhinted right-angle mono text is unreadable
        if (self.cos == 0 || self.sin == 0) && self.priorities.auto_hint > 0 {
            flags -= LoadFlags::NO_HINTING;
        }
        if self.priorities.embedded_bitmap <= self.priorities.auto_hint {
            flags |= LoadFlags::NO_BITMAP;
        }

        let (native, angle) = self.load_for_raster(glyph, flags)?;
        if native.image.cbox().is_empty_area() {
            return Some(RawBitmap::empty(BitDepth::Mono));
        }

        let alpha = rasterize(native.image);
        let mut bitmap = RawBitmap::new(alpha.width, alpha.height, BitDepth::Mono);
        bitmap.x_offset = alpha.left;
        bitmap.y_offset = -alpha.top;
        for y in 0..alpha.height {
            for x in 0..alpha.width {
                if alpha.alpha(x, y) >= 128 {
                    bitmap.set_pixel(x, y, 1);
                }
            }
        }
        if self.art_bold {
            smear_bold(&mut bitmap);
        }
        rotate_raster(&mut bitmap, angle);
        Some(bitmap)
    }

    /// Render `glyph` as an 8-bit coverage raster.
    pub fn glyph_bitmap8(&self, glyph: GlyphId) -> Option<RawBitmap> {
        if !self.is_valid() {
            return None;
        }
        let mut flags = self.load_flags;
        if self.art_italic {
            flags |= LoadFlags::NO_BITMAP;
        }
        if glyph.flags.contains(GlyphFlags::UNHINTED)
            || self.priorities.auto_hint < self.priorities.anti_alias
        {
            flags |= LoadFlags::NO_HINTING;
        }
        if self.priorities.embedded_bitmap <= self.priorities.anti_alias {
            flags |= LoadFlags::NO_BITMAP;
        }

        let (native, angle) = self.load_for_raster(glyph, flags)?;
        if native.image.cbox().is_empty_area() {
            return Some(RawBitmap::empty(BitDepth::Gray));
        }

        let embedded = native.image.is_bitmap();
        let alpha = rasterize(native.image);
        let mut bitmap = RawBitmap::new(alpha.width, alpha.height, BitDepth::Gray);
        bitmap.x_offset = alpha.left;
        bitmap.y_offset = -alpha.top;
        let width = alpha.width as usize;
        if width > 0 {
            for (dst, src) in bitmap
                .bits
                .chunks_exact_mut(bitmap.scanline_size)
                .zip(alpha.data.chunks_exact(width))
            {
                dst[..width].copy_from_slice(src);
            }
        }
        if !embedded && self.use_gamma {
            for value in &mut bitmap.bits {
                *value = GAMMA_TABLE[*value as usize];
            }
        }
        rotate_raster(&mut bitmap, angle);
        Some(bitmap)
    }

    /// The glyph as closed cubic contours in pixels, y down.
    ///
    /// Bitmap-only glyphs have no outline. A blank glyph yields an empty
    /// outline.
    pub fn glyph_outline(&self, glyph: GlyphId) -> Option<GlyphOutline> {
        if !self.is_valid() {
            return None;
        }
        let (index, glyph_flags) = self.split_glyph_flags(glyph);
        let mut native = self.load_glyph(index, LoadFlags::TARGET_LIGHT)?;
        if native.image.is_bitmap() {
            return None;
        }
        if self.art_italic {
            native.transform(&Matrix::ITALIC);
        }
        let GlyphImage::Outline(outline) = &native.image else {
            return None;
        };
        if outline.point_count() == 0 {
            return Some(GlyphOutline::default());
        }

        self.apply_glyph_transform(glyph_flags, &mut native, false);
        let GlyphImage::Outline(outline) = &native.image else {
            return None;
        };
        let mut poly = PolyArgs::new(outline.point_count());
        outline.decompose(&mut poly);
        poly.close_polygon();
        Some(GlyphOutline::from_polygons(poly.polygons()))
    }
}
