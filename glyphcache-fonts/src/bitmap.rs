//! Row-major 1-bit and 8-bit glyph rasters.

/// Pixel depth of a [`RawBitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// One bit per pixel, most significant bit first
    Mono,
    /// One byte of coverage per pixel
    Gray,
}

impl BitDepth {
    /// Bytes per row for `width` pixels. Gray rows are padded to 4 bytes.
    pub fn scanline_size(self, width: u32) -> usize {
        match self {
            BitDepth::Mono => width.div_ceil(8) as usize,
            BitDepth::Gray => (width as usize + 3) & !3,
        }
    }
}

/// A glyph raster positioned relative to the pen origin (y down).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBitmap {
    pub width: u32,
    pub height: u32,
    pub depth: BitDepth,
    pub scanline_size: usize,
    pub x_offset: i32,
    pub y_offset: i32,
    pub bits: Vec<u8>,
}

impl RawBitmap {
    /// An all-zero raster of the given size.
    pub fn new(width: u32, height: u32, depth: BitDepth) -> Self {
        let scanline_size = depth.scanline_size(width);
        Self {
            width,
            height,
            depth,
            scanline_size,
            x_offset: 0,
            y_offset: 0,
            bits: vec![0; scanline_size * height as usize],
        }
    }

    /// The zero-area raster returned for degenerate glyphs.
    pub fn empty(depth: BitDepth) -> Self {
        Self::new(0, 0, depth)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.scanline_size;
        &self.bits[start..start + self.scanline_size]
    }

    /// Coverage at `(x, y)`: 0 or 1 for mono, 0..=255 for gray.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        let row = self.row(y);
        match self.depth {
            BitDepth::Mono => (row[x as usize / 8] >> (7 - x % 8)) & 1,
            BitDepth::Gray => row[x as usize],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) {
        let idx = y as usize * self.scanline_size;
        match self.depth {
            BitDepth::Mono => {
                let byte = &mut self.bits[idx + x as usize / 8];
                let mask = 0x80 >> (x % 8);
                if value != 0 {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
            BitDepth::Gray => self.bits[idx + x as usize] = value,
        }
    }

    /// Rotate by a right angle given in tenths of a degree.
    ///
    /// Angles are counter-clockwise as seen on screen. Returns `false` and
    /// leaves the raster untouched for angles that are not a multiple of 900.
    pub fn rotate(&mut self, angle: i32) -> bool {
        let angle = angle.rem_euclid(3600);
        if angle == 0 {
            return true;
        }
        if angle % 900 != 0 {
            return false;
        }

        let (w, h) = (self.width, self.height);
        let (new_w, new_h) = if angle == 1800 { (w, h) } else { (h, w) };
        let mut out = RawBitmap::new(new_w, new_h, self.depth);
        for y in 0..h {
            for x in 0..w {
                let value = self.pixel(x, y);
                if value == 0 {
                    continue;
                }
                let (nx, ny) = match angle {
                    900 => (y, w - 1 - x),
                    1800 => (w - 1 - x, h - 1 - y),
                    _ => (h - 1 - y, x),
                };
                out.set_pixel(nx, ny, value);
            }
        }

        (out.x_offset, out.y_offset) =
            rotate_placement((self.x_offset, self.y_offset), (w, h), angle);
        *self = out;
        true
    }
}

/// Where a `width` x `height` raster placed at `offset` (y down, relative to
/// the pen) lands after [`RawBitmap::rotate`] by `angle`.
///
/// `angle` is in tenths of a degree; anything but a right angle leaves the
/// offset as is.
pub fn rotate_placement(offset: (i32, i32), (width, height): (u32, u32), angle: i32) -> (i32, i32) {
    let (xo, yo) = offset;
    let (w, h) = (width as i32, height as i32);
    match angle.rem_euclid(3600) {
        900 => (yo, -(xo + w)),
        1800 => (-(xo + w), -(yo + h)),
        2700 => (-(yo + h), xo),
        _ => offset,
    }
}
