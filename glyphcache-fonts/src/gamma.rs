//! Contrast curve applied to emboldened grayscale glyphs.

use std::sync::LazyLock;

const M_MAX: u32 = 255;
const M_X: u32 = 128;
const M_Y: u32 = 208;

/// Piecewise-linear lift: `[0, M_X]` maps onto `[0, M_Y]`, the rest onto
/// `[M_Y, M_MAX]`.
pub static GAMMA_TABLE: LazyLock<[u8; 256]> = LazyLock::new(|| {
    let mut table = [0u8; 256];
    for (x, slot) in table.iter_mut().enumerate() {
        let x = x as u32;
        let a = if x <= M_X {
            (x * M_Y + M_X / 2) / M_X
        } else {
            M_Y + ((x - M_X) * (M_MAX - M_Y) + (M_MAX - M_X) / 2) / (M_MAX - M_X)
        };
        *slot = a as u8;
    }
    table
});
