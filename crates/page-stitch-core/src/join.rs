use crate::error::{Result, StitchError};
use crate::model::Axis;
use image::{Rgba, RgbaImage};

/// Canvas fill for padded area. Opaque white so JPEG output (no alpha)
/// reads as blank paper rather than black.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Blit `src` into `canvas` with its top-left corner at (dx, dy), with
/// bounds guards on the canvas edges.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    for (x, y, px) in src.enumerate_pixels() {
        if dx + x < cw && dy + y < ch {
            canvas.put_pixel(dx + x, dy + y, *px);
        }
    }
}

/// Dimension law for a pair join: sum along the join axis, max along the
/// other.
pub fn joined_dimensions(a: (u32, u32), b: (u32, u32), axis: Axis) -> (u32, u32) {
    match axis {
        Axis::Horizontal => (a.0 + b.0, a.1.max(b.1)),
        Axis::Vertical => (a.0.max(b.0), a.1 + b.1),
    }
}

/// Join two images along `axis` onto one canvas.
///
/// Horizontal places `b` to the right of `a`, top-aligned; vertical places
/// `b` below `a`, left-aligned. Neither input is resampled: each keeps its
/// exact dimensions and the uncovered area is filled with [`BACKGROUND`].
/// Mismatched dimensions are handled by that padding, never an error.
pub fn join_pair(a: &RgbaImage, b: &RgbaImage, axis: Axis) -> Result<RgbaImage> {
    for (img, which) in [(a, "first"), (b, "second")] {
        if img.width() == 0 || img.height() == 0 {
            return Err(StitchError::InvalidInput(format!(
                "{which} image has zero dimensions"
            )));
        }
    }
    let (w, h) = joined_dimensions(a.dimensions(), b.dimensions(), axis);
    let mut canvas = RgbaImage::from_pixel(w, h, BACKGROUND);
    blit_rgba(a, &mut canvas, 0, 0);
    match axis {
        Axis::Horizontal => blit_rgba(b, &mut canvas, a.width(), 0),
        Axis::Vertical => blit_rgba(b, &mut canvas, 0, a.height()),
    }
    Ok(canvas)
}
