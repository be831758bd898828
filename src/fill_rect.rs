//! Solid rectangle fills with a raw mapped pixel value.

use crate::basics::Rect;
use crate::error::{Error, Result};
use crate::pixel_codec::write_pixel;
use crate::surface::Surface;

/// Fill `rect` (or the whole clip rectangle for `None`) with `color`.
pub fn fill_rect(dst: &mut Surface, rect: Option<Rect>, color: u32) -> Result<()> {
    match rect {
        Some(r) => fill_rects(dst, &[r], color),
        None => {
            let clip = dst.clip_rect();
            fill_rects(dst, &[clip], color)
        }
    }
}

/// Fill each rectangle, intersected with the clip rectangle. Rectangles
/// outside the clip are skipped.
///
/// Supports 1, 2, 3 and 4 bytes per pixel.
pub fn fill_rects(dst: &mut Surface, rects: &[Rect], color: u32) -> Result<()> {
    dst.require_depth("fill_rects")?;
    let bytes = dst.format().bytes_per_pixel as usize;
    if !(1..=4).contains(&bytes) {
        return Err(Error::UnsupportedFormat {
            op: "fill_rects",
            format: dst.format().format,
        });
    }

    let clip = dst.clip_rect();
    let pitch = dst.pitch();
    for r in rects {
        let Some(r) = r.intersect(&clip) else {
            continue;
        };
        let start = dst.offset_of(r.x, r.y);
        let span = r.w as usize * bytes;
        let pixels = dst.pixels_mut();
        for row in 0..r.h as usize {
            let o = start + row * pitch;
            fill_span(&mut pixels[o..o + span], bytes, color);
        }
    }
    Ok(())
}

/// Write `color` across a row, four pixels per step.
#[inline]
fn fill_span(row: &mut [u8], bytes: usize, color: u32) {
    if bytes == 1 {
        row.fill(color as u8);
        return;
    }
    let mut px = [0u8; 4];
    write_pixel(&mut px, bytes, color);
    let px = &px[..bytes];

    let mut quads = row.chunks_exact_mut(4 * bytes);
    for q in &mut quads {
        q[..bytes].copy_from_slice(px);
        q[bytes..2 * bytes].copy_from_slice(px);
        q[2 * bytes..3 * bytes].copy_from_slice(px);
        q[3 * bytes..].copy_from_slice(px);
    }
    for p in quads.into_remainder().chunks_exact_mut(bytes) {
        p.copy_from_slice(px);
    }
}

// ============================================================================
// Tests
// ============================================================================
