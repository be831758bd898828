//! Single-pixel drawing: raw writes and blended writes.
//!
//! Each point is tested against the destination clip rectangle on its own;
//! points outside it are skipped without error.

use crate::basics::Point;
use crate::blend::{blend_pixel, BlendMode, BlendSource};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::pixel_codec::{write_pixel, Codec, CodecVisitor, PixelCodec};
use crate::surface::Surface;

/// Write the mapped pixel value `color` at (x, y).
pub fn draw_point(dst: &mut Surface, x: i32, y: i32, color: u32) -> Result<()> {
    draw_points(dst, &[Point::new(x, y)], color)
}

/// Write the mapped pixel value `color` at every point inside the clip rect.
///
/// Supports 1, 2 and 4 bytes per pixel.
pub fn draw_points(dst: &mut Surface, points: &[Point], color: u32) -> Result<()> {
    let bytes = dst.raw_write_width("draw_points")?;
    let clip = dst.clip_rect();
    for p in points {
        if clip.contains(p.x, p.y) {
            let o = dst.offset_of(p.x, p.y);
            write_pixel(&mut dst.pixels_mut()[o..], bytes, color);
        }
    }
    Ok(())
}

/// Composite `color` at (x, y) with `mode`.
pub fn blend_point(dst: &mut Surface, x: i32, y: i32, mode: BlendMode, color: Color) -> Result<()> {
    blend_points(dst, &[Point::new(x, y)], mode, color)
}

/// Composite `color` at every point inside the clip rect.
///
/// The color is premultiplied once for BLEND and ADD. Supported layouts are
/// the RGB555, RGB565, RGB888 and ARGB8888 fast paths, opaque 2- or 4-byte
/// layouts, and 4-byte layouts with alpha.
pub fn blend_points(dst: &mut Surface, points: &[Point], mode: BlendMode, color: Color) -> Result<()> {
    dst.require_depth("blend_points")?;
    let codec = Codec::select_by_depth(dst.format()).ok_or(Error::UnsupportedFormat {
        op: "blend_points",
        format: dst.format().format,
    })?;
    codec.run(BlendPoints {
        dst,
        points,
        src: BlendSource::new(mode, color),
    });
    Ok(())
}

struct BlendPoints<'a> {
    dst: &'a mut Surface,
    points: &'a [Point],
    src: BlendSource,
}

impl CodecVisitor for BlendPoints<'_> {
    type Output = ();

    fn visit<C: PixelCodec>(self, codec: C) {
        let clip = self.dst.clip_rect();
        for p in self.points {
            if clip.contains(p.x, p.y) {
                let o = self.dst.offset_of(p.x, p.y);
                blend_pixel(&codec, &mut self.dst.pixels_mut()[o..], &self.src);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
