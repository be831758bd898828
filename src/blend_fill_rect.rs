//! Rectangle fills composited with a blend mode.

use crate::basics::Rect;
use crate::blend::{blend_pixel, BlendMode, BlendSource};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::pixel_codec::{Codec, CodecVisitor, PixelCodec};
use crate::surface::Surface;

/// Composite `color` over `rect`, or over the whole clip rectangle for
/// `None`.
pub fn blend_fill_rect(dst: &mut Surface, rect: Option<Rect>, mode: BlendMode, color: Color) -> Result<()> {
    let rect = rect.unwrap_or_else(|| dst.clip_rect());
    blend_fill_rects(dst, &[rect], mode, color)
}

/// Composite `color` over every rectangle after clipping.
///
/// Format support matches [`blend_points`](crate::draw_point::blend_points).
pub fn blend_fill_rects(dst: &mut Surface, rects: &[Rect], mode: BlendMode, color: Color) -> Result<()> {
    dst.require_depth("blend_fill_rects")?;
    let codec = Codec::select_by_depth(dst.format()).ok_or(Error::UnsupportedFormat {
        op: "blend_fill_rects",
        format: dst.format().format,
    })?;
    codec.run(BlendFill {
        dst,
        rects,
        src: BlendSource::new(mode, color),
    });
    Ok(())
}

struct BlendFill<'a> {
    dst: &'a mut Surface,
    rects: &'a [Rect],
    src: BlendSource,
}

impl CodecVisitor for BlendFill<'_> {
    type Output = ();

    fn visit<C: PixelCodec>(self, codec: C) {
        let clip = self.dst.clip_rect();
        let pitch = self.dst.pitch();
        for r in self.rects {
            let Some(r) = r.intersect(&clip) else {
                continue;
            };
            let start = self.dst.offset_of(r.x, r.y);
            let span = r.w as usize * C::BYTES;
            let pixels = self.dst.pixels_mut();
            for row in 0..r.h as usize {
                let o = start + row * pitch;
                for p in pixels[o..o + span].chunks_exact_mut(C::BYTES) {
                    blend_pixel(&codec, p, &self.src);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
