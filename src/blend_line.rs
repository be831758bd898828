//! Lines and polylines composited with a blend mode.
//!
//! The codec is chosen from the destination's byte width and red mask once
//! per call; every 2- and 4-byte layout has a path.

use crate::basics::{Point, Rect};
use crate::blend::{blend_pixel, BlendMode, BlendSource};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::line_raster::{clipped_segment, polyline, LineAlgorithm, LineSink};
use crate::pixel_codec::{Codec, CodecVisitor, PixelCodec};
use crate::surface::Surface;

/// Composite the segment `a`-`b` with the default [`LineAlgorithm`].
///
/// Fails with `UnsupportedDepth` or `UnsupportedFormat` when the surface
/// layout has no blending path.
pub fn blend_line(dst: &mut Surface, a: Point, b: Point, mode: BlendMode, color: Color) -> Result<()> {
    blend_line_with(dst, a, b, mode, color, LineAlgorithm::default())
}

/// Composite the segment `a`-`b`, both endpoints included.
pub fn blend_line_with(
    dst: &mut Surface,
    a: Point,
    b: Point,
    mode: BlendMode,
    color: Color,
    algorithm: LineAlgorithm,
) -> Result<()> {
    let codec = line_codec(dst, "blend_line")?;
    codec.run(BlendStroke {
        dst,
        shape: Shape::Segment(a, b),
        src: BlendSource::new(mode, color),
        algorithm,
    });
    Ok(())
}

/// Composite a connected polyline with the default [`LineAlgorithm`].
/// See [`blend_lines_with`].
pub fn blend_lines(dst: &mut Surface, points: &[Point], mode: BlendMode, color: Color) -> Result<()> {
    blend_lines_with(dst, points, mode, color, LineAlgorithm::default())
}

/// Composite a connected polyline; every vertex is blended exactly once,
/// so translucent strokes do not darken at the joints.
pub fn blend_lines_with(
    dst: &mut Surface,
    points: &[Point],
    mode: BlendMode,
    color: Color,
    algorithm: LineAlgorithm,
) -> Result<()> {
    let codec = line_codec(dst, "blend_lines")?;
    codec.run(BlendStroke {
        dst,
        shape: Shape::Polyline(points),
        src: BlendSource::new(mode, color),
        algorithm,
    });
    Ok(())
}

fn line_codec(dst: &Surface, op: &'static str) -> Result<Codec> {
    dst.require_depth(op)?;
    Codec::select_by_width(dst.format()).ok_or(Error::UnsupportedFormat {
        op,
        format: dst.format().format,
    })
}

enum Shape<'a> {
    Segment(Point, Point),
    Polyline(&'a [Point]),
}

struct BlendStroke<'a> {
    dst: &'a mut Surface,
    shape: Shape<'a>,
    src: BlendSource,
    algorithm: LineAlgorithm,
}

impl CodecVisitor for BlendStroke<'_> {
    type Output = ();

    fn visit<C: PixelCodec>(self, codec: C) {
        let clip = self.dst.clip_rect();
        let mut sink = BlendSink {
            dst: self.dst,
            codec,
            clip,
            src: self.src,
        };
        match self.shape {
            Shape::Segment(a, b) => clipped_segment(&mut sink, &clip, self.algorithm, a, b, true),
            Shape::Polyline(points) => polyline(&mut sink, &clip, self.algorithm, points),
        }
    }
}

struct BlendSink<'a, C> {
    dst: &'a mut Surface,
    codec: C,
    clip: Rect,
    src: BlendSource,
}

impl<C: PixelCodec> BlendSink<'_, C> {
    #[inline]
    fn put(&mut self, x: i32, y: i32, src: &BlendSource) {
        if self.clip.contains(x, y) {
            let o = self.dst.offset_of(x, y);
            blend_pixel(&self.codec, &mut self.dst.pixels_mut()[o..], src);
        }
    }
}

impl<C: PixelCodec> LineSink for BlendSink<'_, C> {
    fn plot(&mut self, x: i32, y: i32) {
        let src = self.src;
        self.put(x, y, &src);
    }

    fn plot_weighted(&mut self, x: i32, y: i32, weight: u32) {
        let src = self.src.weighted(weight);
        self.put(x, y, &src);
    }
}

// ============================================================================
// Tests
// ============================================================================
