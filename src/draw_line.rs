//! Lines and polylines drawn with a raw mapped pixel value.

use crate::basics::{Point, Rect};
use crate::blend::{BlendMode, BlendSource};
use crate::color::Color;
use crate::error::Result;
use crate::line_raster::{clipped_segment, polyline, LineAlgorithm, LineSink};
use crate::pixel_codec::{read_pixel, write_pixel};
use crate::surface::Surface;

/// Draw the segment `a`-`b` including both endpoints.
pub fn draw_line(dst: &mut Surface, a: Point, b: Point, color: u32) -> Result<()> {
    draw_line_with(dst, a, b, color, LineAlgorithm::default())
}

/// Draw the segment `a`-`b` including both endpoints, rasterized with
/// `algorithm`. Single-byte surfaces always use Bresenham.
pub fn draw_line_with(
    dst: &mut Surface,
    a: Point,
    b: Point,
    color: u32,
    algorithm: LineAlgorithm,
) -> Result<()> {
    draw_segment(dst, a, b, color, algorithm, true)
}

/// Draw the segment `a`-`b`, leaving out the pixel at `b` unless
/// `draw_end` is set. A segment whose end is clipped away always reaches
/// the clip edge.
pub fn draw_segment(
    dst: &mut Surface,
    a: Point,
    b: Point,
    color: u32,
    algorithm: LineAlgorithm,
    draw_end: bool,
) -> Result<()> {
    let mut sink = RawSink::new(dst, color, "draw_line")?;
    let clip = sink.clip;
    let algorithm = sink.effective(algorithm);
    clipped_segment(&mut sink, &clip, algorithm, a, b, draw_end);
    Ok(())
}

/// Draw a connected polyline through `points`; shared vertices are written
/// once. Fewer than two points draw nothing.
pub fn draw_lines(dst: &mut Surface, points: &[Point], color: u32) -> Result<()> {
    draw_lines_with(dst, points, color, LineAlgorithm::default())
}

/// Draw a connected polyline through `points` with `algorithm`. A repeated
/// vertex is written once and a closed path does not revisit its start.
pub fn draw_lines_with(
    dst: &mut Surface,
    points: &[Point],
    color: u32,
    algorithm: LineAlgorithm,
) -> Result<()> {
    let mut sink = RawSink::new(dst, color, "draw_lines")?;
    let clip = sink.clip;
    let algorithm = sink.effective(algorithm);
    polyline(&mut sink, &clip, algorithm, points);
    Ok(())
}

/// Writes the raw value at full coverage. Partially covered Wu pixels are
/// blended with the decoded color through the surface format.
struct RawSink<'a> {
    dst: &'a mut Surface,
    bytes: usize,
    clip: Rect,
    color: u32,
    edge: BlendSource,
}

impl<'a> RawSink<'a> {
    fn new(dst: &'a mut Surface, color: u32, op: &'static str) -> Result<Self> {
        let bytes = dst.raw_write_width(op)?;
        let (r, g, b, a) = dst.format().get_rgba(color);
        Ok(Self {
            clip: dst.clip_rect(),
            bytes,
            color,
            edge: BlendSource::new(BlendMode::None, Color::new(r, g, b, a)),
            dst,
        })
    }

    /// Single-byte surfaces have no channels to blend into, so they never
    /// antialias.
    fn effective(&self, algorithm: LineAlgorithm) -> LineAlgorithm {
        if self.bytes == 1 {
            LineAlgorithm::Bresenham
        } else {
            algorithm
        }
    }
}

impl LineSink for RawSink<'_> {
    fn plot(&mut self, x: i32, y: i32) {
        if self.clip.contains(x, y) {
            let o = self.dst.offset_of(x, y);
            write_pixel(&mut self.dst.pixels_mut()[o..], self.bytes, self.color);
        }
    }

    fn plot_weighted(&mut self, x: i32, y: i32, weight: u32) {
        if !self.clip.contains(x, y) {
            return;
        }
        let o = self.dst.offset_of(x, y);
        let fmt = self.dst.format();
        let (r, g, b, a) = fmt.get_rgba(read_pixel(&self.dst.pixels()[o..], self.bytes));
        let out = self
            .edge
            .weighted(weight)
            .apply([r as u32, g as u32, b as u32, a as u32]);
        let v = fmt.map_rgba(out[0] as u8, out[1] as u8, out[2] as u8, out[3] as u8);
        write_pixel(&mut self.dst.pixels_mut()[o..], self.bytes, v);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pixfmt::PixelFormatEnum;

    fn set_pixels(s: &Surface) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..s.height() {
            for x in 0..s.width() {
                if s.get_pixel(x, y) != Some(0) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_draw_line_includes_end() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Rgb565).unwrap();
        draw_line(&mut s, Point::new(1, 1), Point::new(4, 1), 0xFFFF).unwrap();
        assert_eq!(set_pixels(&s), vec![(1, 1), (2, 1), (3, 1), (4, 1)]);
    }

    #[test]
    fn test_draw_segment_without_end() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Rgb565).unwrap();
        draw_segment(&mut s, Point::new(4, 2), Point::new(1, 2), 0xFFFF, LineAlgorithm::Bresenham, false)
            .unwrap();
        assert_eq!(set_pixels(&s), vec![(2, 2), (3, 2), (4, 2)]);

        let mut s = Surface::new(4, 4, PixelFormatEnum::Rgb565).unwrap();
        draw_segment(&mut s, Point::new(0, 1), Point::new(9, 1), 0xFFFF, LineAlgorithm::Bresenham, false)
            .unwrap();
        assert_eq!(s.get_pixel(3, 1), Some(0xFFFF));
    }

    #[test]
    fn test_draw_line_clipped() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Argb8888).unwrap();
        s.set_clip_rect(Some(Rect::new(2, 0, 3, 8)));
        draw_line(&mut s, Point::new(-10, 3), Point::new(20, 3), 1).unwrap();
        assert_eq!(set_pixels(&s), vec![(2, 3), (3, 3), (4, 3)]);
    }

    #[test]
    fn test_draw_line_fully_outside_is_ok() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Index8).unwrap();
        draw_line(&mut s, Point::new(-10, -3), Point::new(-2, -9), 1).unwrap();
        assert!(set_pixels(&s).is_empty());
    }

    #[test]
    fn test_draw_line_rejects_unsupported() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Index1Lsb).unwrap();
        assert!(matches!(
            draw_line(&mut s, Point::new(0, 0), Point::new(3, 3), 1),
            Err(Error::UnsupportedDepth { bits: 1, .. })
        ));
        let mut s = Surface::new(8, 8, PixelFormatEnum::Rgb24).unwrap();
        assert!(matches!(
            draw_lines(&mut s, &[Point::new(0, 0), Point::new(3, 3)], 1),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_draw_lines_closed_square() {
        let mut s = Surface::new(8, 8, PixelFormatEnum::Index8).unwrap();
        let pts = [
            Point::new(1, 1),
            Point::new(5, 1),
            Point::new(5, 5),
            Point::new(1, 5),
            Point::new(1, 1),
        ];
        draw_lines(&mut s, &pts, 7).unwrap();
        assert_eq!(set_pixels(&s).len(), 16);
    }

    #[test]
    fn test_wu_line_antialiases_interior() {
        let mut s = Surface::new(16, 16, PixelFormatEnum::Argb8888).unwrap();
        let white = s.format().map_rgba(255, 255, 255, 255);
        draw_line_with(&mut s, Point::new(0, 0), Point::new(10, 3), white, LineAlgorithm::Wu)
            .unwrap();
        assert_eq!(s.get_pixel(0, 0), Some(white));
        assert_eq!(s.get_pixel(10, 3), Some(white));
        let partial = (1..10)
            .flat_map(|x| (0..5).map(move |y| (x, y)))
            .filter_map(|(x, y)| s.get_color(x, y))
            .filter(|c| c.a > 0 && c.a < 255)
            .count();
        assert!(partial > 0);
    }

    #[test]
    fn test_wu_on_single_byte_falls_back() {
        let mut s = Surface::new(16, 16, PixelFormatEnum::Index8).unwrap();
        draw_line_with(&mut s, Point::new(0, 0), Point::new(10, 3), 5, LineAlgorithm::Wu).unwrap();
        assert_eq!(set_pixels(&s).len(), 11);
    }
}
