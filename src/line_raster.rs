//! Line walkers shared by the raw and blending line routines.
//!
//! A segment is classified once: horizontal, vertical and 45-degree lines
//! get dedicated walkers, everything else goes through Bresenham or the
//! antialiased Wu walker. Walkers only emit coordinates; a [`LineSink`]
//! decides what happens at each pixel.

use crate::basics::{Point, Rect};
use crate::clip_line::intersect_rect_and_line;

/// Receives the pixels of a rasterized segment.
pub(crate) trait LineSink {
    /// A pixel at full coverage.
    fn plot(&mut self, x: i32, y: i32);

    /// A pixel at partial coverage, `weight` in `0..=255`.
    fn plot_weighted(&mut self, x: i32, y: i32, weight: u32);
}

/// General-case line algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineAlgorithm {
    /// Aliased integer Bresenham.
    Bresenham,
    /// Xiaolin Wu's antialiased lines. Endpoints are drawn exactly as
    /// Bresenham draws them.
    Wu,
}

impl Default for LineAlgorithm {
    /// `Wu` when built with the `wu-lines` feature, `Bresenham` otherwise.
    fn default() -> Self {
        if cfg!(feature = "wu-lines") {
            LineAlgorithm::Wu
        } else {
            LineAlgorithm::Bresenham
        }
    }
}

/// Rasterize the segment `a`-`b`. The last pixel is emitted only when
/// `draw_end` is set.
pub(crate) fn rasterize_line<S: LineSink>(
    sink: &mut S,
    algorithm: LineAlgorithm,
    a: Point,
    b: Point,
    draw_end: bool,
) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dy == 0 {
        hline(sink, a.x, b.x, a.y, draw_end);
    } else if dx == 0 {
        vline(sink, a.x, a.y, b.y, draw_end);
    } else if dx.abs() == dy.abs() {
        dline(sink, a, b, draw_end);
    } else {
        match algorithm {
            LineAlgorithm::Bresenham => bline(sink, a, b, draw_end),
            LineAlgorithm::Wu => wuline(sink, a, b, draw_end),
        }
    }
}

/// Clip one segment to `clip` and draw it. The last pixel is drawn when
/// `draw_end` is set or clipping moved the end point.
pub(crate) fn clipped_segment<S: LineSink>(
    sink: &mut S,
    clip: &Rect,
    algorithm: LineAlgorithm,
    a: Point,
    b: Point,
    draw_end: bool,
) {
    if let Some((ca, cb)) = intersect_rect_and_line(clip, a, b) {
        rasterize_line(sink, algorithm, ca, cb, draw_end || cb != b);
    }
}

/// Draw a connected polyline so every vertex is emitted once.
///
/// Each segment stops short of its end vertex unless clipping moved that
/// end, so a repeated vertex adds nothing. The last vertex is then plotted
/// once, unless it closes the path back onto the first. A path whose
/// vertices all coincide plots that single pixel.
pub(crate) fn polyline<S: LineSink>(
    sink: &mut S,
    clip: &Rect,
    algorithm: LineAlgorithm,
    points: &[Point],
) {
    if points.len() < 2 {
        return;
    }
    for seg in points.windows(2) {
        let Some((a, b)) = intersect_rect_and_line(clip, seg[0], seg[1]) else {
            continue;
        };
        rasterize_line(sink, algorithm, a, b, b != seg[1]);
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    let single = points.iter().all(|&p| p == first);
    if (first != last || single) && clip.contains(last.x, last.y) {
        sink.plot(last.x, last.y);
    }
}

/// Start and length of a 1-D run from `v1` to `v2`, walked upward.
#[inline]
fn run(v1: i32, v2: i32, draw_end: bool) -> (i32, i32) {
    let end = draw_end as i32;
    if v1 <= v2 {
        (v1, v2 - v1 + end)
    } else {
        (v2 + 1 - end, v1 - v2 + end)
    }
}

fn hline<S: LineSink>(sink: &mut S, x1: i32, x2: i32, y: i32, draw_end: bool) {
    let (x, len) = run(x1, x2, draw_end);
    for i in 0..len {
        sink.plot(x + i, y);
    }
}

fn vline<S: LineSink>(sink: &mut S, x: i32, y1: i32, y2: i32, draw_end: bool) {
    let (y, len) = run(y1, y2, draw_end);
    for i in 0..len {
        sink.plot(x, y + i);
    }
}

/// 45-degree lines, always walked downward.
fn dline<S: LineSink>(sink: &mut S, a: Point, b: Point, draw_end: bool) {
    let (mut x, mut y, step, mut len) = if a.y <= b.y {
        let step = if a.x <= b.x { 1 } else { -1 };
        (a.x, a.y, step, b.y - a.y)
    } else {
        let step = if b.x <= a.x { 1 } else { -1 };
        (b.x, b.y, step, a.y - b.y)
    };
    if a.y > b.y && !draw_end {
        x += step;
        y += 1;
    }
    if draw_end {
        len += 1;
    }
    for _ in 0..len {
        sink.plot(x, y);
        x += step;
        y += 1;
    }
}

fn bline<S: LineSink>(sink: &mut S, a: Point, b: Point, draw_end: bool) {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();

    let (mut numpixels, mut d, dinc1, dinc2, mut xinc1, mut xinc2, mut yinc1, mut yinc2) =
        if dx >= dy {
            (dx + 1, 2 * dy - dx, dy * 2, (dy - dx) * 2, 1, 1, 0, 1)
        } else {
            (dy + 1, 2 * dx - dy, dx * 2, (dx - dy) * 2, 0, 1, 1, 1)
        };
    if a.x > b.x {
        xinc1 = -xinc1;
        xinc2 = -xinc2;
    }
    if a.y > b.y {
        yinc1 = -yinc1;
        yinc2 = -yinc2;
    }
    if !draw_end {
        numpixels -= 1;
    }

    let (mut x, mut y) = (a.x, a.y);
    for _ in 0..numpixels {
        sink.plot(x, y);
        if d < 0 {
            d += dinc1;
            x += xinc1;
            y += yinc1;
        } else {
            d += dinc2;
            x += xinc2;
            y += yinc2;
        }
    }
}

/// Wu's algorithm with a 16-bit error accumulator. Interior pixels come in
/// pairs whose weights sum to 255.
fn wuline<S: LineSink>(sink: &mut S, a: Point, b: Point, draw_end: bool) {
    sink.plot(a.x, a.y);
    if draw_end {
        sink.plot(b.x, b.y);
    }

    let (top, bottom) = if a.y > b.y { (b, a) } else { (a, b) };
    let (mut x, mut y) = (top.x, top.y);
    let dy = bottom.y - top.y;
    let (xdir, dx) = if bottom.x >= top.x {
        (1, bottom.x - top.x)
    } else {
        (-1, top.x - bottom.x)
    };

    let mut acc: u16 = 0;
    if dy > dx {
        let adj = (((dx as u32) << 16) / dy as u32) as u16;
        for _ in 1..dy {
            let prev = acc;
            acc = acc.wrapping_add(adj);
            if acc <= prev {
                x += xdir;
            }
            y += 1;
            let weight = (acc >> 8) as u32;
            sink.plot_weighted(x, y, weight ^ 255);
            sink.plot_weighted(x + xdir, y, weight);
        }
    } else {
        let adj = (((dy as u32) << 16) / dx as u32) as u16;
        for _ in 1..dx {
            let prev = acc;
            acc = acc.wrapping_add(adj);
            if acc <= prev {
                y += 1;
            }
            x += xdir;
            let weight = (acc >> 8) as u32;
            sink.plot_weighted(x, y, weight ^ 255);
            sink.plot_weighted(x, y + 1, weight);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Record {
        full: Vec<(i32, i32)>,
        weighted: Vec<(i32, i32, u32)>,
    }

    impl LineSink for Record {
        fn plot(&mut self, x: i32, y: i32) {
            self.full.push((x, y));
        }
        fn plot_weighted(&mut self, x: i32, y: i32, weight: u32) {
            self.weighted.push((x, y, weight));
        }
    }

    fn line(algo: LineAlgorithm, x1: i32, y1: i32, x2: i32, y2: i32, draw_end: bool) -> Record {
        let mut r = Record::default();
        rasterize_line(&mut r, algo, Point::new(x1, y1), Point::new(x2, y2), draw_end);
        r
    }

    fn bres(x1: i32, y1: i32, x2: i32, y2: i32, draw_end: bool) -> Vec<(i32, i32)> {
        line(LineAlgorithm::Bresenham, x1, y1, x2, y2, draw_end).full
    }

    fn poly(points: &[(i32, i32)], clip: Rect) -> Vec<(i32, i32)> {
        let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let mut r = Record::default();
        polyline(&mut r, &clip, LineAlgorithm::Bresenham, &pts);
        r.full
    }

    fn assert_unique(pts: &[(i32, i32)]) {
        let mut sorted = pts.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), pts.len(), "duplicate pixel in {:?}", pts);
    }

    #[test]
    fn test_closed_polyline_draws_each_vertex_once() {
        let pts = poly(&[(1, 1), (8, 1), (8, 6), (1, 6), (1, 1)], Rect::new(0, 0, 10, 10));
        assert_unique(&pts);
        assert_eq!(pts.len(), 2 * 7 + 2 * 5);
        assert_eq!(pts.iter().filter(|&&p| p == (1, 1)).count(), 1);
    }

    #[test]
    fn test_open_polyline_draws_last_vertex_once() {
        let pts = poly(&[(0, 0), (5, 2), (5, 7)], Rect::new(0, 0, 10, 10));
        assert_unique(&pts);
        assert_eq!(pts.iter().filter(|&&p| p == (5, 7)).count(), 1);
        assert_eq!(pts.iter().filter(|&&p| p == (5, 2)).count(), 1);
    }

    #[test]
    fn test_polyline_single_point_draws_nothing() {
        assert!(poly(&[(3, 3)], Rect::new(0, 0, 10, 10)).is_empty());
        assert!(poly(&[], Rect::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn test_polyline_clipped_end_is_drawn() {
        let pts = poly(&[(2, 2), (20, 2)], Rect::new(0, 0, 10, 10));
        assert_eq!(pts.len(), 8);
        assert_eq!(pts.last(), Some(&(9, 2)));
    }

    #[test]
    fn test_polyline_degenerate_segment() {
        let pts = poly(&[(4, 4), (4, 4), (6, 4)], Rect::new(0, 0, 10, 10));
        assert_eq!(pts, vec![(4, 4), (5, 4), (6, 4)]);

        let pts = poly(&[(2, 3), (6, 3), (6, 3), (6, 5)], Rect::new(0, 0, 10, 10));
        assert_eq!(pts, vec![(2, 3), (3, 3), (4, 3), (5, 3), (6, 3), (6, 4), (6, 5)]);

        assert_eq!(poly(&[(3, 3), (3, 3), (3, 3)], Rect::new(0, 0, 10, 10)), vec![(3, 3)]);
        assert!(poly(&[(3, 3), (3, 3)], Rect::new(0, 0, 2, 2)).is_empty());
    }

    #[test]
    fn test_hline_forward() {
        assert_eq!(bres(2, 1, 5, 1, true), vec![(2, 1), (3, 1), (4, 1), (5, 1)]);
        assert_eq!(bres(2, 1, 5, 1, false), vec![(2, 1), (3, 1), (4, 1)]);
    }

    #[test]
    fn test_hline_reversed_skips_end() {
        assert_eq!(bres(5, 1, 2, 1, false), vec![(3, 1), (4, 1), (5, 1)]);
        assert_eq!(bres(5, 1, 2, 1, true), vec![(2, 1), (3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn test_single_point() {
        assert_eq!(bres(3, 3, 3, 3, true), vec![(3, 3)]);
        assert!(bres(3, 3, 3, 3, false).is_empty());
    }

    #[test]
    fn test_vline() {
        assert_eq!(bres(0, 4, 0, 2, false), vec![(0, 3), (0, 4)]);
    }

    #[test]
    fn test_dline_down_left() {
        assert_eq!(bres(3, 0, 0, 3, true), vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn test_dline_upward_skips_end() {
        assert_eq!(bres(0, 3, 3, 0, false), vec![(2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn test_bresenham_x_major() {
        assert_eq!(
            bres(0, 0, 4, 1, true),
            vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 1)]
        );
    }

    #[test]
    fn test_bresenham_y_major_reversed() {
        let pts = bres(1, 4, 0, 0, true);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (1, 4));
        assert_eq!(pts[4], (0, 0));
    }

    #[test]
    fn test_bresenham_without_end() {
        let pts = bres(0, 0, 7, 3, false);
        assert_eq!(pts.len(), 7);
        assert!(!pts.contains(&(7, 3)));
    }

    #[test]
    fn test_wu_endpoints_match_bresenham() {
        let r = line(LineAlgorithm::Wu, 0, 0, 9, 4, true);
        assert_eq!(r.full, vec![(0, 0), (9, 4)]);
        let r = line(LineAlgorithm::Wu, 0, 0, 9, 4, false);
        assert_eq!(r.full, vec![(0, 0)]);
    }

    #[test]
    fn test_wu_pairs_sum_to_full() {
        let r = line(LineAlgorithm::Wu, 1, 1, 12, 6, true);
        assert_eq!(r.weighted.len(), 2 * 10);
        for pair in r.weighted.chunks(2) {
            assert_eq!(pair[0].2 + pair[1].2, 255);
            assert_eq!(pair[0].0, pair[1].0);
            assert_eq!(pair[0].1 + 1, pair[1].1);
        }
    }

    #[test]
    fn test_wu_y_major_pairs_step_x() {
        let r = line(LineAlgorithm::Wu, 5, 0, 2, 7, true);
        assert_eq!(r.weighted.len(), 2 * 6);
        for pair in r.weighted.chunks(2) {
            assert_eq!(pair[0].0 - 1, pair[1].0);
            assert_eq!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn test_wu_fast_paths_unchanged() {
        assert_eq!(
            line(LineAlgorithm::Wu, 0, 0, 3, 3, true).full,
            bres(0, 0, 3, 3, true)
        );
        assert!(line(LineAlgorithm::Wu, 0, 0, 3, 0, true).weighted.is_empty());
    }
}
