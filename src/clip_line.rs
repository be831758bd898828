//! Integer line clipping against a rectangle (Cohen-Sutherland).
//!
//! Intercepts are computed in 64-bit and truncated toward zero, so the
//! clipped endpoints are reproducible for any input range.

use crate::basics::{Point, Rect};

// ============================================================================
// Outcodes
// ============================================================================

const CODE_BOTTOM: u32 = 1;
const CODE_TOP: u32 = 2;
const CODE_LEFT: u32 = 4;
const CODE_RIGHT: u32 = 8;

#[inline]
fn outcode(rect: &Rect, x: i64, y: i64) -> u32 {
    let mut code = 0;
    if y < rect.y as i64 {
        code |= CODE_TOP;
    } else if y >= rect.bottom() as i64 {
        code |= CODE_BOTTOM;
    }
    if x < rect.x as i64 {
        code |= CODE_LEFT;
    } else if x >= rect.right() as i64 {
        code |= CODE_RIGHT;
    }
    code
}

// ============================================================================
// Segment clipping
// ============================================================================

/// Clip the segment `a`-`b` to `rect`.
///
/// Returns the clipped endpoints in the same order, or `None` if no part of
/// the segment lies inside. Endpoints already inside are returned unchanged,
/// so a caller can detect clipping by comparing against its input.
pub fn intersect_rect_and_line(rect: &Rect, a: Point, b: Point) -> Option<(Point, Point)> {
    if rect.is_empty() {
        return None;
    }

    let rx1 = rect.x as i64;
    let ry1 = rect.y as i64;
    let rx2 = rect.right() as i64 - 1;
    let ry2 = rect.bottom() as i64 - 1;
    let (mut x1, mut y1) = (a.x as i64, a.y as i64);
    let (mut x2, mut y2) = (b.x as i64, b.y as i64);

    let inside = |x: i64, y: i64| x >= rx1 && x <= rx2 && y >= ry1 && y <= ry2;
    if inside(x1, y1) && inside(x2, y2) {
        return Some((a, b));
    }

    if (x1 < rx1 && x2 < rx1)
        || (x1 > rx2 && x2 > rx2)
        || (y1 < ry1 && y2 < ry1)
        || (y1 > ry2 && y2 > ry2)
    {
        return None;
    }

    let point = |x: i64, y: i64| Point::new(x as i32, y as i32);

    if y1 == y2 {
        return Some((point(x1.clamp(rx1, rx2), y1), point(x2.clamp(rx1, rx2), y2)));
    }
    if x1 == x2 {
        return Some((point(x1, y1.clamp(ry1, ry2)), point(x2, y2.clamp(ry1, ry2))));
    }

    let mut code1 = outcode(rect, x1, y1);
    let mut code2 = outcode(rect, x2, y2);
    while code1 != 0 || code2 != 0 {
        if code1 & code2 != 0 {
            return None;
        }
        let code = if code1 != 0 { code1 } else { code2 };
        let (x, y) = if code & CODE_TOP != 0 {
            (x1 + (x2 - x1) * (ry1 - y1) / (y2 - y1), ry1)
        } else if code & CODE_BOTTOM != 0 {
            (x1 + (x2 - x1) * (ry2 - y1) / (y2 - y1), ry2)
        } else if code & CODE_LEFT != 0 {
            (rx1, y1 + (y2 - y1) * (rx1 - x1) / (x2 - x1))
        } else {
            (rx2, y1 + (y2 - y1) * (rx2 - x1) / (x2 - x1))
        };
        if code1 != 0 {
            x1 = x;
            y1 = y;
            code1 = outcode(rect, x, y);
        } else {
            x2 = x;
            y2 = y;
            code2 = outcode(rect, x, y);
        }
    }
    Some((point(x1, y1), point(x2, y2)))
}

// ============================================================================
// Tests
// ============================================================================
