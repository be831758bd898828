//! Foundation geometry types shared by every drawing routine.
//!
//! Integer rectangles are stored as origin plus extent (`x, y, w, h`), the
//! convention used by surfaces, clip rectangles and recorded commands.
//! Float variants exist only at the recording boundary; everything is
//! truncated to integers before rasterization.

// ============================================================================
// Rounding helpers
// ============================================================================

/// Floor a double to the nearest integer toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling of a double as a signed integer.
#[inline]
pub fn iceil(v: f64) -> i32 {
    v.ceil() as i32
}

// ============================================================================
// Points
// ============================================================================

/// An integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A sub-pixel coordinate as accepted by the command recorder.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FPoint {
    pub x: f32,
    pub y: f32,
}

impl FPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Rect
// ============================================================================

/// An integer rectangle: origin plus width and height.
///
/// A rectangle with `w <= 0` or `h <= 0` is empty and covers no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle anchored at the origin.
    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// One past the last column, saturated at `i32::MAX`.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// One past the last row, saturated at `i32::MAX`.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Returns `true` if the pixel (x, y) lies inside the rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// The same rectangle moved by (dx, dy). The origin saturates.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.w, self.h)
    }

    /// Intersection of two rectangles.
    ///
    /// Returns `None` if either input is empty or they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        let w = x2 as i64 - x1 as i64;
        let h = y2 as i64 - y1 as i64;
        if w <= 0 || h <= 0 {
            return None;
        }
        Some(Rect::new(x1, y1, w as i32, h as i32))
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    pub fn has_intersection(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }
}

/// A sub-pixel rectangle as accepted by the command recorder.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

// ============================================================================
// Tests
// ============================================================================
