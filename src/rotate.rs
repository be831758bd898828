//! Surface rotation about an arbitrary center.
//!
//! [`rotozoom_size_trig`] finds where a `w x h` box lands after rotation;
//! [`rotate_surface`] produces the rotated pixels by mapping each output
//! pixel center back into the source. Positive angles turn clockwise on
//! screen (y pointing down).

use crate::basics::{FPoint, Rect};
use crate::blend::BlendMode;
use crate::error::{Error, Result};
use crate::fill_rect::fill_rect;
use crate::pixel_codec::write_pixel;
use crate::surface::{Surface, SurfaceView};

/// Cosine and sine of `angle` degrees, exact for multiples of 90.
fn trig(angle: f64) -> (f64, f64) {
    if angle % 90.0 == 0.0 {
        match ((angle / 90.0) as i64).rem_euclid(4) {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        }
    } else {
        let rad = angle.to_radians();
        (rad.cos(), rad.sin())
    }
}

/// Bounding box of the box `(0, 0, w, h)` rotated by `angle` degrees about
/// `center`, in the box's own coordinates, plus the cosine and sine used.
///
/// The box is widened to whole pixels with floor/ceil. For multiples of 90
/// degrees the trig is exact, so rotating a square about its middle by 90
/// returns the square itself.
pub fn rotozoom_size_trig(w: i32, h: i32, angle: f64, center: FPoint) -> (Rect, f64, f64) {
    let (cos, sin) = trig(angle);
    let (cx, cy) = (center.x as f64, center.y as f64);
    let corners = [
        (0.0, 0.0),
        (w as f64, 0.0),
        (0.0, h as f64),
        (w as f64, h as f64),
    ];

    let mut min = (f64::MAX, f64::MAX);
    let mut max = (f64::MIN, f64::MIN);
    for (x, y) in corners {
        let (dx, dy) = (x - cx, y - cy);
        let rx = cx + dx * cos - dy * sin;
        let ry = cy + dx * sin + dy * cos;
        min = (min.0.min(rx), min.1.min(ry));
        max = (max.0.max(rx), max.1.max(ry));
    }

    let x = min.0.floor() as i32;
    let y = min.1.floor() as i32;
    let rect = Rect::new(x, y, max.0.ceil() as i32 - x, max.1.ceil() as i32 - y);
    (rect, cos, sin)
}

/// Rotate `src` into a new surface of `rect_dest` size and the source
/// format.
///
/// The source must be 32-bit with an alpha channel, or 8-bit with a color
/// key. Output pixels not covered by the source are left as the fill:
/// the color key when the source has one; transparent black, blitted with
/// BLEND, for a NONE source; transparent white, keyed, for MOD and MUL.
/// Flips apply in source space before rotation. `smooth` selects bilinear
/// sampling, which only 32-bit sources rotated off the 90-degree grid use.
#[allow(clippy::too_many_arguments)]
pub fn rotate_surface(
    src: &SurfaceView<'_>,
    angle: f64,
    smooth: bool,
    flip_h: bool,
    flip_v: bool,
    rect_dest: &Rect,
    cos: f64,
    sin: f64,
    center: FPoint,
) -> Result<Surface> {
    let fmt = src.format();
    let keyed = src.attrs.color_key;
    let wide = fmt.bits_per_pixel == 32 && fmt.has_alpha();
    let narrow = fmt.bits_per_pixel == 8 && keyed.is_some();
    if !(wide || narrow) {
        return Err(Error::Rotation);
    }

    let mut out = Surface::with_format(rect_dest.w, rect_dest.h, fmt.clone())?;
    let mut mode = src.attrs.blend_mode;
    let fill = if let Some(key) = keyed {
        out.set_color_key(Some(key));
        key
    } else {
        match mode {
            BlendMode::None => {
                mode = BlendMode::Blend;
                0
            }
            BlendMode::Mod | BlendMode::Mul => {
                let white = fmt.map_rgba(255, 255, 255, 0);
                out.set_color_key(Some(white));
                white
            }
            BlendMode::Blend | BlendMode::Add => 0,
        }
    };
    out.set_blend_mode(mode);
    if fill != 0 {
        fill_rect(&mut out, None, fill)?;
    }

    let smooth = smooth && wide && angle % 90.0 != 0.0;
    let sampler = Sampler {
        src,
        fill,
        w: src.width() as f64,
        h: src.height() as f64,
        flip_h,
        flip_v,
    };
    let (cx, cy) = (center.x as f64, center.y as f64);
    let bytes = fmt.bytes_per_pixel as usize;

    for oy in 0..rect_dest.h {
        for ox in 0..rect_dest.w {
            let px = (rect_dest.x + ox) as f64 + 0.5 - cx;
            let py = (rect_dest.y + oy) as f64 + 0.5 - cy;
            let sx = cx + px * cos + py * sin;
            let sy = cy - px * sin + py * cos;
            let value = if smooth {
                sampler.bilinear(sx, sy)
            } else {
                sampler.nearest(sx, sy)
            };
            if let Some(v) = value {
                let o = out.offset_of(ox, oy);
                write_pixel(&mut out.pixels_mut()[o..], bytes, v);
            }
        }
    }
    Ok(out)
}

struct Sampler<'a, 'b> {
    src: &'a SurfaceView<'b>,
    fill: u32,
    w: f64,
    h: f64,
    flip_h: bool,
    flip_v: bool,
}

impl Sampler<'_, '_> {
    /// Apply flips to a continuous source position.
    #[inline]
    fn flip(&self, x: f64, y: f64) -> (f64, f64) {
        (
            if self.flip_h { self.w - x } else { x },
            if self.flip_v { self.h - y } else { y },
        )
    }

    #[inline]
    fn raw(&self, x: i32, y: i32) -> Option<u32> {
        self.src
            .bounds()
            .contains(x, y)
            .then(|| self.src.pixel_at(x, y))
    }

    fn nearest(&self, x: f64, y: f64) -> Option<u32> {
        let (x, y) = self.flip(x, y);
        self.raw(x.floor() as i32, y.floor() as i32)
    }

    /// Mix the four pixels around (x, y); neighbours outside the source
    /// read as the fill value. Returns `None` when all four are outside.
    fn bilinear(&self, x: f64, y: f64) -> Option<u32> {
        let (x, y) = self.flip(x, y);
        let (fx, fy) = (x - 0.5, y - 0.5);
        let (x0, y0) = (fx.floor() as i32, fy.floor() as i32);
        let wx = ((fx - x0 as f64) * 256.0) as u32;
        let wy = ((fy - y0 as f64) * 256.0) as u32;

        let taps = [
            self.raw(x0, y0),
            self.raw(x0 + 1, y0),
            self.raw(x0, y0 + 1),
            self.raw(x0 + 1, y0 + 1),
        ];
        if taps.iter().all(Option::is_none) {
            return None;
        }
        let weights = [
            (256 - wx) * (256 - wy),
            wx * (256 - wy),
            (256 - wx) * wy,
            wx * wy,
        ];
        let fmt = self.src.format();
        let mut acc = [0u32; 4];
        for (tap, w) in taps.iter().zip(weights) {
            let (r, g, b, a) = fmt.get_rgba(tap.unwrap_or(self.fill));
            acc[0] += r as u32 * w;
            acc[1] += g as u32 * w;
            acc[2] += b as u32 * w;
            acc[3] += a as u32 * w;
        }
        Some(fmt.map_rgba(
            (acc[0] >> 16) as u8,
            (acc[1] >> 16) as u8,
            (acc[2] >> 16) as u8,
            (acc[3] >> 16) as u8,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pixfmt::PixelFormatEnum;

    fn quadrants() -> Surface {
        // 4x4 with a distinct color per 2x2 quadrant.
        let mut s = Surface::new(4, 4, PixelFormatEnum::Argb8888).unwrap();
        let colors = [
            Color::new(255, 0, 0, 255),
            Color::new(0, 255, 0, 255),
            Color::new(0, 0, 255, 255),
            Color::new(255, 255, 0, 255),
        ];
        for (i, c) in colors.iter().enumerate() {
            let v = s.format().map_color(*c);
            let r = Rect::new((i as i32 % 2) * 2, (i as i32 / 2) * 2, 2, 2);
            fill_rect(&mut s, Some(r), v).unwrap();
        }
        s
    }

    #[test]
    fn test_size_square_quarter_turn() {
        let (r, cos, sin) = rotozoom_size_trig(10, 10, 90.0, FPoint::new(5.0, 5.0));
        assert_eq!(r, Rect::new(0, 0, 10, 10));
        assert_eq!((cos, sin), (0.0, 1.0));
    }

    #[test]
    fn test_size_rectangle_quarter_turn() {
        let (r, _, _) = rotozoom_size_trig(8, 4, -90.0, FPoint::new(4.0, 2.0));
        assert_eq!(r, Rect::new(2, -2, 4, 8));
    }

    #[test]
    fn test_size_45_degrees_grows() {
        let (r, _, _) = rotozoom_size_trig(10, 10, 45.0, FPoint::new(5.0, 5.0));
        assert_eq!(r, Rect::new(-3, -3, 16, 16));
    }

    #[test]
    fn test_trig_exact_multiples() {
        assert_eq!(trig(180.0), (-1.0, 0.0));
        assert_eq!(trig(-90.0), (0.0, -1.0));
        assert_eq!(trig(720.0), (1.0, 0.0));
    }

    #[test]
    fn test_rotate_quarter_turn_clockwise() {
        let src = quadrants();
        let center = FPoint::new(2.0, 2.0);
        let (rect, cos, sin) = rotozoom_size_trig(4, 4, 90.0, center);
        let out = rotate_surface(&src.view(), 90.0, false, false, false, &rect, cos, sin, center)
            .unwrap();
        // top-left (red) moves to top-right
        assert_eq!(out.get_color(3, 0), src.get_color(0, 0));
        assert_eq!(out.get_color(0, 0), src.get_color(0, 3));
        assert_eq!(out.get_color(3, 3), src.get_color(3, 0));
        assert_eq!(out.get_color(0, 3), src.get_color(3, 3));
    }

    #[test]
    fn test_rotate_flip_horizontal() {
        let src = quadrants();
        let center = FPoint::new(2.0, 2.0);
        let (rect, cos, sin) = rotozoom_size_trig(4, 4, 0.0, center);
        let out = rotate_surface(&src.view(), 0.0, false, true, false, &rect, cos, sin, center)
            .unwrap();
        assert_eq!(out.get_color(0, 0), src.get_color(3, 0));
        assert_eq!(out.get_color(3, 3), src.get_color(0, 3));
    }

    #[test]
    fn test_uncovered_pixels_and_modes() {
        let mut src = quadrants();
        src.set_blend_mode(BlendMode::None);
        let center = FPoint::new(2.0, 2.0);
        let (rect, cos, sin) = rotozoom_size_trig(4, 4, 45.0, center);
        let out = rotate_surface(&src.view(), 45.0, true, false, false, &rect, cos, sin, center)
            .unwrap();
        assert_eq!(out.attrs().blend_mode, BlendMode::Blend);
        assert_eq!(out.get_pixel(0, 0), Some(0));

        src.set_blend_mode(BlendMode::Mod);
        let out = rotate_surface(&src.view(), 45.0, false, false, false, &rect, cos, sin, center)
            .unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(0x00FF_FFFF));
        assert_eq!(out.attrs().color_key, Some(0x00FF_FFFF));
        assert_eq!(out.attrs().blend_mode, BlendMode::Mod);
    }

    #[test]
    fn test_rejects_unsupported_source() {
        let src = Surface::new(2, 2, PixelFormatEnum::RGB888).unwrap();
        let (rect, cos, sin) = rotozoom_size_trig(2, 2, 30.0, FPoint::new(1.0, 1.0));
        assert_eq!(
            rotate_surface(&src.view(), 30.0, false, false, false, &rect, cos, sin, FPoint::new(1.0, 1.0))
                .unwrap_err(),
            Error::Rotation
        );
    }

    #[test]
    fn test_keyed_8bit_source() {
        let mut src = Surface::new(2, 2, PixelFormatEnum::Index8).unwrap();
        src.pixels_mut()[..2].copy_from_slice(&[5, 6]);
        src.set_color_key(Some(9));
        let center = FPoint::new(1.0, 1.0);
        let (rect, cos, sin) = rotozoom_size_trig(2, 2, 180.0, center);
        let out = rotate_surface(&src.view(), 180.0, true, false, false, &rect, cos, sin, center)
            .unwrap();
        assert_eq!(out.attrs().color_key, Some(9));
        assert_eq!(out.get_pixel(1, 1), Some(5));
        assert_eq!(out.get_pixel(0, 1), Some(6));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }
}
