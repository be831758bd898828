//! Surface-to-surface blits with format conversion.
//!
//! Every source pixel goes through the same sequence: color key test,
//! decode, color and alpha modulation, premultiplication for BLEND and ADD,
//! then the blend formula against the decoded destination. Same-format
//! copies without any of those steps reduce to row copies.

use crate::basics::Rect;
use crate::blend::BlendMode;
use crate::error::{Error, Result};
use crate::pixel_codec::{read_pixel, write_pixel};
use crate::pixfmt::PixelFormat;
use crate::surface::{BlitAttrs, Surface, SurfaceView};

/// Sampling used when a blit changes size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ScaleMode {
    #[default]
    Nearest,
    /// Bilinear filtering over the 2x2 neighbourhood.
    Linear,
}

// ============================================================================
// Per-pixel composition
// ============================================================================

/// The source attributes of one blit, resolved for the inner loop.
struct Composer {
    mode: BlendMode,
    color_mod: [u32; 3],
    alpha_mod: u32,
    /// Color key and the mask it is compared under (RGB bits only).
    key: Option<(u32, u32)>,
}

impl Composer {
    fn new(attrs: &BlitAttrs, src: &PixelFormat) -> Self {
        let rgb_mask = !src.amask;
        Self {
            mode: attrs.blend_mode,
            color_mod: attrs.color_mod.map(u32::from),
            alpha_mod: attrs.alpha_mod as u32,
            key: attrs.color_key.map(|k| (k & rgb_mask, rgb_mask)),
        }
    }

    #[inline]
    fn is_keyed(&self, raw: u32) -> bool {
        matches!(self.key, Some((key, mask)) if raw & mask == key)
    }

    #[inline]
    fn compose(&self, s: [u32; 4], d: [u32; 4]) -> [u32; 4] {
        let [mut sr, mut sg, mut sb, mut sa] = s;
        let [dr, dg, db, da] = d;
        sr = sr * self.color_mod[0] / 255;
        sg = sg * self.color_mod[1] / 255;
        sb = sb * self.color_mod[2] / 255;
        sa = sa * self.alpha_mod / 255;
        if matches!(self.mode, BlendMode::Blend | BlendMode::Add) && sa < 255 {
            sr = sr * sa / 255;
            sg = sg * sa / 255;
            sb = sb * sa / 255;
        }
        let inva = 255 - sa;
        match self.mode {
            BlendMode::None => [sr, sg, sb, sa],
            BlendMode::Blend => [
                sr + inva * dr / 255,
                sg + inva * dg / 255,
                sb + inva * db / 255,
                sa + inva * da / 255,
            ],
            BlendMode::Add => [
                (sr + dr).min(255),
                (sg + dg).min(255),
                (sb + db).min(255),
                da,
            ],
            BlendMode::Mod => [sr * dr / 255, sg * dg / 255, sb * db / 255, da],
            BlendMode::Mul => [
                ((sr * dr + dr * inva) / 255).min(255),
                ((sg * dg + dg * inva) / 255).min(255),
                ((sb * db + db * inva) / 255).min(255),
                ((sa * da + da * inva) / 255).min(255),
            ],
        }
    }
}

#[inline]
fn decode(fmt: &PixelFormat, raw: u32) -> [u32; 4] {
    let (r, g, b, a) = fmt.get_rgba(raw);
    [r as u32, g as u32, b as u32, a as u32]
}

/// Composite one decoded source pixel onto destination pixel (x, y).
#[inline]
fn put(dst: &mut Surface, composer: &Composer, x: i32, y: i32, s: [u32; 4]) {
    let bytes = dst.format().bytes_per_pixel as usize;
    let o = dst.offset_of(x, y);
    let out = if composer.mode == BlendMode::None {
        composer.compose(s, [0; 4])
    } else {
        let d = decode(dst.format(), read_pixel(&dst.pixels()[o..], bytes));
        composer.compose(s, d)
    };
    let v = dst
        .format()
        .map_rgba(out[0] as u8, out[1] as u8, out[2] as u8, out[3] as u8);
    write_pixel(&mut dst.pixels_mut()[o..], bytes, v);
}

fn require_depth(src: &SurfaceView<'_>, dst: &Surface, op: &'static str) -> Result<()> {
    dst.require_depth(op)?;
    if src.format().bits_per_pixel < 8 {
        return Err(Error::UnsupportedDepth {
            op,
            bits: src.format().bits_per_pixel,
        });
    }
    Ok(())
}

// ============================================================================
// Unscaled blit
// ============================================================================

/// Copy `srcrect` of `src` (whole source for `None`) to the position of
/// `dstrect` (origin for `None`); only the position of `dstrect` is used.
///
/// The source rect is clipped to the source bounds and the result to the
/// destination clip rectangle. Returns the destination area written, which
/// may be empty.
pub fn blit_surface(
    src: &SurfaceView<'_>,
    srcrect: Option<Rect>,
    dst: &mut Surface,
    dstrect: Option<Rect>,
) -> Result<Rect> {
    require_depth(src, dst, "blit_surface")?;

    let sr = srcrect.unwrap_or_else(|| src.bounds());
    let (dx, dy) = dstrect.map_or((0, 0), |r| (r.x, r.y));
    let clip = dst.clip_rect();
    let (sx, dx, w) = clip_span(sr.x, sr.w, src.width(), dx, clip.x, clip.right());
    let (sy, dy, h) = clip_span(sr.y, sr.h, src.height(), dy, clip.y, clip.bottom());

    if w <= 0 || h <= 0 {
        return Ok(Rect::new(saturate(dx), saturate(dy), 0, 0));
    }
    // A non-empty span lies inside both surfaces.
    let sr = Rect::new(sx as i32, sy as i32, w as i32, h as i32);
    let area = Rect::new(dx as i32, dy as i32, w as i32, h as i32);

    let attrs = &src.attrs;
    if src.format() == dst.format()
        && attrs.color_key.is_none()
        && !attrs.has_modulation()
        && attrs.blend_mode == BlendMode::None
    {
        copy_rows(src, sr, dst, area);
        return Ok(area);
    }

    let composer = Composer::new(attrs, src.format());
    for row in 0..area.h {
        for col in 0..area.w {
            let raw = src.pixel_at(sr.x + col, sr.y + row);
            if composer.is_keyed(raw) {
                continue;
            }
            let s = decode(src.format(), raw);
            put(dst, &composer, area.x + col, area.y + row, s);
        }
    }
    Ok(area)
}

/// Clip one axis of an unscaled copy: the source span at `s` of length
/// `len` against `[0, src_len)`, placed at `d` and clipped to `[lo, hi)`.
/// Returns the clipped source start, destination start and length.
fn clip_span(s: i32, len: i32, src_len: i32, d: i32, lo: i32, hi: i32) -> (i64, i64, i64) {
    let (mut s, mut len, mut d) = (s as i64, len as i64, d as i64);
    if s < 0 {
        len += s;
        d -= s;
        s = 0;
    }
    len = len.min(src_len as i64 - s);
    let over = lo as i64 - d;
    if over > 0 {
        len -= over;
        s += over;
        d += over;
    }
    len = len.min(hi as i64 - d);
    (s, d, len)
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn copy_rows(src: &SurfaceView<'_>, sr: Rect, dst: &mut Surface, area: Rect) {
    let bytes = dst.format().bytes_per_pixel as usize;
    let span = area.w as usize * bytes;
    let sp = src.pitch();
    let dp = dst.pitch();
    let s0 = sr.y as usize * sp + sr.x as usize * bytes;
    let d0 = dst.offset_of(area.x, area.y);
    let spx = src.pixels();
    let dpx = dst.pixels_mut();
    for row in 0..area.h as usize {
        let s = s0 + row * sp;
        let d = d0 + row * dp;
        dpx[d..d + span].copy_from_slice(&spx[s..s + span]);
    }
}

// ============================================================================
// Scaled blit
// ============================================================================

/// Stretch `srcrect` of `src` onto `dstrect` of `dst` (whole surfaces for
/// `None`).
///
/// Each destination pixel inside the clip rectangle maps back into the
/// source with 16.16 fixed-point steps starting half a step in, so clipping
/// never shifts the image. Samples falling outside the source surface are
/// skipped. Equal sizes defer to [`blit_surface`].
pub fn blit_scaled(
    src: &SurfaceView<'_>,
    srcrect: Option<Rect>,
    dst: &mut Surface,
    dstrect: Option<Rect>,
    scale_mode: ScaleMode,
) -> Result<Rect> {
    require_depth(src, dst, "blit_scaled")?;

    let sr = srcrect.unwrap_or_else(|| src.bounds());
    let dr = dstrect.unwrap_or_else(|| dst.bounds());
    if sr.is_empty() || dr.is_empty() {
        return Ok(Rect::new(dr.x, dr.y, 0, 0));
    }
    if sr.w == dr.w && sr.h == dr.h {
        return blit_surface(src, Some(sr), dst, Some(dr));
    }
    let Some(area) = dr.intersect(&dst.clip_rect()) else {
        return Ok(Rect::new(dr.x, dr.y, 0, 0));
    };
    let Some(readable) = sr.intersect(&src.bounds()) else {
        return Ok(Rect::new(dr.x, dr.y, 0, 0));
    };

    let xs = Axis::new(sr.x, sr.w, dr.x, dr.w, readable.x, readable.w);
    let ys = Axis::new(sr.y, sr.h, dr.y, dr.h, readable.y, readable.h);
    let composer = Composer::new(&src.attrs, src.format());
    let fmt = src.format();

    for y in area.y..area.bottom() {
        let Some(sy) = ys.nearest(y) else {
            continue;
        };
        for x in area.x..area.right() {
            let Some(sx) = xs.nearest(x) else {
                continue;
            };
            let raw = src.pixel_at(sx, sy);
            if composer.is_keyed(raw) {
                continue;
            }
            let s = match scale_mode {
                ScaleMode::Nearest => decode(fmt, raw),
                ScaleMode::Linear => {
                    let (x0, x1, fx) = xs.linear(x);
                    let (y0, y1, fy) = ys.linear(y);
                    bilinear(
                        [
                            decode(fmt, src.pixel_at(x0, y0)),
                            decode(fmt, src.pixel_at(x1, y0)),
                            decode(fmt, src.pixel_at(x0, y1)),
                            decode(fmt, src.pixel_at(x1, y1)),
                        ],
                        fx,
                        fy,
                    )
                }
            };
            put(dst, &composer, x, y, s);
        }
    }
    Ok(area)
}

/// Destination-to-source mapping along one axis.
struct Axis {
    src_start: i32,
    dst_start: i32,
    inc: i64,
    lo: i32,
    hi: i32,
}

impl Axis {
    fn new(src_start: i32, src_len: i32, dst_start: i32, dst_len: i32, lo: i32, len: i32) -> Self {
        Self {
            src_start,
            dst_start,
            inc: ((src_len as i64) << 16) / dst_len as i64,
            lo,
            hi: lo + len - 1,
        }
    }

    /// Source position of destination pixel `d` in 16.16.
    #[inline]
    fn pos(&self, d: i32) -> i64 {
        let steps = d as i64 - self.dst_start as i64;
        (steps * self.inc + self.inc / 2) + ((self.src_start as i64) << 16)
    }

    #[inline]
    fn nearest(&self, d: i32) -> Option<i32> {
        let s = (self.pos(d) >> 16) as i32;
        (s >= self.lo && s <= self.hi).then_some(s)
    }

    /// Neighbouring source pixels and the 8-bit weight of the second.
    #[inline]
    fn linear(&self, d: i32) -> (i32, i32, u32) {
        let p = (self.pos(d) - 0x8000).clamp((self.lo as i64) << 16, (self.hi as i64) << 16);
        let s0 = (p >> 16) as i32;
        let s1 = (s0 + 1).min(self.hi);
        (s0, s1, ((p >> 8) & 0xFF) as u32)
    }
}

/// Weighted mix of a 2x2 neighbourhood ordered top-left, top-right,
/// bottom-left, bottom-right.
#[inline]
fn bilinear(px: [[u32; 4]; 4], fx: u32, fy: u32) -> [u32; 4] {
    let w = [
        (256 - fx) * (256 - fy),
        fx * (256 - fy),
        (256 - fx) * fy,
        fx * fy,
    ];
    let mut out = [0u32; 4];
    for (c, o) in out.iter_mut().enumerate() {
        *o = (px[0][c] * w[0] + px[1][c] * w[1] + px[2][c] * w[2] + px[3][c] * w[3]) >> 16;
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
