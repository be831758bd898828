//! Pixel surfaces: owned buffers with a clip rectangle, and borrowed views
//! carrying their own blit attributes.
//!
//! Rows are `pitch` bytes apart, top-down. The pitch is at least the packed
//! row size and, for surfaces allocated here, rounded up to 4 bytes.

use crate::basics::Rect;
use crate::blend::BlendMode;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::pixel_codec::read_pixel;
use crate::pixfmt::{PixelFormat, PixelFormatEnum};

// ============================================================================
// Blit attributes
// ============================================================================

/// State consulted when a surface is the source of a blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitAttrs {
    /// Source pixels whose RGB bits equal the key are skipped.
    pub color_key: Option<u32>,
    pub color_mod: [u8; 3],
    pub alpha_mod: u8,
    pub blend_mode: BlendMode,
}

impl Default for BlitAttrs {
    fn default() -> Self {
        Self {
            color_key: None,
            color_mod: [255; 3],
            alpha_mod: 255,
            blend_mode: BlendMode::None,
        }
    }
}

impl BlitAttrs {
    /// Returns `true` if color or alpha modulation changes any channel.
    pub fn has_modulation(&self) -> bool {
        self.color_mod != [255; 3] || self.alpha_mod != 255
    }
}

/// Bytes in one packed row of `w` pixels.
fn row_bytes(format: &PixelFormat, w: i32) -> usize {
    let w = w as usize;
    if format.bits_per_pixel < 8 {
        (w * format.bits_per_pixel as usize + 7) / 8
    } else {
        w * format.bytes_per_pixel as usize
    }
}

// ============================================================================
// Surface
// ============================================================================

/// An owned rectangular pixel buffer.
#[derive(Debug, Clone)]
pub struct Surface {
    format: PixelFormat,
    w: i32,
    h: i32,
    pitch: usize,
    pixels: Vec<u8>,
    clip_rect: Rect,
    attrs: BlitAttrs,
    rle: bool,
}

impl Surface {
    /// Allocate a zeroed surface of a known format.
    pub fn new(w: i32, h: i32, format: PixelFormatEnum) -> Result<Self> {
        Self::with_format(w, h, PixelFormat::new(format)?)
    }

    /// Allocate a zeroed surface with an explicit layout.
    ///
    /// Layouts with alpha default to [`BlendMode::Blend`] as blit source.
    pub fn with_format(w: i32, h: i32, format: PixelFormat) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParam {
                op: "Surface::new",
                param: "size",
            });
        }
        let pitch = (row_bytes(&format, w) + 3) & !3;
        let len = pitch
            .checked_mul(h as usize)
            .ok_or(Error::OutOfMemory { what: "surface" })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory { what: "surface" })?;
        pixels.resize(len, 0);
        Ok(Self::assemble(w, h, pitch, format, pixels))
    }

    /// Wrap existing pixel data.
    pub fn from_pixels(
        w: i32,
        h: i32,
        pitch: usize,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParam {
                op: "Surface::from_pixels",
                param: "size",
            });
        }
        if pitch < row_bytes(&format, w) {
            return Err(Error::InvalidParam {
                op: "Surface::from_pixels",
                param: "pitch",
            });
        }
        let needed = pitch.checked_mul(h as usize);
        if needed.map_or(true, |n| pixels.len() < n) {
            return Err(Error::InvalidParam {
                op: "Surface::from_pixels",
                param: "pixels",
            });
        }
        Ok(Self::assemble(w, h, pitch, format, pixels))
    }

    fn assemble(w: i32, h: i32, pitch: usize, format: PixelFormat, pixels: Vec<u8>) -> Self {
        let attrs = BlitAttrs {
            blend_mode: if format.has_alpha() {
                BlendMode::Blend
            } else {
                BlendMode::None
            },
            ..BlitAttrs::default()
        };
        Self {
            format,
            w,
            h,
            pitch,
            pixels,
            clip_rect: Rect::from_size(w, h),
            attrs,
            rle: false,
        }
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.w, self.h)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip_rect
    }

    /// Restrict drawing to `rect` intersected with the surface bounds;
    /// `None` restores the full surface.
    ///
    /// Returns `true` if the resulting clip rectangle is not empty.
    pub fn set_clip_rect(&mut self, rect: Option<Rect>) -> bool {
        let bounds = self.bounds();
        self.clip_rect = match rect {
            None => bounds,
            Some(r) => r
                .intersect(&bounds)
                .unwrap_or_else(|| Rect::new(bounds.x, bounds.y, 0, 0)),
        };
        !self.clip_rect.is_empty()
    }

    pub fn attrs(&self) -> &BlitAttrs {
        &self.attrs
    }

    pub fn set_color_key(&mut self, key: Option<u32>) {
        self.attrs.color_key = key;
    }

    pub fn set_color_mod(&mut self, r: u8, g: u8, b: u8) {
        self.attrs.color_mod = [r, g, b];
    }

    pub fn set_alpha_mod(&mut self, a: u8) {
        self.attrs.alpha_mod = a;
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.attrs.blend_mode = mode;
    }

    /// Run-length encoding hint. Scaled blits cannot target an RLE
    /// surface, so scaling into one clears it.
    pub fn has_rle(&self) -> bool {
        self.rle
    }

    pub fn set_rle(&mut self, rle: bool) {
        self.rle = rle;
    }

    /// Fails with [`Error::UnsupportedDepth`] below 8 bits per pixel.
    pub(crate) fn require_depth(&self, op: &'static str) -> Result<()> {
        if self.format.bits_per_pixel < 8 {
            return Err(Error::UnsupportedDepth {
                op,
                bits: self.format.bits_per_pixel,
            });
        }
        Ok(())
    }

    /// Byte width for raw-value writes: 1, 2 or 4 bytes per pixel.
    pub(crate) fn raw_write_width(&self, op: &'static str) -> Result<usize> {
        self.require_depth(op)?;
        match self.format.bytes_per_pixel {
            n @ (1 | 2 | 4) => Ok(n as usize),
            _ => Err(Error::UnsupportedFormat {
                op,
                format: self.format.format,
            }),
        }
    }

    /// Byte offset of pixel (x, y). The caller guarantees it is in bounds.
    #[inline]
    pub(crate) fn offset_of(&self, x: i32, y: i32) -> usize {
        y as usize * self.pitch + x as usize * self.format.bytes_per_pixel as usize
    }

    /// Raw value of pixel (x, y), or `None` outside the surface.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if !self.bounds().contains(x, y) || self.format.bits_per_pixel < 8 {
            return None;
        }
        let o = self.offset_of(x, y);
        Some(read_pixel(
            &self.pixels[o..],
            self.format.bytes_per_pixel as usize,
        ))
    }

    /// Decoded color of pixel (x, y), or `None` outside the surface.
    pub fn get_color(&self, x: i32, y: i32) -> Option<Color> {
        let (r, g, b, a) = self.format.get_rgba(self.get_pixel(x, y)?);
        Some(Color::new(r, g, b, a))
    }

    /// Borrow the pixels with a copy of this surface's blit attributes.
    pub fn view(&self) -> SurfaceView<'_> {
        SurfaceView {
            format: self.format.clone(),
            w: self.w,
            h: self.h,
            pitch: self.pitch,
            pixels: &self.pixels,
            attrs: self.attrs,
        }
    }
}

// ============================================================================
// SurfaceView
// ============================================================================

/// Read-only alias of a surface's pixels whose blit attributes (and, for
/// [`SurfaceView::without_alpha`], format) can change independently of the
/// owner.
#[derive(Debug, Clone)]
pub struct SurfaceView<'a> {
    format: PixelFormat,
    w: i32,
    h: i32,
    pitch: usize,
    pixels: &'a [u8],
    pub attrs: BlitAttrs,
}

impl<'a> SurfaceView<'a> {
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.w, self.h)
    }

    pub(crate) fn pitch(&self) -> usize {
        self.pitch
    }

    pub(crate) fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// The same pixels read as if the alpha channel were absent, with the
    /// given blend mode.
    pub fn without_alpha(&self, blend_mode: BlendMode) -> SurfaceView<'a> {
        SurfaceView {
            format: self.format.without_alpha(),
            attrs: BlitAttrs {
                blend_mode,
                ..self.attrs
            },
            ..self.clone()
        }
    }

    /// Raw value of pixel (x, y). The caller guarantees it is in bounds.
    #[inline]
    pub(crate) fn pixel_at(&self, x: i32, y: i32) -> u32 {
        let bpp = self.format.bytes_per_pixel as usize;
        let o = y as usize * self.pitch + x as usize * bpp;
        read_pixel(&self.pixels[o..], bpp)
    }
}

// ============================================================================
// Tests
// ============================================================================
