//! Pixel format descriptions and color mapping.
//!
//! A [`PixelFormat`] describes how a packed pixel value is laid out: its
//! depth, bytes per pixel, and a mask/shift/loss triple per channel. Known
//! layouts carry a [`PixelFormatEnum`] tag; anything else built from raw masks
//! is tagged `Unknown` and handled purely through its masks.
//!
//! Depth reporting follows one rule: formats up to 2 bytes wide report their
//! significant bits (XRGB1555 reports 15), wider formats report
//! `8 * bytes_per_pixel` (XRGB8888 reports 32).

use crate::color::{expand_byte, Color};
use crate::error::{Error, Result};

// ============================================================================
// PixelFormatEnum
// ============================================================================

/// Well-known pixel layouts.
///
/// Multi-byte packed formats are stored in native byte order. The 24-bit array
/// formats name their byte order in memory (`Rgb24` stores R first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormatEnum {
    Unknown,
    Index1Lsb,
    Index1Msb,
    Index4Lsb,
    Index4Msb,
    Index8,
    Rgb332,
    Xrgb4444,
    Argb4444,
    Rgba4444,
    Xrgb1555,
    Argb1555,
    Rgb565,
    Bgr565,
    Rgb24,
    Bgr24,
    Xrgb8888,
    Xbgr8888,
    Argb8888,
    Rgba8888,
    Abgr8888,
    Bgra8888,
}

/// Channel masks of a packed layout, as `(bits, r, g, b, a)`.
type Masks = (u8, u32, u32, u32, u32);

impl PixelFormatEnum {
    pub const RGB555: PixelFormatEnum = PixelFormatEnum::Xrgb1555;
    pub const RGB888: PixelFormatEnum = PixelFormatEnum::Xrgb8888;

    const PACKED: [PixelFormatEnum; 16] = [
        PixelFormatEnum::Rgb332,
        PixelFormatEnum::Xrgb4444,
        PixelFormatEnum::Argb4444,
        PixelFormatEnum::Rgba4444,
        PixelFormatEnum::Xrgb1555,
        PixelFormatEnum::Argb1555,
        PixelFormatEnum::Rgb565,
        PixelFormatEnum::Bgr565,
        PixelFormatEnum::Rgb24,
        PixelFormatEnum::Bgr24,
        PixelFormatEnum::Xrgb8888,
        PixelFormatEnum::Xbgr8888,
        PixelFormatEnum::Argb8888,
        PixelFormatEnum::Rgba8888,
        PixelFormatEnum::Abgr8888,
        PixelFormatEnum::Bgra8888,
    ];

    /// Significant bits and channel masks. Indexed formats have zero masks.
    fn masks(self) -> Masks {
        use PixelFormatEnum::*;
        match self {
            Unknown => (0, 0, 0, 0, 0),
            Index1Lsb | Index1Msb => (1, 0, 0, 0, 0),
            Index4Lsb | Index4Msb => (4, 0, 0, 0, 0),
            Index8 => (8, 0, 0, 0, 0),
            Rgb332 => (8, 0xE0, 0x1C, 0x03, 0),
            Xrgb4444 => (12, 0x0F00, 0x00F0, 0x000F, 0),
            Argb4444 => (16, 0x0F00, 0x00F0, 0x000F, 0xF000),
            Rgba4444 => (16, 0xF000, 0x0F00, 0x00F0, 0x000F),
            Xrgb1555 => (15, 0x7C00, 0x03E0, 0x001F, 0),
            Argb1555 => (16, 0x7C00, 0x03E0, 0x001F, 0x8000),
            Rgb565 => (16, 0xF800, 0x07E0, 0x001F, 0),
            Bgr565 => (16, 0x001F, 0x07E0, 0xF800, 0),
            Rgb24 => (24, 0x0000FF, 0x00FF00, 0xFF0000, 0),
            Bgr24 => (24, 0xFF0000, 0x00FF00, 0x0000FF, 0),
            Xrgb8888 => (24, 0x00FF0000, 0x0000FF00, 0x000000FF, 0),
            Xbgr8888 => (24, 0x000000FF, 0x0000FF00, 0x00FF0000, 0),
            Argb8888 => (32, 0x00FF0000, 0x0000FF00, 0x000000FF, 0xFF000000),
            Rgba8888 => (32, 0xFF000000, 0x00FF0000, 0x0000FF00, 0x000000FF),
            Abgr8888 => (32, 0x000000FF, 0x0000FF00, 0x00FF0000, 0xFF000000),
            Bgra8888 => (32, 0x0000FF00, 0x00FF0000, 0xFF000000, 0x000000FF),
        }
    }

    pub fn bytes_per_pixel(self) -> u8 {
        use PixelFormatEnum::*;
        match self {
            Unknown => 0,
            Index1Lsb | Index1Msb | Index4Lsb | Index4Msb | Index8 | Rgb332 => 1,
            Xrgb4444 | Argb4444 | Rgba4444 | Xrgb1555 | Argb1555 | Rgb565 | Bgr565 => 2,
            Rgb24 | Bgr24 => 3,
            Xrgb8888 | Xbgr8888 | Argb8888 | Rgba8888 | Abgr8888 | Bgra8888 => 4,
        }
    }

    pub fn is_indexed(self) -> bool {
        use PixelFormatEnum::*;
        matches!(self, Index1Lsb | Index1Msb | Index4Lsb | Index4Msb | Index8)
    }

    /// Returns `true` for the 32-bit layouts with four 8-bit fields.
    pub fn is_packed_8888(self) -> bool {
        use PixelFormatEnum::*;
        matches!(
            self,
            Xrgb8888 | Xbgr8888 | Argb8888 | Rgba8888 | Abgr8888 | Bgra8888
        )
    }

    /// Identify a packed layout from its depth and channel masks.
    pub fn from_masks(bpp: u8, rmask: u32, gmask: u32, bmask: u32, amask: u32) -> Self {
        let bytes = (bpp + 7) / 8;
        Self::PACKED
            .iter()
            .copied()
            .find(|f| {
                let (_, r, g, b, a) = f.masks();
                f.bytes_per_pixel() == bytes
                    && r == rmask
                    && g == gmask
                    && b == bmask
                    && a == amask
            })
            .unwrap_or(PixelFormatEnum::Unknown)
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Color table of an indexed format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Color>,
}

impl Palette {
    /// A grayscale ramp of `n` entries from black to white.
    pub fn grayscale(n: usize) -> Self {
        let colors = (0..n)
            .map(|i| {
                let v = if n > 1 { (i * 255 / (n - 1)) as u8 } else { 0 };
                Color::rgb(v, v, v)
            })
            .collect();
        Self { colors }
    }

    /// Index of the entry closest to (r, g, b, a) by squared distance.
    pub fn find_color(&self, r: u8, g: u8, b: u8, a: u8) -> u32 {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let dr = c.r as i32 - r as i32;
            let dg = c.g as i32 - g as i32;
            let db = c.b as i32 - b as i32;
            let da = c.a as i32 - a as i32;
            let dist = (dr * dr + dg * dg + db * db + da * da) as u32;
            if dist < best_dist {
                best = i as u32;
                if dist == 0 {
                    break;
                }
                best_dist = dist;
            }
        }
        best
    }
}

// ============================================================================
// PixelFormat
// ============================================================================

#[inline]
fn mask_shift(mask: u32) -> u8 {
    if mask == 0 {
        0
    } else {
        mask.trailing_zeros() as u8
    }
}

#[inline]
fn mask_loss(mask: u32) -> u8 {
    8u32.saturating_sub(mask.count_ones()) as u8
}

/// Full description of a pixel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFormat {
    pub format: PixelFormatEnum,
    pub bits_per_pixel: u8,
    pub bytes_per_pixel: u8,
    pub rmask: u32,
    pub gmask: u32,
    pub bmask: u32,
    pub amask: u32,
    pub rshift: u8,
    pub gshift: u8,
    pub bshift: u8,
    pub ashift: u8,
    pub rloss: u8,
    pub gloss: u8,
    pub bloss: u8,
    pub aloss: u8,
    pub palette: Option<Palette>,
}

impl PixelFormat {
    /// Describe a known layout. Indexed formats get a grayscale palette.
    pub fn new(format: PixelFormatEnum) -> Result<Self> {
        if format == PixelFormatEnum::Unknown {
            return Err(Error::InvalidParam {
                op: "PixelFormat::new",
                param: "format",
            });
        }
        let (bits, r, g, b, a) = format.masks();
        let mut pf = Self::build(format, bits, format.bytes_per_pixel(), r, g, b, a);
        if format.is_indexed() {
            pf.palette = Some(Palette::grayscale(1usize << bits));
        }
        Ok(pf)
    }

    /// Describe a packed layout from raw masks.
    ///
    /// Known layouts are recognised and tagged; others become `Unknown` but
    /// remain fully usable through the generic mask-driven paths.
    pub fn from_masks(bpp: u8, rmask: u32, gmask: u32, bmask: u32, amask: u32) -> Result<Self> {
        if !matches!(bpp, 8 | 12 | 15 | 16 | 24 | 32) {
            return Err(Error::InvalidParam {
                op: "PixelFormat::from_masks",
                param: "bpp",
            });
        }
        let bytes = (bpp + 7) / 8;
        let width_bits = bytes as u32 * 8;
        let all = rmask | gmask | bmask | amask;
        if width_bits < 32 && all >> width_bits != 0 {
            return Err(Error::InvalidParam {
                op: "PixelFormat::from_masks",
                param: "mask",
            });
        }
        let format = PixelFormatEnum::from_masks(bpp, rmask, gmask, bmask, amask);
        let bits = match format {
            PixelFormatEnum::Unknown => bpp,
            known => known.masks().0,
        };
        Ok(Self::build(format, bits, bytes, rmask, gmask, bmask, amask))
    }

    fn build(
        format: PixelFormatEnum,
        bits: u8,
        bytes: u8,
        rmask: u32,
        gmask: u32,
        bmask: u32,
        amask: u32,
    ) -> Self {
        let bits_per_pixel = if bytes <= 2 { bits } else { bytes * 8 };
        Self {
            format,
            bits_per_pixel,
            bytes_per_pixel: bytes,
            rmask,
            gmask,
            bmask,
            amask,
            rshift: mask_shift(rmask),
            gshift: mask_shift(gmask),
            bshift: mask_shift(bmask),
            ashift: mask_shift(amask),
            rloss: mask_loss(rmask),
            gloss: mask_loss(gmask),
            bloss: mask_loss(bmask),
            aloss: mask_loss(amask),
            palette: None,
        }
    }

    /// The same layout with its alpha channel removed.
    pub fn without_alpha(&self) -> Self {
        let format = PixelFormatEnum::from_masks(
            self.bytes_per_pixel * 8,
            self.rmask,
            self.gmask,
            self.bmask,
            0,
        );
        let bits = match format {
            PixelFormatEnum::Unknown => self.bits_per_pixel,
            known => known.masks().0,
        };
        Self::build(
            format,
            bits,
            self.bytes_per_pixel,
            self.rmask,
            self.gmask,
            self.bmask,
            0,
        )
    }

    pub fn has_alpha(&self) -> bool {
        self.amask != 0
    }

    pub fn is_indexed(&self) -> bool {
        self.palette.is_some()
    }

    /// Map an opaque color to a pixel value. Any alpha bits are set.
    pub fn map_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        match &self.palette {
            Some(pal) => pal.find_color(r, g, b, 255),
            None => {
                (((r as u32) >> self.rloss) << self.rshift)
                    | (((g as u32) >> self.gloss) << self.gshift)
                    | (((b as u32) >> self.bloss) << self.bshift)
                    | self.amask
            }
        }
    }

    /// Map a color to a pixel value. Alpha is dropped by formats without it.
    pub fn map_rgba(&self, r: u8, g: u8, b: u8, a: u8) -> u32 {
        match &self.palette {
            Some(pal) => pal.find_color(r, g, b, a),
            None => {
                (((r as u32) >> self.rloss) << self.rshift)
                    | (((g as u32) >> self.gloss) << self.gshift)
                    | (((b as u32) >> self.bloss) << self.bshift)
                    | ((((a as u32) >> self.aloss) << self.ashift) & self.amask)
            }
        }
    }

    pub fn map_color(&self, c: Color) -> u32 {
        self.map_rgba(c.r, c.g, c.b, c.a)
    }

    /// Decompose a pixel value into (r, g, b).
    pub fn get_rgb(&self, pixel: u32) -> (u8, u8, u8) {
        let (r, g, b, _) = self.get_rgba(pixel);
        (r, g, b)
    }

    /// Decompose a pixel value into (r, g, b, a). Formats without alpha
    /// report 255.
    pub fn get_rgba(&self, pixel: u32) -> (u8, u8, u8, u8) {
        if let Some(pal) = &self.palette {
            return match pal.colors.get(pixel as usize) {
                Some(c) => (c.r, c.g, c.b, c.a),
                None => (0, 0, 0, 0),
            };
        }
        let r = expand_byte(self.rloss, (pixel & self.rmask) >> self.rshift);
        let g = expand_byte(self.gloss, (pixel & self.gmask) >> self.gshift);
        let b = expand_byte(self.bloss, (pixel & self.bmask) >> self.bshift);
        let a = if self.amask != 0 {
            expand_byte(self.aloss, (pixel & self.amask) >> self.ashift)
        } else {
            255
        };
        (r, g, b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
