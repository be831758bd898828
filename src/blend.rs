//! Blend modes and the per-pixel compositing operators used by the point,
//! line and rect blenders.
//!
//! The source color reaching these operators has already been
//! premultiplied for [`BlendMode::Blend`] and [`BlendMode::Add`]; that
//! happens once per call in [`BlendSource::new`], never per pixel.

use crate::color::{mul255, Color};
use crate::pixel_codec::PixelCodec;

// ============================================================================
// BlendMode
// ============================================================================

/// Per-pixel compositing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BlendMode {
    /// Overwrite: `dst = src`.
    #[default]
    None,
    /// Source over: `dst = src + dst * (255 - srcA) / 255`.
    Blend,
    /// Additive: `dst = min(dst + src, 255)`.
    Add,
    /// Modulate: `dst = src * dst / 255`.
    Mod,
    /// Multiply: `dst = min(src * dst / 255 + dst * (255 - srcA) / 255, 255)`,
    /// alpha included.
    ///
    /// The second term scales the destination, not the source, so a fully
    /// transparent source leaves `dst` as is and an opaque white source is
    /// the identity. This differs from `src * dst + src * (255 - dstA)`
    /// forms found elsewhere.
    Mul,
}

impl BlendMode {
    /// Modes whose source color is premultiplied by its alpha before use.
    #[inline]
    pub fn premultiplies(self) -> bool {
        matches!(self, BlendMode::Blend | BlendMode::Add)
    }
}

// ============================================================================
// Blend operators
// ============================================================================

/// A source color prepared for one blend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlendSource {
    pub mode: BlendMode,
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
    pub inva: u32,
}

impl BlendSource {
    pub(crate) fn new(mode: BlendMode, color: Color) -> Self {
        let c = if mode.premultiplies() {
            color.premultiplied()
        } else {
            color
        };
        Self {
            mode,
            r: c.r as u32,
            g: c.g as u32,
            b: c.b as u32,
            a: c.a as u32,
            inva: 255 - c.a as u32,
        }
    }

    /// The source scaled to partial coverage for antialiased edges.
    ///
    /// Color is multiplied by the scaled alpha; NONE becomes BLEND so the
    /// partial pixel mixes with what is underneath.
    pub(crate) fn weighted(&self, weight: u32) -> Self {
        let a = mul255(self.a, weight);
        Self {
            mode: match self.mode {
                BlendMode::None => BlendMode::Blend,
                m => m,
            },
            r: mul255(self.r, a),
            g: mul255(self.g, a),
            b: mul255(self.b, a),
            a,
            inva: 255 - a,
        }
    }

    /// Composite this source over decoded destination channels.
    ///
    /// ADD and MOD leave destination alpha alone; NONE, BLEND and MUL
    /// produce a new alpha. Formats without alpha discard it on encode.
    #[inline]
    pub(crate) fn apply(&self, d: [u32; 4]) -> [u32; 4] {
        let [dr, dg, db, da] = d;
        match self.mode {
            BlendMode::None => [self.r, self.g, self.b, self.a],
            BlendMode::Blend => [
                mul255(self.inva, dr) + self.r,
                mul255(self.inva, dg) + self.g,
                mul255(self.inva, db) + self.b,
                mul255(self.inva, da) + self.a,
            ],
            BlendMode::Add => [
                (dr + self.r).min(255),
                (dg + self.g).min(255),
                (db + self.b).min(255),
                da,
            ],
            BlendMode::Mod => [mul255(dr, self.r), mul255(dg, self.g), mul255(db, self.b), da],
            BlendMode::Mul => [
                (mul255(dr, self.r) + mul255(self.inva, dr)).min(255),
                (mul255(dg, self.g) + mul255(self.inva, dg)).min(255),
                (mul255(db, self.b) + mul255(self.inva, db)).min(255),
                (mul255(da, self.a) + mul255(self.inva, da)).min(255),
            ],
        }
    }
}

/// Read, composite and write back the pixel at the start of `p`.
#[inline]
pub(crate) fn blend_pixel<C: PixelCodec>(codec: &C, p: &mut [u8], src: &BlendSource) {
    let out = if src.mode == BlendMode::None {
        [src.r, src.g, src.b, src.a]
    } else {
        src.apply(codec.decode(codec.load(p)))
    };
    codec.store(p, codec.encode(out[0], out[1], out[2], out[3]));
}

// ============================================================================
// Tests
// ============================================================================
