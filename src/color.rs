//! 8-bit color channels and the integer arithmetic every blender shares.
//!
//! All compositing in this crate divides by 255 with the same truncating
//! formula, [`mul255`], so results are bit-exact across formats and paths.
//! Narrow channels (5, 6, 4 ... bits) are widened to 8 bits by bit
//! replication through [`expand_byte`].

// ============================================================================
// Color
// ============================================================================

/// Four 8-bit channels, straight (non-premultiplied) unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Scale the color channels by alpha; alpha itself is kept.
    #[inline]
    pub fn premultiplied(&self) -> Self {
        let a = self.a as u32;
        Self {
            r: mul255(self.r as u32, a) as u8,
            g: mul255(self.g as u32, a) as u8,
            b: mul255(self.b as u32, a) as u8,
            a: self.a,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

// ============================================================================
// Channel arithmetic
// ============================================================================

/// Truncating multiply-divide: `(a * b) / 255`.
#[inline]
pub const fn mul255(a: u32, b: u32) -> u32 {
    (a * b) / 255
}

/// Replicate the top bits of an n-bit channel value into a full byte.
const fn replicate(v: u32, bits: u32) -> u8 {
    if bits == 0 {
        return 0;
    }
    let mut out = 0u32;
    let mut pos = 8 - bits as i32;
    while pos > -(bits as i32) {
        if pos >= 0 {
            out |= v << pos;
        } else {
            out |= v >> (-pos);
        }
        pos -= bits as i32;
    }
    (out & 0xFF) as u8
}

const fn build_expand_table() -> [[u8; 256]; 9] {
    let mut table = [[0u8; 256]; 9];
    let mut loss = 0;
    while loss <= 8 {
        let bits = 8 - loss as u32;
        let mut v = 0;
        while v < 256 {
            if bits > 0 && v < (1 << bits) {
                table[loss][v] = replicate(v as u32, bits);
            }
            v += 1;
        }
        loss += 1;
    }
    table
}

static EXPAND_BYTE: [[u8; 256]; 9] = build_expand_table();

/// Widen a channel that lost `loss` bits back to 8 bits.
///
/// `v` must already be shifted down to bit 0 and fit in `8 - loss` bits.
/// A loss of 8 means the channel is absent and always expands to 0.
#[inline]
pub fn expand_byte(loss: u8, v: u32) -> u8 {
    EXPAND_BYTE[loss as usize][(v & 0xFF) as usize]
}

// ============================================================================
// Tests
// ============================================================================
