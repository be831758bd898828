//! Pixel codecs: raw pixel access plus decode/encode for one layout.
//!
//! Drawing routines are written once, generic over [`PixelCodec`], and
//! monomorphized per layout. Four layouts get dedicated codecs with
//! constant masks (RGB555, RGB565, RGB888, ARGB8888); everything else runs
//! through the mask-driven generic codecs. The codec is chosen once per
//! call by [`Codec::select_by_depth`] or [`Codec::select_by_width`], then
//! [`Codec::run`] hands the concrete codec to a [`CodecVisitor`].

use crate::color::expand_byte;
use crate::pixfmt::PixelFormat;

// ============================================================================
// Raw pixel access
// ============================================================================

/// Read one pixel of `bytes` width from the start of `p`.
///
/// Packed formats are native-endian; 3-byte pixels are stored low byte first.
#[inline]
pub(crate) fn read_pixel(p: &[u8], bytes: usize) -> u32 {
    match bytes {
        1 => p[0] as u32,
        2 => u16::from_ne_bytes([p[0], p[1]]) as u32,
        3 => p[0] as u32 | (p[1] as u32) << 8 | (p[2] as u32) << 16,
        _ => u32::from_ne_bytes([p[0], p[1], p[2], p[3]]),
    }
}

/// Write one pixel of `bytes` width to the start of `p`.
#[inline]
pub(crate) fn write_pixel(p: &mut [u8], bytes: usize, v: u32) {
    match bytes {
        1 => p[0] = v as u8,
        2 => p[..2].copy_from_slice(&(v as u16).to_ne_bytes()),
        3 => {
            p[0] = v as u8;
            p[1] = (v >> 8) as u8;
            p[2] = (v >> 16) as u8;
        }
        _ => p[..4].copy_from_slice(&v.to_ne_bytes()),
    }
}

// ============================================================================
// PixelCodec trait
// ============================================================================

/// Decode/encode capability for one pixel layout.
///
/// Channels travel as `u32` so blend arithmetic never overflows before
/// saturation. Layouts without alpha decode alpha as 255 and ignore it on
/// encode.
pub(crate) trait PixelCodec: Copy {
    /// Bytes per pixel.
    const BYTES: usize;

    fn decode(&self, pixel: u32) -> [u32; 4];

    fn encode(&self, r: u32, g: u32, b: u32, a: u32) -> u32;

    #[inline]
    fn load(&self, p: &[u8]) -> u32 {
        read_pixel(p, Self::BYTES)
    }

    #[inline]
    fn store(&self, p: &mut [u8], v: u32) {
        write_pixel(p, Self::BYTES, v)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rgb555;

impl PixelCodec for Rgb555 {
    const BYTES: usize = 2;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        [
            expand_byte(3, (p & 0x7C00) >> 10) as u32,
            expand_byte(3, (p & 0x03E0) >> 5) as u32,
            expand_byte(3, p & 0x001F) as u32,
            255,
        ]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, _a: u32) -> u32 {
        ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rgb565;

impl PixelCodec for Rgb565 {
    const BYTES: usize = 2;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        [
            expand_byte(3, (p & 0xF800) >> 11) as u32,
            expand_byte(2, (p & 0x07E0) >> 5) as u32,
            expand_byte(3, p & 0x001F) as u32,
            255,
        ]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, _a: u32) -> u32 {
        ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)
    }
}

/// 32-bit XRGB.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rgb888;

impl PixelCodec for Rgb888 {
    const BYTES: usize = 4;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        [(p >> 16) & 0xFF, (p >> 8) & 0xFF, p & 0xFF, 255]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, _a: u32) -> u32 {
        (r << 16) | (g << 8) | b
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Argb8888;

impl PixelCodec for Argb8888 {
    const BYTES: usize = 4;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        [(p >> 16) & 0xFF, (p >> 8) & 0xFF, p & 0xFF, p >> 24]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, a: u32) -> u32 {
        (a << 24) | (r << 16) | (g << 8) | b
    }
}

// ============================================================================
// Mask-driven codecs
// ============================================================================

/// Masks, shifts and losses of a format, detached from its palette so the
/// codec stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Channels {
    mask: [u32; 4],
    shift: [u8; 4],
    loss: [u8; 4],
}

impl Channels {
    pub(crate) fn of(fmt: &PixelFormat) -> Self {
        Self {
            mask: [fmt.rmask, fmt.gmask, fmt.bmask, fmt.amask],
            shift: [fmt.rshift, fmt.gshift, fmt.bshift, fmt.ashift],
            loss: [fmt.rloss, fmt.gloss, fmt.bloss, fmt.aloss],
        }
    }

    #[inline]
    fn channel(&self, p: u32, i: usize) -> u32 {
        expand_byte(self.loss[i], (p & self.mask[i]) >> self.shift[i]) as u32
    }

    #[inline]
    fn pack(&self, v: u32, i: usize) -> u32 {
        (v >> self.loss[i]) << self.shift[i]
    }
}

/// Generic opaque layout of `N` bytes; alpha bits, if any, are ignored.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenericRgb<const N: usize>(pub(crate) Channels);

impl<const N: usize> PixelCodec for GenericRgb<N> {
    const BYTES: usize = N;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        let c = &self.0;
        [c.channel(p, 0), c.channel(p, 1), c.channel(p, 2), 255]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, _a: u32) -> u32 {
        let c = &self.0;
        c.pack(r, 0) | c.pack(g, 1) | c.pack(b, 2) | c.mask[3]
    }
}

/// Generic 4-byte layout with an alpha channel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenericRgba(pub(crate) Channels);

impl PixelCodec for GenericRgba {
    const BYTES: usize = 4;

    #[inline]
    fn decode(&self, p: u32) -> [u32; 4] {
        let c = &self.0;
        [
            c.channel(p, 0),
            c.channel(p, 1),
            c.channel(p, 2),
            c.channel(p, 3),
        ]
    }

    #[inline]
    fn encode(&self, r: u32, g: u32, b: u32, a: u32) -> u32 {
        let c = &self.0;
        c.pack(r, 0) | c.pack(g, 1) | c.pack(b, 2) | (c.pack(a, 3) & c.mask[3])
    }
}

// ============================================================================
// Codec selection
// ============================================================================

/// Receives the concrete codec chosen for a surface.
pub(crate) trait CodecVisitor {
    type Output;

    fn visit<C: PixelCodec>(self, codec: C) -> Self::Output;
}

/// A codec resolved for one surface, chosen once per call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Codec {
    Rgb555,
    Rgb565,
    Rgb888,
    Argb8888,
    Rgb2(Channels),
    Rgb4(Channels),
    Rgba4(Channels),
}

impl Codec {
    /// Selection keyed on `(bits_per_pixel, rmask)`, used by the point and
    /// rect paths. Falls back to [`Codec::generic`].
    pub(crate) fn select_by_depth(fmt: &PixelFormat) -> Option<Codec> {
        let fast = match (fmt.bits_per_pixel, fmt.rmask) {
            (15, 0x7C00) => Some(Codec::Rgb555),
            (16, 0xF800) => Some(Codec::Rgb565),
            (32, 0x00FF_0000) if fmt.amask == 0 => Some(Codec::Rgb888),
            (32, 0x00FF_0000) => Some(Codec::Argb8888),
            _ => None,
        };
        fast.or_else(|| Codec::generic(fmt))
    }

    /// Selection keyed on `(bytes_per_pixel, rmask)`, used by the line paths.
    ///
    /// Every 2- and 4-byte layout resolves to something; the 2-byte fast
    /// paths match on the red mask alone, so ARGB1555 draws as RGB555.
    pub(crate) fn select_by_width(fmt: &PixelFormat) -> Option<Codec> {
        if fmt.is_indexed() {
            return None;
        }
        let ch = Channels::of(fmt);
        match fmt.bytes_per_pixel {
            2 => Some(match fmt.rmask {
                0x7C00 => Codec::Rgb555,
                0xF800 => Codec::Rgb565,
                _ => Codec::Rgb2(ch),
            }),
            4 => Some(match (fmt.rmask, fmt.amask != 0) {
                (0x00FF_0000, false) => Codec::Rgb888,
                (0x00FF_0000, true) => Codec::Argb8888,
                (_, false) => Codec::Rgb4(ch),
                (_, true) => Codec::Rgba4(ch),
            }),
            _ => None,
        }
    }

    /// The mask-driven codec for a format: opaque layouts of 2 or 4 bytes,
    /// alpha layouts of 4 bytes. Anything else is unsupported.
    pub(crate) fn generic(fmt: &PixelFormat) -> Option<Codec> {
        if fmt.is_indexed() {
            return None;
        }
        let ch = Channels::of(fmt);
        match (fmt.amask != 0, fmt.bytes_per_pixel) {
            (false, 2) => Some(Codec::Rgb2(ch)),
            (false, 4) => Some(Codec::Rgb4(ch)),
            (true, 4) => Some(Codec::Rgba4(ch)),
            _ => None,
        }
    }

    pub(crate) fn run<V: CodecVisitor>(self, visitor: V) -> V::Output {
        match self {
            Codec::Rgb555 => visitor.visit(Rgb555),
            Codec::Rgb565 => visitor.visit(Rgb565),
            Codec::Rgb888 => visitor.visit(Rgb888),
            Codec::Argb8888 => visitor.visit(Argb8888),
            Codec::Rgb2(ch) => visitor.visit(GenericRgb::<2>(ch)),
            Codec::Rgb4(ch) => visitor.visit(GenericRgb::<4>(ch)),
            Codec::Rgba4(ch) => visitor.visit(GenericRgba(ch)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixfmt::PixelFormatEnum;

    fn fmt(f: PixelFormatEnum) -> PixelFormat {
        PixelFormat::new(f).unwrap()
    }

    struct Decode(u32);

    impl CodecVisitor for Decode {
        type Output = [u32; 4];
        fn visit<C: PixelCodec>(self, codec: C) -> [u32; 4] {
            codec.decode(self.0)
        }
    }

    struct Encode([u32; 4]);

    impl CodecVisitor for Encode {
        type Output = u32;
        fn visit<C: PixelCodec>(self, codec: C) -> u32 {
            let [r, g, b, a] = self.0;
            codec.encode(r, g, b, a)
        }
    }

    #[test]
    fn test_read_write_widths() {
        let mut buf = [0u8; 4];
        for (bytes, v) in [(1, 0xABu32), (2, 0xBEEF), (3, 0x123456), (4, 0xDEADBEEF)] {
            write_pixel(&mut buf, bytes, v);
            assert_eq!(read_pixel(&buf, bytes), v);
        }
    }

    #[test]
    fn test_three_byte_order() {
        let mut buf = [0u8; 3];
        write_pixel(&mut buf, 3, 0x030201);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_select_by_depth() {
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::RGB555)),
            Some(Codec::Rgb555)
        ));
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::Rgb565)),
            Some(Codec::Rgb565)
        ));
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::RGB888)),
            Some(Codec::Rgb888)
        ));
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::Argb8888)),
            Some(Codec::Argb8888)
        ));
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::Abgr8888)),
            Some(Codec::Rgba4(_))
        ));
        assert!(matches!(
            Codec::select_by_depth(&fmt(PixelFormatEnum::Bgr565)),
            Some(Codec::Rgb2(_))
        ));
    }

    #[test]
    fn test_select_by_depth_unsupported() {
        assert!(Codec::select_by_depth(&fmt(PixelFormatEnum::Rgb24)).is_none());
        assert!(Codec::select_by_depth(&fmt(PixelFormatEnum::Argb4444)).is_none());
        assert!(Codec::select_by_depth(&fmt(PixelFormatEnum::Rgb332)).is_none());
        assert!(Codec::select_by_depth(&fmt(PixelFormatEnum::Index8)).is_none());
    }

    #[test]
    fn test_select_by_width() {
        assert!(matches!(
            Codec::select_by_width(&fmt(PixelFormatEnum::Argb1555)),
            Some(Codec::Rgb555)
        ));
        assert!(matches!(
            Codec::select_by_width(&fmt(PixelFormatEnum::Argb4444)),
            Some(Codec::Rgb2(_))
        ));
        assert!(Codec::select_by_width(&fmt(PixelFormatEnum::Rgb24)).is_none());
        assert!(Codec::select_by_width(&fmt(PixelFormatEnum::Rgb332)).is_none());
    }

    #[test]
    fn test_fast_and_generic_decode_agree() {
        for f in [
            PixelFormatEnum::RGB555,
            PixelFormatEnum::Rgb565,
            PixelFormatEnum::RGB888,
            PixelFormatEnum::Argb8888,
        ] {
            let pf = fmt(f);
            let fast = Codec::select_by_depth(&pf).unwrap();
            let generic = Codec::generic(&pf).unwrap();
            for p in [0u32, 0x1234, 0x7FFF, 0xFFFF, 0x00AB_CDEF, 0x80FF_0102, 0xFFFF_FFFF] {
                let p = if pf.bytes_per_pixel == 2 { p & 0xFFFF } else { p };
                assert_eq!(fast.run(Decode(p)), generic.run(Decode(p)), "{:?} {:#x}", f, p);
            }
        }
    }

    #[test]
    fn test_fast_and_generic_encode_agree() {
        for f in [
            PixelFormatEnum::RGB555,
            PixelFormatEnum::Rgb565,
            PixelFormatEnum::RGB888,
            PixelFormatEnum::Argb8888,
        ] {
            let pf = fmt(f);
            let fast = Codec::select_by_depth(&pf).unwrap();
            let generic = Codec::generic(&pf).unwrap();
            for c in [[0, 0, 0, 0], [255, 255, 255, 255], [12, 200, 99, 128], [7, 3, 250, 1]] {
                assert_eq!(fast.run(Encode(c)), generic.run(Encode(c)), "{:?}", f);
            }
        }
    }

    #[test]
    fn test_generic_rgba_encode_keeps_alpha() {
        let pf = fmt(PixelFormatEnum::Rgba8888);
        let c = Codec::generic(&pf).unwrap();
        assert_eq!(c.run(Encode([1, 2, 3, 4])), 0x01020304);
        assert_eq!(c.run(Decode(0x01020304)), [1, 2, 3, 4]);
    }
}
