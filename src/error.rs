//! Error taxonomy for drawing, blitting and command dispatch.

use crate::pixfmt::PixelFormatEnum;
use crate::render_command::TextureId;

/// Errors reported by the rasterizer.
///
/// Every drawing entry point validates its destination before writing, so an
/// `Err` always means no pixel was touched by that call. A clip rectangle with
/// no overlap is not an error: the call succeeds and draws nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The destination has fewer than 8 bits per pixel.
    #[error("{op}(): unsupported surface depth ({bits} bits per pixel)")]
    UnsupportedDepth { op: &'static str, bits: u8 },

    /// No fast or generic path handles this pixel layout.
    #[error("{op}(): unsupported surface format {format:?}")]
    UnsupportedFormat {
        op: &'static str,
        format: PixelFormatEnum,
    },

    #[error("{op}(): invalid parameter '{param}'")]
    InvalidParam {
        op: &'static str,
        param: &'static str,
    },

    /// Pixel storage for a surface could not be reserved.
    #[error("out of memory allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// The rotation routine only accepts 32-bit alpha surfaces or 8-bit
    /// surfaces carrying a color key.
    #[error("rotate_surface(): source must be 32-bit with alpha or 8-bit with a color key")]
    Rotation,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Error::UnsupportedDepth {
            op: "draw_point",
            bits: 4,
        };
        assert_eq!(
            e.to_string(),
            "draw_point(): unsupported surface depth (4 bits per pixel)"
        );
        let e = Error::UnsupportedFormat {
            op: "blend_point",
            format: PixelFormatEnum::Rgb24,
        };
        assert_eq!(e.to_string(), "blend_point(): unsupported surface format Rgb24");
    }
}
