//! # swrender
//!
//! A CPU rasterizer for 2D primitives on pixel surfaces of many formats,
//! plus a deferred renderer that replays recorded command queues.
//!
//! The crate works in two layers:
//!
//! - **Primitives**: points, lines, polylines and rectangles, written either
//!   as a raw mapped pixel value or composited with a [`BlendMode`]; blits
//!   between surfaces with format conversion, color keys, modulation and
//!   scaling; and surface rotation.
//! - **Renderer**: a [`CommandQueue`] records a frame with float geometry,
//!   and [`SoftwareRenderer::run_command_queue`] executes it onto a target
//!   surface, applying viewport and clip state and resolving textures.
//!
//! Blended drawing picks a specialized code path for common layouts
//! (RGB555, RGB565, RGB888, ARGB8888) and falls back to a generic path for
//! other 16 and 32 bit layouts. Both produce identical pixels.
//!
//! ```
//! use swrender::{blend_fill_rect, BlendMode, Color, PixelFormatEnum, Rect, Surface};
//!
//! let mut s = Surface::new(4, 4, PixelFormatEnum::Argb8888).unwrap();
//! blend_fill_rect(&mut s, Some(Rect::new(1, 1, 2, 2)), BlendMode::Blend, Color::new(255, 0, 0, 255))
//!     .unwrap();
//! assert_eq!(s.get_color(1, 1), Some(Color::new(255, 0, 0, 255)));
//! ```

// Foundation
pub mod basics;
pub mod color;
pub mod error;
pub mod pixfmt;
pub mod surface;

// Pixel access and compositing
pub mod blend;
pub mod pixel_codec;

// Primitives
pub mod blend_fill_rect;
pub mod blend_line;
pub mod clip_line;
pub mod draw_line;
pub mod draw_point;
pub mod fill_rect;
pub mod line_raster;

// Blitting and rotation
pub mod blit;
pub mod rotate;

// Deferred rendering
pub mod render_command;
pub mod renderer;

pub use basics::{FPoint, FRect, Point, Rect};
pub use blend::BlendMode;
pub use blend_fill_rect::{blend_fill_rect, blend_fill_rects};
pub use blend_line::{blend_line, blend_line_with, blend_lines, blend_lines_with};
pub use blit::{blit_scaled, blit_surface, ScaleMode};
pub use clip_line::intersect_rect_and_line;
pub use color::Color;
pub use draw_line::{draw_line, draw_line_with, draw_lines, draw_lines_with, draw_segment};
pub use draw_point::{blend_point, blend_points, draw_point, draw_points};
pub use error::{Error, Result};
pub use fill_rect::{fill_rect, fill_rects};
pub use line_raster::LineAlgorithm;
pub use pixfmt::{Palette, PixelFormat, PixelFormatEnum};
pub use render_command::{CommandQueue, Flip, RenderCommand, TextureId};
pub use renderer::{RendererConfig, SoftwareRenderer, Texture};
pub use rotate::{rotate_surface, rotozoom_size_trig};
pub use surface::{BlitAttrs, Surface, SurfaceView};
