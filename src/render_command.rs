//! Deferred drawing commands and the per-frame recorder that produces them.
//!
//! Geometry is normalized to integers when recorded: float coordinates are
//! multiplied by the current render scale and truncated. Commands refer to
//! their geometry by index into a [`VertexArena`] owned by the queue, so a
//! whole frame is two flat allocations that [`CommandQueue::reset`] reuses.

use crate::basics::{FPoint, FRect, Point, Rect};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::renderer::Texture;

/// Handle to a texture owned by a [`SoftwareRenderer`](crate::renderer::SoftwareRenderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

/// Mirroring applied to a rotated copy, in source space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
    };
    pub const HORIZONTAL: Flip = Flip {
        horizontal: true,
        vertical: false,
    };
    pub const VERTICAL: Flip = Flip {
        horizontal: false,
        vertical: true,
    };
}

// ============================================================================
// Commands
// ============================================================================

/// Points, lines or rects with one color and blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCmd {
    /// First element in the arena (points or rects).
    pub first: usize,
    pub count: usize,
    pub color: Color,
    pub blend: BlendMode,
}

/// A texture copy. `color` carries the color modulation in RGB and the
/// alpha modulation in A, sampled from the texture when recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyCmd {
    pub texture: TextureId,
    /// Index into [`VertexArena::copies`] or [`VertexArena::copies_ex`].
    pub index: usize,
    pub color: Color,
    pub blend: BlendMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    SetViewport(Rect),
    /// `None` disables clipping within the viewport.
    SetClipRect(Option<Rect>),
    Clear(Color),
    DrawPoints(DrawCmd),
    /// A connected polyline through `count` points.
    DrawLines(DrawCmd),
    FillRects(DrawCmd),
    Copy(CopyCmd),
    CopyEx(CopyCmd),
    NoOp,
}

// ============================================================================
// Vertex arena
// ============================================================================

/// Geometry of a plain copy, already scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyVerts {
    pub src: Rect,
    pub dst: Rect,
}

/// Geometry of a rotated copy. `dst` is unscaled; the render scale is
/// applied when the result is blitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyExVerts {
    pub src: Rect,
    pub dst: Rect,
    pub angle: f64,
    /// Rotation center relative to `dst`.
    pub center: FPoint,
    pub flip: Flip,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Flat per-frame storage for command geometry.
#[derive(Debug, Clone, Default)]
pub struct VertexArena {
    pub points: Vec<Point>,
    pub rects: Vec<Rect>,
    pub copies: Vec<CopyVerts>,
    pub copies_ex: Vec<CopyExVerts>,
}

impl VertexArena {
    fn clear(&mut self) {
        self.points.clear();
        self.rects.clear();
        self.copies.clear();
        self.copies_ex.clear();
    }
}

// ============================================================================
// CommandQueue
// ============================================================================

/// Records drawing commands for one frame.
///
/// Draw commands take the current draw color and blend mode; texture
/// copies take the texture's modulation and blend mode at the time of the
/// call, so later changes to the texture do not affect recorded copies.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    commands: Vec<RenderCommand>,
    arena: VertexArena,
    color: Color,
    blend: BlendMode,
    scale_x: f32,
    scale_y: f32,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            arena: VertexArena::default(),
            color: Color::BLACK,
            blend: BlendMode::None,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands and geometry, keeping the allocations.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.arena.clear();
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn draw_color(&self) -> Color {
        self.color
    }

    pub fn set_draw_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    pub fn draw_blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Render scale applied to geometry recorded from now on.
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    fn is_scaled(&self) -> bool {
        self.scale_x != 1.0 || self.scale_y != 1.0
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::SetViewport(rect));
    }

    pub fn set_clip_rect(&mut self, rect: Option<Rect>) {
        self.commands.push(RenderCommand::SetClipRect(rect));
    }

    /// Clear the whole target with the draw color, ignoring any clip.
    pub fn clear(&mut self) {
        self.commands.push(RenderCommand::Clear(self.color));
    }

    pub fn no_op(&mut self) {
        self.commands.push(RenderCommand::NoOp);
    }

    fn draw_cmd(&self, first: usize, count: usize) -> DrawCmd {
        DrawCmd {
            first,
            count,
            color: self.color,
            blend: self.blend,
        }
    }

    fn push_points(&mut self, points: &[FPoint]) -> usize {
        let first = self.arena.points.len();
        let (sx, sy) = (self.scale_x, self.scale_y);
        self.arena.points.extend(
            points
                .iter()
                .map(|p| Point::new((p.x * sx) as i32, (p.y * sy) as i32)),
        );
        first
    }

    pub fn draw_points(&mut self, points: &[FPoint]) {
        if points.is_empty() {
            return;
        }
        let first = self.push_points(points);
        let cmd = self.draw_cmd(first, points.len());
        self.commands.push(RenderCommand::DrawPoints(cmd));
    }

    /// Record a polyline. Fewer than two points record nothing.
    pub fn draw_lines(&mut self, points: &[FPoint]) {
        if points.len() < 2 {
            return;
        }
        let first = self.push_points(points);
        let cmd = self.draw_cmd(first, points.len());
        self.commands.push(RenderCommand::DrawLines(cmd));
    }

    /// Record filled rects. Scaled sizes are at least one pixel.
    pub fn fill_rects(&mut self, rects: &[FRect]) {
        if rects.is_empty() {
            return;
        }
        let first = self.arena.rects.len();
        let (sx, sy) = (self.scale_x, self.scale_y);
        self.arena.rects.extend(rects.iter().map(|r| {
            Rect::new(
                (r.x * sx) as i32,
                (r.y * sy) as i32,
                ((r.w * sx) as i32).max(1),
                ((r.h * sy) as i32).max(1),
            )
        }));
        let cmd = self.draw_cmd(first, rects.len());
        self.commands.push(RenderCommand::FillRects(cmd));
    }

    /// The part of `srcrect` (whole texture for `None`) inside the texture.
    fn texture_src(texture: &Texture, srcrect: Option<Rect>) -> Option<Rect> {
        let bounds = texture.surface().bounds();
        match srcrect {
            None => (!bounds.is_empty()).then_some(bounds),
            Some(r) => r.intersect(&bounds),
        }
    }

    fn copy_cmd(texture: &Texture, index: usize) -> CopyCmd {
        let [r, g, b] = texture.color_mod();
        CopyCmd {
            texture: texture.id(),
            index,
            color: Color::new(r, g, b, texture.alpha_mod()),
            blend: texture.blend_mode(),
        }
    }

    /// Record a copy of `srcrect` of `texture` stretched onto `dstrect`.
    /// A source rect outside the texture records nothing.
    pub fn copy(&mut self, texture: &Texture, srcrect: Option<Rect>, dstrect: FRect) {
        let Some(src) = Self::texture_src(texture, srcrect) else {
            return;
        };
        let (sx, sy) = if self.is_scaled() {
            (self.scale_x, self.scale_y)
        } else {
            (1.0, 1.0)
        };
        let dst = Rect::new(
            (dstrect.x * sx) as i32,
            (dstrect.y * sy) as i32,
            (dstrect.w * sx) as i32,
            (dstrect.h * sy) as i32,
        );
        let index = self.arena.copies.len();
        self.arena.copies.push(CopyVerts { src, dst });
        self.commands
            .push(RenderCommand::Copy(Self::copy_cmd(texture, index)));
    }

    /// Record a copy rotated by `angle` degrees clockwise about `center`
    /// (relative to `dstrect`), with optional flips.
    pub fn copy_ex(
        &mut self,
        texture: &Texture,
        srcrect: Option<Rect>,
        dstrect: FRect,
        angle: f64,
        center: FPoint,
        flip: Flip,
    ) {
        let Some(src) = Self::texture_src(texture, srcrect) else {
            return;
        };
        let dst = Rect::new(
            dstrect.x as i32,
            dstrect.y as i32,
            dstrect.w as i32,
            dstrect.h as i32,
        );
        let index = self.arena.copies_ex.len();
        self.arena.copies_ex.push(CopyExVerts {
            src,
            dst,
            angle,
            center,
            flip,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        });
        self.commands
            .push(RenderCommand::CopyEx(Self::copy_cmd(texture, index)));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixfmt::PixelFormatEnum;
    use crate::renderer::SoftwareRenderer;

    #[test]
    fn test_points_are_scaled_and_truncated() {
        let mut q = CommandQueue::new();
        q.set_scale(2.0, 0.5);
        q.draw_points(&[FPoint::new(1.7, 3.9), FPoint::new(-0.6, 5.0)]);
        assert_eq!(q.arena().points, vec![Point::new(3, 1), Point::new(-1, 2)]);
        match q.commands()[0] {
            RenderCommand::DrawPoints(c) => {
                assert_eq!((c.first, c.count), (0, 2));
                assert_eq!(c.color, Color::BLACK);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fill_rect_minimum_size() {
        let mut q = CommandQueue::new();
        q.set_scale(0.1, 0.1);
        q.fill_rects(&[FRect::new(10.0, 20.0, 5.0, 0.0)]);
        assert_eq!(q.arena().rects, vec![Rect::new(1, 2, 1, 1)]);
    }

    #[test]
    fn test_short_inputs_record_nothing() {
        let mut q = CommandQueue::new();
        q.draw_points(&[]);
        q.draw_lines(&[FPoint::new(1.0, 1.0)]);
        q.fill_rects(&[]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_draw_state_is_captured() {
        let mut q = CommandQueue::new();
        q.set_draw_color(Color::new(1, 2, 3, 4));
        q.set_draw_blend_mode(BlendMode::Add);
        q.draw_lines(&[FPoint::new(0.0, 0.0), FPoint::new(3.0, 3.0)]);
        q.set_draw_color(Color::WHITE);
        q.clear();
        match q.commands()[0] {
            RenderCommand::DrawLines(c) => {
                assert_eq!(c.color, Color::new(1, 2, 3, 4));
                assert_eq!(c.blend, BlendMode::Add);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(q.commands()[1], RenderCommand::Clear(Color::WHITE));
    }

    #[test]
    fn test_copy_captures_texture_state() {
        let mut r = SoftwareRenderer::new(16, 16, PixelFormatEnum::Argb8888).unwrap();
        let id = r.create_texture(PixelFormatEnum::Argb8888, 4, 4).unwrap();
        let tex = r.texture_mut(id).unwrap();
        tex.set_color_mod(10, 20, 30);
        tex.set_alpha_mod(40);
        tex.set_blend_mode(BlendMode::Mod);

        let mut q = CommandQueue::new();
        q.set_scale(2.0, 2.0);
        let tex = r.texture(id).unwrap();
        q.copy(tex, Some(Rect::new(-1, 2, 3, 9)), FRect::new(1.0, 1.0, 2.5, 2.0));
        q.copy_ex(tex, None, FRect::new(1.9, 1.0, 4.0, 4.0), 30.0, FPoint::new(2.0, 2.0), Flip::VERTICAL);

        match q.commands()[0] {
            RenderCommand::Copy(c) => {
                assert_eq!(c.texture, id);
                assert_eq!(c.color, Color::new(10, 20, 30, 40));
                assert_eq!(c.blend, BlendMode::Mod);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            q.arena().copies[0],
            CopyVerts {
                src: Rect::new(0, 2, 2, 2),
                dst: Rect::new(2, 2, 5, 4),
            }
        );
        let ex = q.arena().copies_ex[0];
        assert_eq!(ex.dst, Rect::new(1, 1, 4, 4));
        assert_eq!(ex.src, Rect::new(0, 0, 4, 4));
        assert_eq!((ex.scale_x, ex.scale_y), (2.0, 2.0));
        assert_eq!(ex.flip, Flip::VERTICAL);
    }

    #[test]
    fn test_copy_outside_texture_is_dropped() {
        let mut r = SoftwareRenderer::new(8, 8, PixelFormatEnum::RGB888).unwrap();
        let id = r.create_texture(PixelFormatEnum::RGB888, 4, 4).unwrap();
        let mut q = CommandQueue::new();
        q.copy(r.texture(id).unwrap(), Some(Rect::new(4, 0, 2, 2)), FRect::new(0.0, 0.0, 2.0, 2.0));
        assert!(q.is_empty());
    }

    #[test]
    fn test_reset_keeps_draw_state() {
        let mut q = CommandQueue::new();
        q.set_draw_color(Color::WHITE);
        q.draw_points(&[FPoint::new(1.0, 1.0)]);
        q.reset();
        assert!(q.is_empty());
        assert!(q.arena().points.is_empty());
        assert_eq!(q.draw_color(), Color::WHITE);
    }
}
