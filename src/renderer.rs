//! Software renderer: a target surface, a texture store, and the
//! dispatcher that replays a [`CommandQueue`] onto the target.
//!
//! The dispatcher keeps a small draw-state cache. Viewport and clip changes
//! only mark the target clip rectangle dirty; it is recomputed before the
//! next drawing command. Geometry is offset by the viewport origin at draw
//! time, so the recorded queue is never modified and can be replayed.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::basics::{Point, Rect};
use crate::blend::BlendMode;
use crate::blend_fill_rect::blend_fill_rects;
use crate::blend_line::blend_lines_with;
use crate::blit::{blit_scaled, blit_surface, ScaleMode};
use crate::draw_line::draw_lines_with;
use crate::draw_point::{blend_points, draw_points};
use crate::error::{Error, Result};
use crate::fill_rect::{fill_rect, fill_rects};
use crate::line_raster::LineAlgorithm;
use crate::pixfmt::PixelFormatEnum;
use crate::render_command::{
    CommandQueue, CopyCmd, CopyExVerts, DrawCmd, RenderCommand, TextureId, VertexArena,
};
use crate::rotate::{rotate_surface, rotozoom_size_trig};
use crate::surface::{BlitAttrs, Surface, SurfaceView};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererConfig {
    /// Algorithm for DRAW_LINES commands.
    pub line_algorithm: LineAlgorithm,
    /// Scale mode given to newly created textures.
    pub scale_mode: ScaleMode,
}

// ============================================================================
// Textures
// ============================================================================

/// A source surface plus the modulation and blend state copies sample
/// when they are recorded.
#[derive(Debug, Clone)]
pub struct Texture {
    id: TextureId,
    surface: Surface,
    color_mod: [u8; 3],
    alpha_mod: u8,
    blend_mode: BlendMode,
    scale_mode: ScaleMode,
}

impl Texture {
    fn new(id: TextureId, surface: Surface, scale_mode: ScaleMode) -> Self {
        let blend_mode = if surface.format().has_alpha() {
            BlendMode::Blend
        } else {
            BlendMode::None
        };
        Self {
            id,
            surface,
            color_mod: [255; 3],
            alpha_mod: 255,
            blend_mode,
            scale_mode,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn color_mod(&self) -> [u8; 3] {
        self.color_mod
    }

    pub fn set_color_mod(&mut self, r: u8, g: u8, b: u8) {
        self.color_mod = [r, g, b];
    }

    pub fn alpha_mod(&self) -> u8 {
        self.alpha_mod
    }

    pub fn set_alpha_mod(&mut self, a: u8) {
        self.alpha_mod = a;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.scale_mode = mode;
    }

    /// Copies that modulate or use ADD, MOD or MUL cannot run from an RLE
    /// encoded source, so the hint is dropped for good.
    fn prepare_for_copy(&mut self, cmd: &CopyCmd) {
        let c = cmd.color;
        let colormod = (c.r & c.g & c.b) != 0xFF;
        let alphamod = c.a != 0xFF;
        let blending = matches!(cmd.blend, BlendMode::Add | BlendMode::Mod | BlendMode::Mul);
        if (colormod || alphamod || blending) && self.surface.has_rle() {
            debug!("texture {:?}: disabling RLE for modulated copy", self.id);
            self.surface.set_rle(false);
        }
    }

    /// The texture pixels with the attributes recorded in `cmd`.
    fn copy_view(&self, cmd: &CopyCmd) -> SurfaceView<'_> {
        let mut view = self.surface.view();
        view.attrs.color_mod = [cmd.color.r, cmd.color.g, cmd.color.b];
        view.attrs.alpha_mod = cmd.color.a;
        view.attrs.blend_mode = cmd.blend;
        view
    }
}

// ============================================================================
// Draw state
// ============================================================================

/// Viewport and clip state between commands.
#[derive(Debug, Clone, Copy)]
struct DrawStateCache {
    viewport: Rect,
    /// Relative to the viewport origin.
    cliprect: Option<Rect>,
    dirty: bool,
}

impl DrawStateCache {
    fn new(target: &Surface) -> Self {
        Self {
            viewport: target.bounds(),
            cliprect: None,
            dirty: true,
        }
    }

    /// Push the effective clip to the target if it changed.
    fn apply(&mut self, target: &mut Surface) {
        if !self.dirty {
            return;
        }
        let clip = match self.cliprect {
            Some(c) => c
                .offset(self.viewport.x, self.viewport.y)
                .intersect(&self.viewport)
                .unwrap_or(Rect::new(0, 0, 0, 0)),
            None => self.viewport,
        };
        target.set_clip_rect(Some(clip));
        self.dirty = false;
    }

    fn origin(&self) -> (i32, i32) {
        (self.viewport.x, self.viewport.y)
    }
}

// ============================================================================
// SoftwareRenderer
// ============================================================================

/// Owns the render target and the textures copies read from.
#[derive(Debug)]
pub struct SoftwareRenderer {
    target: Surface,
    textures: HashMap<TextureId, Texture>,
    next_id: u32,
    config: RendererConfig,
    points: Vec<Point>,
    rects: Vec<Rect>,
}

impl SoftwareRenderer {
    /// Allocate a target of the given size and format with the default
    /// configuration.
    pub fn new(w: i32, h: i32, format: PixelFormatEnum) -> Result<Self> {
        Ok(Self::with_config(
            Surface::new(w, h, format)?,
            RendererConfig::default(),
        ))
    }

    pub fn with_config(target: Surface, config: RendererConfig) -> Self {
        Self {
            target,
            textures: HashMap::new(),
            next_id: 1,
            config,
            points: Vec::new(),
            rects: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn target(&self) -> &Surface {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut Surface {
        &mut self.target
    }

    pub fn into_target(self) -> Surface {
        self.target
    }

    // ------------------------------------------------------------------------
    // Texture store
    // ------------------------------------------------------------------------

    /// Create a zeroed texture.
    pub fn create_texture(&mut self, format: PixelFormatEnum, w: i32, h: i32) -> Result<TextureId> {
        let surface = Surface::new(w, h, format)?;
        Ok(self.create_texture_from_surface(surface))
    }

    /// Take ownership of `surface` as a texture.
    pub fn create_texture_from_surface(&mut self, surface: Surface) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        debug!(
            "created texture {:?}: {}x{} {:?}",
            id,
            surface.width(),
            surface.height(),
            surface.format().format
        );
        self.textures
            .insert(id, Texture::new(id, surface, self.config.scale_mode));
        id
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture> {
        self.textures.get(&id).ok_or(Error::UnknownTexture(id))
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Result<&mut Texture> {
        self.textures.get_mut(&id).ok_or(Error::UnknownTexture(id))
    }

    pub fn destroy_texture(&mut self, id: TextureId) -> Result<()> {
        self.textures
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::UnknownTexture(id))
    }

    /// Replace the pixels of `rect` (whole texture for `None`) with rows of
    /// `pixels`, `pitch` bytes apart, in the texture's format. A rect
    /// outside the texture updates nothing.
    pub fn update_texture(
        &mut self,
        id: TextureId,
        rect: Option<Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> Result<()> {
        let surface = &mut self.texture_mut(id)?.surface;
        surface.require_depth("update_texture")?;
        let bounds = surface.bounds();
        let Some(r) = rect.unwrap_or(bounds).intersect(&bounds) else {
            return Ok(());
        };

        let row = r.w as usize * surface.format().bytes_per_pixel as usize;
        let needed = pitch * (r.h as usize - 1) + row;
        if pitch < row || pixels.len() < needed {
            return Err(Error::InvalidParam {
                op: "update_texture",
                param: "pixels",
            });
        }

        let start = surface.offset_of(r.x, r.y);
        let dst_pitch = surface.pitch();
        let dst = surface.pixels_mut();
        for y in 0..r.h as usize {
            let o = start + y * dst_pitch;
            dst[o..o + row].copy_from_slice(&pixels[y * pitch..y * pitch + row]);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Execute every command in order onto the target.
    ///
    /// A failing command is logged and skipped; the rest still run.
    /// Returns the number of commands that failed.
    pub fn run_command_queue(&mut self, queue: &CommandQueue) -> usize {
        let mut state = DrawStateCache::new(&self.target);
        let mut failed = 0;
        for (i, cmd) in queue.commands().iter().enumerate() {
            trace!("command {}: {:?}", i, cmd);
            if let Err(e) = self.execute(cmd, queue.arena(), &mut state) {
                warn!("command {} failed: {}", i, e);
                failed += 1;
            }
        }
        failed
    }

    fn execute(
        &mut self,
        cmd: &RenderCommand,
        arena: &VertexArena,
        state: &mut DrawStateCache,
    ) -> Result<()> {
        match *cmd {
            RenderCommand::SetViewport(rect) => {
                state.viewport = rect;
                state.dirty = true;
            }
            RenderCommand::SetClipRect(rect) => {
                state.cliprect = rect;
                state.dirty = true;
            }
            RenderCommand::Clear(color) => {
                state.dirty = true;
                self.target.set_clip_rect(None);
                let pixel = self.target.format().map_color(color);
                fill_rect(&mut self.target, None, pixel)?;
            }
            RenderCommand::DrawPoints(d) => {
                state.apply(&mut self.target);
                self.offset_points(arena, &d, state.origin());
                if d.blend == BlendMode::None {
                    let pixel = self.target.format().map_color(d.color);
                    draw_points(&mut self.target, &self.points, pixel)?;
                } else {
                    blend_points(&mut self.target, &self.points, d.blend, d.color)?;
                }
            }
            RenderCommand::DrawLines(d) => {
                state.apply(&mut self.target);
                self.offset_points(arena, &d, state.origin());
                let algorithm = self.config.line_algorithm;
                if d.blend == BlendMode::None {
                    let pixel = self.target.format().map_color(d.color);
                    draw_lines_with(&mut self.target, &self.points, pixel, algorithm)?;
                } else {
                    blend_lines_with(&mut self.target, &self.points, d.blend, d.color, algorithm)?;
                }
            }
            RenderCommand::FillRects(d) => {
                state.apply(&mut self.target);
                let (dx, dy) = state.origin();
                self.rects.clear();
                self.rects.extend(
                    arena.rects[d.first..d.first + d.count]
                        .iter()
                        .map(|r| r.offset(dx, dy)),
                );
                if d.blend == BlendMode::None {
                    let pixel = self.target.format().map_color(d.color);
                    fill_rects(&mut self.target, &self.rects, pixel)?;
                } else {
                    blend_fill_rects(&mut self.target, &self.rects, d.blend, d.color)?;
                }
            }
            RenderCommand::Copy(c) => {
                state.apply(&mut self.target);
                let verts = arena.copies[c.index];
                let (dx, dy) = state.origin();
                let dst = verts.dst.offset(dx, dy);
                let tex = self
                    .textures
                    .get_mut(&c.texture)
                    .ok_or(Error::UnknownTexture(c.texture))?;
                tex.prepare_for_copy(&c);
                let view = tex.copy_view(&c);
                if verts.src.w == dst.w && verts.src.h == dst.h {
                    blit_surface(&view, Some(verts.src), &mut self.target, Some(dst))?;
                } else {
                    if self.target.has_rle() {
                        debug!("scaled copy: disabling RLE on the target");
                        self.target.set_rle(false);
                    }
                    blit_scaled(
                        &view,
                        Some(verts.src),
                        &mut self.target,
                        Some(dst),
                        tex.scale_mode,
                    )?;
                }
            }
            RenderCommand::CopyEx(c) => {
                state.apply(&mut self.target);
                let verts = arena.copies_ex[c.index];
                let (dx, dy) = state.origin();
                let dst = verts.dst.offset(dx, dy);
                let tex = self
                    .textures
                    .get_mut(&c.texture)
                    .ok_or(Error::UnknownTexture(c.texture))?;
                tex.prepare_for_copy(&c);
                copy_ex(&mut self.target, tex, &c, &verts, dst)?;
            }
            RenderCommand::NoOp => {}
        }
        Ok(())
    }

    fn offset_points(&mut self, arena: &VertexArena, d: &DrawCmd, (dx, dy): (i32, i32)) {
        self.points.clear();
        self.points.extend(
            arena.points[d.first..d.first + d.count]
                .iter()
                .map(|p| Point::new(p.x.saturating_add(dx), p.y.saturating_add(dy))),
        );
    }
}

// ============================================================================
// Rotated copies
// ============================================================================

/// Blit `src` onto `dst` at `rect`, stretched by the render scale.
fn blit_to_screen(
    src: &SurfaceView<'_>,
    dst: &mut Surface,
    rect: Rect,
    scale_x: f32,
    scale_y: f32,
    scale_mode: ScaleMode,
) -> Result<Rect> {
    if scale_x != 1.0 || scale_y != 1.0 {
        let scaled = Rect::new(
            (rect.x as f32 * scale_x) as i32,
            (rect.y as f32 * scale_y) as i32,
            (rect.w as f32 * scale_x) as i32,
            (rect.h as f32 * scale_y) as i32,
        );
        blit_scaled(src, None, dst, Some(scaled), scale_mode)
    } else {
        blit_surface(src, None, dst, Some(rect))
    }
}

/// Rotate, flip and place `verts.src` of `tex` so that its unrotated
/// footprint is `dst`.
///
/// The source is first normalized to ARGB8888 at the destination size when
/// the format, crop or size require it, or when modulation must happen
/// before rotation (NONE, MOD and MUL). NONE with a non-opaque source is
/// composited in three passes so that the covered area ends up holding
/// exactly the rotated pixels: a keyed mask clears it, a color-modulated
/// BLEND pass transfers alpha, and an ADD pass of the color channels
/// restores RGB.
fn copy_ex(
    target: &mut Surface,
    tex: &Texture,
    cmd: &CopyCmd,
    verts: &CopyExVerts,
    dst: Rect,
) -> Result<()> {
    let c = cmd.color;
    let mode = cmd.blend;
    let source = tex.surface.view();
    let fmt = source.format();

    let src_full = verts.src == source.bounds();
    let size_kept = verts.src.x == 0
        && verts.src.y == 0
        && verts.src.w == dst.w
        && verts.src.h == dst.h;
    let argb = fmt.bits_per_pixel == 32 && fmt.format.is_packed_8888() && fmt.has_alpha();
    let blit_required = !argb || !size_kept || !src_full;
    let apply_modulation = matches!(mode, BlendMode::None | BlendMode::Mod | BlendMode::Mul)
        && (c.r & c.g & c.b & c.a) != 255;
    let opaque = mode == BlendMode::None && !fmt.has_alpha() && c.a == 255;
    debug!(
        "copy_ex {:?}: angle {} blit_required {} apply_modulation {} opaque {}",
        cmd.texture, verts.angle, blit_required, apply_modulation, opaque
    );

    let mask = if mode == BlendMode::None && !opaque {
        let mut mask = Surface::new(dst.w, dst.h, PixelFormatEnum::Argb8888)?;
        mask.set_blend_mode(BlendMode::Mod);
        Some(mask)
    } else {
        None
    };

    let normalized = if blit_required || apply_modulation {
        let mut scaled = Surface::new(dst.w, dst.h, PixelFormatEnum::Argb8888)?;
        let mut clone = source.clone();
        clone.attrs = BlitAttrs::default();
        if apply_modulation {
            clone.attrs.color_mod = [c.r, c.g, c.b];
            clone.attrs.alpha_mod = c.a;
        }
        blit_scaled(
            &clone,
            Some(verts.src),
            &mut scaled,
            Some(Rect::from_size(dst.w, dst.h)),
            tex.scale_mode,
        )?;
        Some(scaled)
    } else {
        None
    };

    let mut rot_src = match &normalized {
        Some(s) => s.view(),
        None => source,
    };
    rot_src.attrs = BlitAttrs {
        blend_mode: mode,
        ..BlitAttrs::default()
    };

    let (rect_dest, cos, sin) = rotozoom_size_trig(dst.w, dst.h, verts.angle, verts.center);
    let smooth = tex.scale_mode != ScaleMode::Nearest;
    let rotated = rotate_surface(
        &rot_src,
        verts.angle,
        smooth,
        verts.flip.horizontal,
        verts.flip.vertical,
        &rect_dest,
        cos,
        sin,
        verts.center,
    )?;
    let place = Rect::new(
        dst.x.saturating_add(rect_dest.x),
        dst.y.saturating_add(rect_dest.y),
        rect_dest.w,
        rect_dest.h,
    );
    let (sx, sy) = (verts.scale_x, verts.scale_y);

    match mask {
        None => {
            let mut view = rotated.view();
            if !apply_modulation {
                view.attrs.color_mod = [c.r, c.g, c.b];
                view.attrs.alpha_mod = c.a;
            }
            blit_to_screen(&view, target, place, sx, sy, tex.scale_mode)?;
        }
        Some(mask) => {
            let mask = rotate_surface(
                &mask.view(),
                verts.angle,
                false,
                false,
                false,
                &rect_dest,
                cos,
                sin,
                verts.center,
            )?;
            let mut clear = mask.view();
            clear.attrs.blend_mode = BlendMode::None;
            blit_to_screen(&clear, target, place, sx, sy, tex.scale_mode)?;

            let mut alpha = rotated.view();
            alpha.attrs.color_mod = [0; 3];
            blit_to_screen(&alpha, target, place, sx, sy, tex.scale_mode)?;

            let rgb = rotated.view().without_alpha(BlendMode::Add);
            blit_to_screen(&rgb, target, place, sx, sy, tex.scale_mode)?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{FPoint, FRect};
    use crate::color::Color;
    use crate::render_command::Flip;

    fn renderer(w: i32, h: i32) -> SoftwareRenderer {
        SoftwareRenderer::new(w, h, PixelFormatEnum::Argb8888).unwrap()
    }

    fn argb_texture(r: &mut SoftwareRenderer, w: i32, h: i32, pixels: &[u32]) -> TextureId {
        let id = r.create_texture(PixelFormatEnum::Argb8888, w, h).unwrap();
        let bytes: Vec<u8> = pixels.iter().flat_map(|p| p.to_ne_bytes()).collect();
        r.update_texture(id, None, &bytes, w as usize * 4).unwrap();
        id
    }

    #[test]
    fn test_viewport_offsets_points_and_clips() {
        let mut r = renderer(8, 8);
        let mut q = CommandQueue::new();
        q.set_viewport(Rect::new(2, 3, 4, 4));
        q.set_draw_color(Color::WHITE);
        q.draw_points(&[FPoint::new(0.0, 0.0), FPoint::new(4.0, 0.0)]);
        assert_eq!(r.run_command_queue(&q), 0);
        assert_eq!(r.target().get_pixel(2, 3), Some(0xFFFFFFFF));
        // (6, 3) is outside the viewport.
        assert_eq!(r.target().get_pixel(6, 3), Some(0));
    }

    #[test]
    fn test_far_geometry_under_viewport_draws_nothing() {
        let mut r = renderer(8, 8);
        let mut q = CommandQueue::new();
        q.set_viewport(Rect::new(1, 1, 3, 3));
        q.set_draw_color(Color::WHITE);
        q.draw_points(&[FPoint::new(1e10, 0.0), FPoint::new(0.0, 1e10)]);
        q.draw_lines(&[FPoint::new(1e10, 1.0), FPoint::new(1e10, 2.0)]);
        q.fill_rects(&[FRect::new(1e10, 0.0, 10.0, 1.0)]);
        assert_eq!(r.run_command_queue(&q), 0);
        assert!(r.target().pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clip_rect_is_viewport_relative() {
        let mut r = renderer(8, 8);
        let mut q = CommandQueue::new();
        q.set_viewport(Rect::new(2, 2, 6, 6));
        q.set_clip_rect(Some(Rect::new(1, 1, 2, 2)));
        q.set_draw_color(Color::WHITE);
        q.fill_rects(&[FRect::new(0.0, 0.0, 8.0, 8.0)]);
        r.run_command_queue(&q);
        assert_eq!(r.target().clip_rect(), Rect::new(3, 3, 2, 2));
        assert_eq!(r.target().get_pixel(3, 3), Some(0xFFFFFFFF));
        assert_eq!(r.target().get_pixel(2, 2), Some(0));
        assert_eq!(r.target().get_pixel(5, 5), Some(0));
    }

    #[test]
    fn test_clear_ignores_clip() {
        let mut r = renderer(4, 4);
        let mut q = CommandQueue::new();
        q.set_viewport(Rect::new(0, 0, 4, 4));
        q.set_clip_rect(Some(Rect::new(0, 0, 1, 1)));
        q.set_draw_color(Color::new(1, 2, 3, 4));
        q.clear();
        q.set_draw_color(Color::WHITE);
        q.fill_rects(&[FRect::new(0.0, 0.0, 4.0, 4.0)]);
        r.run_command_queue(&q);
        assert_eq!(r.target().get_pixel(3, 3), Some(0x04010203));
        assert_eq!(r.target().get_pixel(0, 0), Some(0xFFFFFFFF));
        assert_eq!(r.target().get_pixel(1, 0), Some(0x04010203));
    }

    #[test]
    fn test_blend_mode_selects_path() {
        let mut r = renderer(2, 1);
        let mut q = CommandQueue::new();
        q.set_draw_color(Color::new(200, 0, 0, 128));
        q.draw_points(&[FPoint::new(0.0, 0.0)]);
        q.set_draw_blend_mode(BlendMode::Blend);
        q.draw_points(&[FPoint::new(1.0, 0.0)]);
        r.run_command_queue(&q);
        assert_eq!(r.target().get_color(0, 0), Some(Color::new(200, 0, 0, 128)));
        // 200 * 128 / 255 = 100
        assert_eq!(r.target().get_color(1, 0), Some(Color::new(100, 0, 0, 128)));
    }

    #[test]
    fn test_failures_are_counted_and_skipped() {
        let mut r = renderer(4, 4);
        let id = argb_texture(&mut r, 1, 1, &[0xFF00FF00]);
        let mut q = CommandQueue::new();
        q.copy(r.texture(id).unwrap(), None, FRect::new(0.0, 0.0, 1.0, 1.0));
        r.destroy_texture(id).unwrap();
        q.set_draw_color(Color::WHITE);
        q.draw_points(&[FPoint::new(3.0, 3.0)]);
        assert_eq!(r.run_command_queue(&q), 1);
        assert_eq!(r.target().get_pixel(0, 0), Some(0));
        assert_eq!(r.target().get_pixel(3, 3), Some(0xFFFFFFFF));
    }

    #[test]
    fn test_copy_and_scaled_copy() {
        let mut r = renderer(8, 8);
        let id = argb_texture(&mut r, 2, 2, &[0xFF0000FF, 0xFF00FF00, 0xFFFF0000, 0xFFFFFFFF]);
        r.target_mut().set_rle(true);
        let mut q = CommandQueue::new();
        let tex = r.texture(id).unwrap();
        q.copy(tex, None, FRect::new(0.0, 0.0, 2.0, 2.0));
        q.copy(tex, None, FRect::new(4.0, 4.0, 4.0, 4.0));
        assert_eq!(r.run_command_queue(&q), 0);
        assert_eq!(r.target().get_pixel(1, 0), Some(0xFF00FF00));
        assert_eq!(r.target().get_pixel(5, 7), Some(0xFFFF0000));
        assert_eq!(r.target().get_pixel(7, 7), Some(0xFFFFFFFF));
        assert!(!r.target().has_rle());
    }

    #[test]
    fn test_modulated_copy_drops_texture_rle() {
        let mut r = renderer(2, 2);
        let id = argb_texture(&mut r, 1, 1, &[0xFFFFFFFF]);
        r.texture_mut(id).unwrap().surface_mut().set_rle(true);
        r.texture_mut(id).unwrap().set_color_mod(255, 0, 255);
        let mut q = CommandQueue::new();
        q.copy(r.texture(id).unwrap(), None, FRect::new(0.0, 0.0, 1.0, 1.0));
        r.run_command_queue(&q);
        assert!(!r.texture(id).unwrap().surface().has_rle());
        assert_eq!(r.target().get_pixel(0, 0), Some(0xFFFF00FF));
    }

    #[test]
    fn test_copy_ex_none_reproduces_rotated_pixels() {
        let mut r = renderer(4, 4);
        let mut q = CommandQueue::new();
        q.set_draw_color(Color::new(9, 9, 9, 255));
        q.clear();
        let id = argb_texture(&mut r, 2, 2, &[0x80102030, 0xFF405060, 0x00708090, 0x40A0B0C0]);
        r.texture_mut(id).unwrap().set_blend_mode(BlendMode::None);
        q.copy_ex(
            r.texture(id).unwrap(),
            None,
            FRect::new(1.0, 1.0, 2.0, 2.0),
            90.0,
            FPoint::new(1.0, 1.0),
            Flip::NONE,
        );
        assert_eq!(r.run_command_queue(&q), 0);
        let t = r.target();
        // Clockwise: top-left moves to top-right.
        assert_eq!(t.get_pixel(2, 1), Some(0x80102030));
        assert_eq!(t.get_pixel(2, 2), Some(0xFF405060));
        assert_eq!(t.get_pixel(1, 1), Some(0x00708090));
        assert_eq!(t.get_pixel(1, 2), Some(0x40A0B0C0));
        assert_eq!(t.get_pixel(0, 0), Some(0xFF090909));
        assert_eq!(t.get_pixel(3, 3), Some(0xFF090909));
    }

    #[test]
    fn test_copy_ex_opaque_source_with_flip() {
        let mut r = SoftwareRenderer::new(3, 1, PixelFormatEnum::RGB888).unwrap();
        let id = r.create_texture(PixelFormatEnum::RGB888, 3, 1).unwrap();
        let bytes: Vec<u8> = [0x00FF0000u32, 0x0000FF00, 0x000000FF]
            .iter()
            .flat_map(|p| p.to_ne_bytes())
            .collect();
        r.update_texture(id, None, &bytes, 12).unwrap();
        let mut q = CommandQueue::new();
        q.copy_ex(
            r.texture(id).unwrap(),
            None,
            FRect::new(0.0, 0.0, 3.0, 1.0),
            0.0,
            FPoint::new(1.5, 0.5),
            Flip::HORIZONTAL,
        );
        assert_eq!(r.run_command_queue(&q), 0);
        assert_eq!(r.target().get_pixel(0, 0), Some(0x000000FF));
        assert_eq!(r.target().get_pixel(2, 0), Some(0x00FF0000));
    }

    #[test]
    fn test_update_texture_validates_pixels() {
        let mut r = renderer(1, 1);
        let id = r.create_texture(PixelFormatEnum::Rgb565, 4, 4).unwrap();
        assert!(matches!(
            r.update_texture(id, Some(Rect::new(0, 0, 2, 2)), &[0; 5], 4),
            Err(Error::InvalidParam { param: "pixels", .. })
        ));
        let row = [0x1234u16.to_ne_bytes(), 0x5678u16.to_ne_bytes()].concat();
        r.update_texture(id, Some(Rect::new(2, 3, 5, 5)), &row, 4).unwrap();
        let s = r.texture(id).unwrap().surface();
        assert_eq!(s.get_pixel(2, 3), Some(0x1234));
        assert_eq!(s.get_pixel(3, 3), Some(0x5678));
        assert_eq!(s.get_pixel(2, 2), Some(0));
    }

    #[test]
    fn test_unknown_texture_errors() {
        let mut r = renderer(1, 1);
        let id = r.create_texture(PixelFormatEnum::Argb8888, 1, 1).unwrap();
        r.destroy_texture(id).unwrap();
        assert_eq!(r.destroy_texture(id), Err(Error::UnknownTexture(id)));
        assert!(r.texture(id).is_err());
    }

    #[test]
    fn test_texture_defaults() {
        let mut r = SoftwareRenderer::with_config(
            Surface::new(1, 1, PixelFormatEnum::RGB888).unwrap(),
            RendererConfig {
                scale_mode: ScaleMode::Linear,
                ..RendererConfig::default()
            },
        );
        let a = r.create_texture(PixelFormatEnum::Argb8888, 1, 1).unwrap();
        let b = r.create_texture(PixelFormatEnum::RGB888, 1, 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(r.texture(a).unwrap().blend_mode(), BlendMode::Blend);
        assert_eq!(r.texture(b).unwrap().blend_mode(), BlendMode::None);
        assert_eq!(r.texture(a).unwrap().scale_mode(), ScaleMode::Linear);
    }
}
