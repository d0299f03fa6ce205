// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Pixmap`]-backed drawing context and layer surface.

use std::sync::Arc;

use kurbo::{Affine, BezPath, Rect};
use palimpsest_core::context::{DrawingContext, PaintError, Surface};
use palimpsest_core::image::ImageData;
use palimpsest_core::style::{BlendMode, Paint, Rgba, Shadow, StrokeStyle};
use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Pixmap, Shader, SpreadMode, Stroke, Transform,
};

use crate::convert;
use crate::error::SurfaceError;

/// A paint and the box its bounding-box gradients resolve against.
#[derive(Clone)]
struct Source {
    paint: Paint,
    bounds: Rect,
}

impl Source {
    fn black() -> Self {
        Self {
            paint: Paint::Solid(Rgba::BLACK),
            bounds: Rect::ZERO,
        }
    }
}

/// Everything `save()` pushes.
#[derive(Clone)]
struct DrawState {
    transform: Affine,
    clip: Option<Arc<Mask>>,
    opacity: f32,
    blend: BlendMode,
    shadow: Option<Shadow>,
    fill: Source,
    stroke: Source,
    stroke_style: StrokeStyle,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: None,
            opacity: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
            fill: Source::black(),
            stroke: Source::black(),
            stroke_style: StrokeStyle::default(),
        }
    }
}

/// A premultiplied RGBA8 raster surface.
///
/// Clipping is mask based: each [`clip`](DrawingContext::clip) rasterizes
/// the path into an anti-aliased coverage mask and multiplies it into the
/// current one. The open path is not part of the saved state.
///
/// Shadows are drawn as a hard copy of the geometry offset in device
/// pixels; the blur radius is not applied.
pub struct RasterSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
    path: BezPath,
}

impl core::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("save_depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// Creates a transparent surface of `width` x `height` device pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidSize`] if either dimension is zero or
    /// the pixel buffer would be too large.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        Ok(Self::from_pixmap(pixmap))
    }

    /// Wraps an existing pixmap.
    #[must_use]
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap,
            state: DrawState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
        }
    }

    /// Width in device pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in device pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The premultiplied `[r, g, b, a]` value at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.pixmap.pixel(x, y)?;
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// The backing pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutable access to the backing pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Consumes the surface and returns its pixmap.
    #[must_use]
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Number of open `save()` levels.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn paint_open_path(&mut self, stroke: bool) {
        let Some(path) = convert::path(&self.path) else {
            return;
        };
        let Self { pixmap, state, .. } = self;
        let transform = convert::transform(state.transform);
        let mask = state.clip.as_deref();
        let blend_mode = convert::blend_mode(state.blend);
        let (source, skia_stroke) = if stroke {
            (&state.stroke, Some(convert::stroke(&state.stroke_style)))
        } else {
            (&state.fill, None)
        };

        if let Some(shadow) = state.shadow.filter(Shadow::is_visible) {
            let mut color = convert::color(shadow.color);
            color.apply_opacity(state.opacity);
            let paint = tiny_skia::Paint {
                shader: Shader::SolidColor(color),
                blend_mode,
                anti_alias: true,
                ..tiny_skia::Paint::default()
            };
            let shifted = shadow_transform(transform, &shadow);
            draw_path(pixmap, &path, &paint, skia_stroke.as_ref(), shifted, mask);
        }

        let Ok(shader) = convert::shader(&source.paint, source.bounds, state.opacity) else {
            return;
        };
        let paint = tiny_skia::Paint {
            shader,
            blend_mode,
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        draw_path(pixmap, &path, &paint, skia_stroke.as_ref(), transform, mask);
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
fn shadow_transform(transform: Transform, shadow: &Shadow) -> Transform {
    transform.post_translate(shadow.offset.x as f32, shadow.offset.y as f32)
}

fn draw_path(
    pixmap: &mut Pixmap,
    path: &tiny_skia::Path,
    paint: &tiny_skia::Paint<'_>,
    stroke: Option<&Stroke>,
    transform: Transform,
    mask: Option<&Mask>,
) {
    match stroke {
        Some(stroke) => pixmap.stroke_path(path, paint, stroke, transform, mask),
        None => pixmap.fill_path(path, paint, FillRule::Winding, transform, mask),
    }
}

/// Multiplies `existing` coverage into `into`.
fn intersect_masks(into: &mut Mask, existing: &Mask) {
    if into.width() != existing.width() || into.height() != existing.height() {
        return;
    }
    for (dst, src) in into.data_mut().iter_mut().zip(existing.data()) {
        let product = (u16::from(*dst) * u16::from(*src) + 127) / 255;
        *dst = u8::try_from(product).unwrap_or(u8::MAX);
    }
}

impl DrawingContext for RasterSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn clip(&mut self, path: &BezPath) {
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        if let Some(path) = convert::path(path) {
            let transform = convert::transform(self.state.transform);
            mask.fill_path(&path, FillRule::Winding, true, transform);
        }
        if let Some(existing) = &self.state.clip {
            intersect_masks(&mut mask, existing);
        }
        self.state.clip = Some(Arc::new(mask));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.state.shadow = shadow.copied();
    }

    fn set_fill(&mut self, paint: &Paint, bounds: Rect) -> Result<(), PaintError> {
        convert::shader(paint, bounds, 1.0)?;
        self.state.fill = Source {
            paint: paint.clone(),
            bounds,
        };
        Ok(())
    }

    fn set_stroke(&mut self, paint: &Paint, bounds: Rect) -> Result<(), PaintError> {
        convert::shader(paint, bounds, 1.0)?;
        self.state.stroke = Source {
            paint: paint.clone(),
            bounds,
        };
        Ok(())
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.state.stroke_style = style.clone();
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn append_path(&mut self, path: &BezPath) {
        self.path.extend(path.elements().iter().copied());
    }

    fn fill(&mut self) {
        self.paint_open_path(false);
    }

    fn stroke(&mut self) {
        self.paint_open_path(true);
    }

    fn draw_image(&mut self, image: &ImageData, dest: Rect) {
        let (Some(pixels), Some(rect)) = (convert::pixmap_ref(image), convert::rect(dest)) else {
            return;
        };
        let placement = Affine::new([
            dest.width() / f64::from(image.width()),
            0.0,
            0.0,
            dest.height() / f64::from(image.height()),
            dest.x0,
            dest.y0,
        ]);
        let paint = tiny_skia::Paint {
            shader: tiny_skia::Pattern::new(
                pixels,
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                self.state.opacity,
                convert::transform(placement),
            ),
            blend_mode: convert::blend_mode(self.state.blend),
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        let transform = convert::transform(self.state.transform);
        self.pixmap
            .fill_rect(rect, &paint, transform, self.state.clip.as_deref());
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn erase_rect(&mut self, rect: Rect) {
        let Some(rect) = convert::rect(rect.abs().expand()) else {
            return;
        };
        let paint = tiny_skia::Paint {
            blend_mode: tiny_skia::BlendMode::Clear,
            anti_alias: false,
            ..tiny_skia::Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn fill_rect(
        &mut self,
        rect: Rect,
        paint: &Paint,
        paint_bounds: Rect,
    ) -> Result<(), PaintError> {
        let shader = convert::shader(paint, paint_bounds, 1.0)?;
        let Some(rect) = convert::rect(rect.abs().expand()) else {
            return Ok(());
        };
        let paint = tiny_skia::Paint {
            shader,
            anti_alias: false,
            ..tiny_skia::Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
        Ok(())
    }

    fn blank_like(&self) -> Self {
        let mut pixmap = self.pixmap.clone();
        pixmap.fill(Color::TRANSPARENT);
        Self::from_pixmap(pixmap)
    }

    fn copy_from(&mut self, source: &Self) {
        if self.size() == source.size() {
            self.pixmap.data_mut().copy_from_slice(source.pixmap.data());
        } else {
            self.pixmap = source.pixmap.clone();
        }
    }

    fn composite_from(&mut self, source: &Self, rect: Rect, alpha: f32) {
        let Some(rect) = convert::rect(rect.abs().expand()) else {
            return;
        };
        let paint = tiny_skia::Paint {
            shader: tiny_skia::Pattern::new(
                source.pixmap.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                alpha.clamp(0.0, 1.0),
                Transform::identity(),
            ),
            anti_alias: false,
            ..tiny_skia::Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }
}
