// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! kurbo and palimpsest types to their `tiny-skia` counterparts.

use kurbo::{Affine, BezPath, PathEl, Rect};
use palimpsest_core::context::PaintError;
use palimpsest_core::image::ImageData;
use palimpsest_core::style::{
    BlendMode, Gradient, GradientShape, LineCap, LineJoin, Paint, Pattern, Rgba, StrokeStyle,
};
use tiny_skia::{
    Color, FilterQuality, GradientStop, LinearGradient, PathBuilder, PixmapRef, RadialGradient,
    Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
pub(crate) fn transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
pub(crate) fn rect(rect: Rect) -> Option<tiny_skia::Rect> {
    let r = rect.abs();
    tiny_skia::Rect::from_ltrb(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32)
}

/// Returns `None` for a path with no segments.
#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
pub(crate) fn path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32);
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

pub(crate) fn color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

pub(crate) fn blend_mode(mode: BlendMode) -> tiny_skia::BlendMode {
    match mode {
        BlendMode::SourceOver => tiny_skia::BlendMode::SourceOver,
        BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
        BlendMode::Screen => tiny_skia::BlendMode::Screen,
        BlendMode::Overlay => tiny_skia::BlendMode::Overlay,
        BlendMode::Darken => tiny_skia::BlendMode::Darken,
        BlendMode::Lighten => tiny_skia::BlendMode::Lighten,
        BlendMode::Difference => tiny_skia::BlendMode::Difference,
        BlendMode::Plus => tiny_skia::BlendMode::Plus,
        BlendMode::DestinationOut => tiny_skia::BlendMode::DestinationOut,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
pub(crate) fn stroke(style: &StrokeStyle) -> Stroke {
    let dash = style.dash.as_ref().filter(|_| style.is_dashed()).and_then(|d| {
        let intervals = d.iter().map(|v| *v as f32).collect();
        StrokeDash::new(intervals, style.dash_offset as f32)
    });
    Stroke {
        width: style.width as f32,
        miter_limit: style.miter_limit as f32,
        line_cap: match style.cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match style.join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        dash,
    }
}

pub(crate) fn pixmap_ref(image: &ImageData) -> Option<PixmapRef<'_>> {
    PixmapRef::from_bytes(image.pixels(), image.width(), image.height())
}

/// Builds the shader for `paint` at `opacity`.
///
/// Bounding-box gradients resolve against `bounds`.
pub(crate) fn shader(paint: &Paint, bounds: Rect, opacity: f32) -> Result<Shader<'_>, PaintError> {
    paint.ensure_ready()?;
    match paint {
        Paint::Solid(c) => {
            let mut c = color(*c);
            c.apply_opacity(opacity);
            Ok(Shader::SolidColor(c))
        }
        Paint::Gradient(g) => gradient(g, bounds, opacity),
        Paint::Pattern(p) => pattern(p, opacity),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
fn gradient(
    gradient: &Gradient,
    bounds: Rect,
    opacity: f32,
) -> Result<Shader<'static>, PaintError> {
    let stops = gradient
        .stops
        .iter()
        .map(|s| {
            let mut c = color(s.color);
            c.apply_opacity(opacity);
            GradientStop::new(s.offset.clamp(0.0, 1.0), c)
        })
        .collect();
    let shader = match gradient.resolve(bounds) {
        GradientShape::Linear { start, end } => LinearGradient::new(
            tiny_skia::Point::from_xy(start.x as f32, start.y as f32),
            tiny_skia::Point::from_xy(end.x as f32, end.y as f32),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ),
        GradientShape::Radial { center, radius } => {
            let center = tiny_skia::Point::from_xy(center.x as f32, center.y as f32);
            RadialGradient::new(
                center,
                center,
                radius as f32,
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    };
    shader.ok_or(PaintError::Unsupported)
}

fn pattern(pattern: &Pattern, opacity: f32) -> Result<Shader<'_>, PaintError> {
    let image = pattern.image.as_ref().ok_or(PaintError::PatternNotReady)?;
    let pixmap = pixmap_ref(image).ok_or(PaintError::Unsupported)?;
    Ok(tiny_skia::Pattern::new(
        pixmap,
        SpreadMode::Repeat,
        FilterQuality::Nearest,
        opacity,
        transform(pattern.transform),
    ))
}
