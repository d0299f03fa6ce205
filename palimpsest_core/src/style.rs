// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paints, shadows, stroke parameters and the per-element [`Style`].
//!
//! The compositor diffs consecutive styles with [`StyleDelta`] and only sets
//! the context fields that changed. Solid colours compare by value; gradient
//! and pattern paints are resolved against the element's bounds when they
//! are applied, so they are always reported as changed.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::context::PaintError;
use crate::image::ImageData;

/// A non-premultiplied 8-bit sRGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates a colour from all four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Returns the colour with its alpha multiplied by `factor` (clamped to
    /// `0.0..=1.0`).
    #[must_use]
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "product of a u8 and a factor in 0..=1 fits in u8"
        )]
        let a = (f32::from(self.a) * factor + 0.5) as u8;
        Self { a, ..self }
    }
}

/// How a source is composited onto the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Keep the darker of source and destination.
    Darken,
    /// Keep the lighter of source and destination.
    Lighten,
    /// Absolute difference.
    Difference,
    /// Additive ("lighter") compositing.
    Plus,
    /// Punch the source shape out of the destination.
    DestinationOut,
}

/// Coordinate space of gradient geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GradientUnits {
    /// Coordinates are fractions of the painted bounds (`0.0..=1.0`).
    #[default]
    ObjectBoundingBox,
    /// Coordinates are in the element's local space.
    UserSpace,
}

/// Gradient geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientShape {
    /// A linear gradient between two points.
    Linear {
        /// Where offset `0.0` lies.
        start: Point,
        /// Where offset `1.0` lies.
        end: Point,
    },
    /// A radial gradient around a centre.
    Radial {
        /// Centre of the circle.
        center: Point,
        /// Radius at offset `1.0`.
        radius: f64,
    },
}

/// A colour stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, `0.0..=1.0`.
    pub offset: f32,
    /// Colour at this position.
    pub color: Rgba,
}

/// A linear or radial gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    /// Geometry, interpreted in [`units`](Self::units).
    pub shape: GradientShape,
    /// Colour stops in ascending offset order.
    pub stops: Vec<GradientStop>,
    /// Coordinate space of [`shape`](Self::shape).
    pub units: GradientUnits,
}

impl Gradient {
    /// A linear gradient in bounding-box units with no stops.
    #[must_use]
    pub fn linear(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            shape: GradientShape::Linear {
                start: start.into(),
                end: end.into(),
            },
            stops: Vec::new(),
            units: GradientUnits::ObjectBoundingBox,
        }
    }

    /// A radial gradient in bounding-box units with no stops.
    #[must_use]
    pub fn radial(center: impl Into<Point>, radius: f64) -> Self {
        Self {
            shape: GradientShape::Radial {
                center: center.into(),
                radius,
            },
            stops: Vec::new(),
            units: GradientUnits::ObjectBoundingBox,
        }
    }

    /// Appends a stop.
    #[must_use]
    pub fn with_stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push(GradientStop { offset, color });
        self
    }

    /// Switches the gradient to user-space units.
    #[must_use]
    pub fn in_user_space(mut self) -> Self {
        self.units = GradientUnits::UserSpace;
        self
    }

    /// Returns the geometry in user space, resolving bounding-box units
    /// against `bounds`.
    ///
    /// Radial radii scale with the shorter side of `bounds`.
    #[must_use]
    pub fn resolve(&self, bounds: Rect) -> GradientShape {
        if self.units == GradientUnits::UserSpace {
            return self.shape;
        }
        let map = |p: Point| {
            Point::new(
                bounds.x0 + p.x * bounds.width(),
                bounds.y0 + p.y * bounds.height(),
            )
        };
        match self.shape {
            GradientShape::Linear { start, end } => GradientShape::Linear {
                start: map(start),
                end: map(end),
            },
            GradientShape::Radial { center, radius } => GradientShape::Radial {
                center: map(center),
                radius: radius * bounds.width().abs().min(bounds.height().abs()),
            },
        }
    }
}

/// An image-backed repeating paint.
///
/// `image` is `None` while the image is still loading; applying such a
/// pattern fails with [`PaintError::PatternNotReady`](crate::context::PaintError::PatternNotReady).
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Tile image, once available.
    pub image: Option<ImageData>,
    /// Pattern-space to user-space transform.
    pub transform: Affine,
}

impl Pattern {
    /// A pattern tiling `image`.
    #[must_use]
    pub fn new(image: ImageData) -> Self {
        Self {
            image: Some(image),
            transform: Affine::IDENTITY,
        }
    }

    /// A pattern whose image has not been loaded yet.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            image: None,
            transform: Affine::IDENTITY,
        }
    }

    /// Returns `true` once the tile image is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }
}

/// A fill or stroke source.
#[derive(Clone, Debug)]
pub enum Paint {
    /// A flat colour.
    Solid(Rgba),
    /// A gradient, shared between elements.
    Gradient(Arc<Gradient>),
    /// An image pattern, shared between elements.
    Pattern(Arc<Pattern>),
}

impl Paint {
    /// Returns the colour if this is a flat colour.
    #[must_use]
    pub fn solid_color(&self) -> Option<Rgba> {
        match self {
            Self::Solid(c) => Some(*c),
            _ => None,
        }
    }

    /// Checks that the paint can be realized right now.
    ///
    /// # Errors
    ///
    /// [`PaintError::PatternNotReady`] for a pattern still waiting on its
    /// image and [`PaintError::Unsupported`] for a gradient without stops.
    pub fn ensure_ready(&self) -> Result<(), PaintError> {
        match self {
            Self::Solid(_) => Ok(()),
            Self::Gradient(g) if g.stops.is_empty() => Err(PaintError::Unsupported),
            Self::Gradient(_) => Ok(()),
            Self::Pattern(p) if !p.is_ready() => Err(PaintError::PatternNotReady),
            Self::Pattern(_) => Ok(()),
        }
    }
}

impl PartialEq for Paint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Solid(a), Self::Solid(b)) => a == b,
            (Self::Gradient(a), Self::Gradient(b)) => Arc::ptr_eq(a, b),
            (Self::Pattern(a), Self::Pattern(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Rgba> for Paint {
    fn from(color: Rgba) -> Self {
        Self::Solid(color)
    }
}

impl From<Gradient> for Paint {
    fn from(gradient: Gradient) -> Self {
        Self::Gradient(Arc::new(gradient))
    }
}

impl From<Pattern> for Paint {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(Arc::new(pattern))
    }
}

/// A drop shadow drawn beneath filled and stroked geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Blur radius in surface pixels.
    pub blur: f64,
    /// Offset in surface pixels (unaffected by the element transform).
    pub offset: Vec2,
    /// Shadow colour.
    pub color: Rgba,
}

impl Shadow {
    /// Returns `true` if the shadow would leave any mark.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.color.a > 0 && (self.blur > 0.0 || self.offset != Vec2::ZERO)
    }
}

/// Shape drawn at open stroke ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircular end.
    Round,
    /// Square end extending half the width past the endpoint.
    Square,
}

/// Shape drawn where stroke segments meet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Bevelled corner.
    Bevel,
}

/// Stroke geometry parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in local units.
    pub width: f64,
    /// End cap.
    pub cap: LineCap,
    /// Segment join.
    pub join: LineJoin,
    /// Miter limit ratio.
    pub miter_limit: f64,
    /// Dash pattern (alternating on/off lengths), if any.
    pub dash: Option<Arc<[f64]>>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: None,
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    /// A solid stroke of the given width.
    #[must_use]
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Returns `true` if a usable dash pattern is set.
    #[must_use]
    pub fn is_dashed(&self) -> bool {
        self.dash
            .as_deref()
            .is_some_and(|d| d.iter().any(|len| *len > 0.0))
    }
}

/// The visual style of one element.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Fill paint, if filled.
    pub fill: Option<Paint>,
    /// Stroke paint, if stroked.
    pub stroke: Option<Paint>,
    /// Stroke geometry.
    pub stroke_style: StrokeStyle,
    /// Element opacity, `0.0..=1.0`.
    pub opacity: f32,
    /// Composition mode.
    pub blend: BlendMode,
    /// Drop shadow, if any.
    pub shadow: Option<Shadow>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_style: StrokeStyle::default(),
            opacity: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
        }
    }
}

impl Style {
    /// A fill-only style.
    #[must_use]
    pub fn filled(paint: impl Into<Paint>) -> Self {
        Self {
            fill: Some(paint.into()),
            ..Self::default()
        }
    }

    /// A stroke-only style.
    #[must_use]
    pub fn stroked(paint: impl Into<Paint>, width: f64) -> Self {
        Self {
            stroke: Some(paint.into()),
            stroke_style: StrokeStyle::with_width(width),
            ..Self::default()
        }
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the shadow.
    #[must_use]
    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Sets the dash pattern.
    #[must_use]
    pub fn with_dash(mut self, dash: &[f64]) -> Self {
        self.stroke_style.dash = Some(dash.into());
        self
    }

    /// Returns `true` if the style fills.
    #[inline]
    #[must_use]
    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    /// Returns `true` if the style strokes with a positive width.
    #[inline]
    #[must_use]
    pub fn has_stroke(&self) -> bool {
        self.stroke.is_some() && self.stroke_style.width > 0.0
    }

    /// Returns `true` if nothing drawn with this style can be seen.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// Which style fields differ between two consecutive elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleDelta {
    /// Opacity changed.
    pub opacity: bool,
    /// Blend mode changed.
    pub blend: bool,
    /// Shadow parameters changed.
    pub shadow: bool,
    /// Fill paint changed or needs re-resolution.
    pub fill: bool,
    /// Stroke paint changed or needs re-resolution.
    pub stroke: bool,
    /// Width, caps, joins, miter limit or dash changed.
    pub stroke_style: bool,
}

impl StyleDelta {
    /// Every field marked as changed.
    pub const ALL: Self = Self {
        opacity: true,
        blend: true,
        shadow: true,
        fill: true,
        stroke: true,
        stroke_style: true,
    };

    /// Computes the fields of `next` that differ from `prev`.
    #[must_use]
    pub fn between(prev: &Style, next: &Style) -> Self {
        Self {
            opacity: prev.opacity != next.opacity,
            blend: prev.blend != next.blend,
            shadow: prev.shadow != next.shadow,
            fill: !paint_unchanged(prev.fill.as_ref(), next.fill.as_ref()),
            stroke: !paint_unchanged(prev.stroke.as_ref(), next.stroke.as_ref()),
            stroke_style: prev.stroke_style != next.stroke_style,
        }
    }

    /// Returns `true` if any field changed.
    #[must_use]
    pub fn any(&self) -> bool {
        self.count() > 0
    }

    /// Number of changed fields.
    #[must_use]
    pub fn count(&self) -> usize {
        [
            self.opacity,
            self.blend,
            self.shadow,
            self.fill,
            self.stroke,
            self.stroke_style,
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }
}

/// Solid colours compare by value; anything resolved against bounds is
/// always re-applied.
fn paint_unchanged(a: Option<&Paint>, b: Option<&Paint>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Paint::Solid(x)), Some(Paint::Solid(y))) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    #[test]
    fn identical_solid_styles_have_no_delta() {
        let a = Style::filled(RED);
        let b = Style::filled(RED);
        assert!(!StyleDelta::between(&a, &b).any());
    }

    #[test]
    fn fill_colour_change_is_detected() {
        let a = Style::filled(RED);
        let b = Style::filled(Rgba::rgb(0, 0, 255));
        let d = StyleDelta::between(&a, &b);
        assert!(d.fill);
        assert_eq!(d.count(), 1);
    }

    #[test]
    fn gradients_are_always_reapplied() {
        let g: Paint = Gradient::linear((0.0, 0.0), (1.0, 0.0))
            .with_stop(0.0, RED)
            .into();
        let a = Style::filled(g.clone());
        let b = Style::filled(g);
        assert!(StyleDelta::between(&a, &b).fill);
    }

    #[test]
    fn stroke_width_change_is_stroke_style() {
        let a = Style::stroked(RED, 1.0);
        let b = Style::stroked(RED, 2.0);
        let d = StyleDelta::between(&a, &b);
        assert!(d.stroke_style);
        assert!(!d.stroke);
    }

    #[test]
    fn bounding_box_gradient_resolves_against_bounds() {
        let g = Gradient::linear((0.0, 0.0), (1.0, 0.5));
        let shape = g.resolve(Rect::new(10.0, 20.0, 110.0, 220.0));
        assert_eq!(
            shape,
            GradientShape::Linear {
                start: Point::new(10.0, 20.0),
                end: Point::new(110.0, 120.0),
            }
        );
        let r = Gradient::radial((0.5, 0.5), 0.5).resolve(Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(
            r,
            GradientShape::Radial {
                center: Point::new(20.0, 10.0),
                radius: 10.0,
            }
        );
    }

    #[test]
    fn zero_length_dash_is_not_dashed() {
        let style = Style::stroked(RED, 1.0).with_dash(&[0.0, 0.0]);
        assert!(!style.stroke_style.is_dashed());
        let style = Style::stroked(RED, 1.0).with_dash(&[4.0, 2.0]);
        assert!(style.stroke_style.is_dashed());
    }

    #[test]
    fn scale_alpha_rounds() {
        assert_eq!(RED.scale_alpha(0.5).a, 128);
        assert_eq!(RED.scale_alpha(2.0).a, 255);
        assert_eq!(RED.scale_alpha(0.0).a, 0);
    }

    #[test]
    fn readiness_of_paints() {
        assert_eq!(Paint::from(RED).ensure_ready(), Ok(()));
        assert_eq!(
            Paint::from(Pattern::pending()).ensure_ready(),
            Err(PaintError::PatternNotReady)
        );
        let empty = Gradient::linear(Point::ZERO, (1.0, 0.0));
        assert_eq!(
            Paint::from(empty.clone()).ensure_ready(),
            Err(PaintError::Unsupported)
        );
        assert_eq!(Paint::from(empty.with_stop(0.0, RED)).ensure_ready(), Ok(()));
    }
}
