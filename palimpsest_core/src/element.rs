// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable elements.
//!
//! An [`Element`] is one entry of a flattened display list. It has:
//!
//! - An identity ([`ElementId`]) assigned by the scene graph, used to notice
//!   elements that disappeared between two frames.
//! - A kind ([`ElementKind`]), one of path, text, image or nested group, which
//!   owns the kind-specific geometry and emits it into a
//!   [`DrawingContext`].
//! - **Shared properties** the compositor diffs across consecutive elements:
//!   [`transform`](Element::transform), [`clip_stack`](Element::clip_stack)
//!   and [`style`](Element::style).
//! - **Repaint bookkeeping**: a dirty flag and the rect the element was
//!   painted at in the previous frame.
//!
//! # Dirty tracking
//!
//! Elements start dirty. Every mutating setter marks the element dirty
//! again; the compositor clears the flag once the element has been drawn
//! with all of its paints realized.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, BezPath, Rect, Shape, Vec2};

use crate::context::DrawingContext;
use crate::geometry::{has_area, is_valid, overlaps, transform_bounds};
use crate::image::ImageData;
use crate::style::{Rgba, Style};
use crate::transform::is_zero_scale;

/// Flattening tolerance for clip shapes that are not already paths.
const CLIP_TOLERANCE: f64 = 0.1;

/// Identifies an element across frames.
///
/// The scene graph assigns ids; the compositor only compares them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ElementId(pub u64);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// One clip region of a clip stack.
///
/// Clip stacks are compared by the identity of their entries, so share one
/// [`ClipRef`] between every element clipped by the same region.
#[derive(Clone, Debug)]
pub struct Clip {
    shape: BezPath,
    transform: Affine,
}

/// Shared handle to a [`Clip`].
pub type ClipRef = Arc<Clip>;

impl Clip {
    /// Creates a clip from any shape, in the space given by `transform`.
    #[must_use]
    pub fn new(shape: &impl Shape, transform: Affine) -> Self {
        Self {
            shape: shape.to_path(CLIP_TOLERANCE),
            transform,
        }
    }

    /// An untransformed rectangular clip.
    #[must_use]
    pub fn rect(rect: Rect) -> Self {
        Self::new(&rect, Affine::IDENTITY)
    }

    /// Wraps the clip in a shareable handle.
    #[must_use]
    pub fn shared(self) -> ClipRef {
        Arc::new(self)
    }

    /// The clip outline in its own space.
    #[must_use]
    pub fn shape(&self) -> &BezPath {
        &self.shape
    }

    /// The clip's own transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Surface-space bounds of the clip region.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.transform.transform_rect_bbox(self.shape.bounding_box())
    }

    /// Returns `true` if the region encloses no area.
    ///
    /// Everything beneath a degenerate clip is suppressed rather than handed
    /// to the context.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let bounds = self.bounds();
        !is_valid(&bounds) || !has_area(&bounds)
    }
}

/// A filled or stroked outline.
#[derive(Clone, Debug)]
pub struct PathElement {
    /// Outline in local space.
    pub path: BezPath,
}

/// One pre-shaped glyph of a text run.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// Glyph outline relative to its pen position.
    pub outline: BezPath,
    /// Pen position in local space.
    pub offset: Vec2,
}

/// A run of pre-shaped glyph outlines.
#[derive(Clone, Debug, Default)]
pub struct TextElement {
    /// Glyphs in drawing order.
    pub glyphs: Vec<Glyph>,
}

/// A raster image drawn into a destination rect.
#[derive(Clone, Debug)]
pub struct ImageElement {
    /// Pixels, or `None` while the image is still loading.
    pub image: Option<ImageData>,
    /// Destination in local space.
    pub dest: Rect,
}

/// A nested display list replayed with its own draw scope.
///
/// Used for incremental content whose children are appended over time.
/// Child transforms are already in surface space; the group's own
/// transform and style are not applied to them.
#[derive(Clone, Debug, Default)]
pub struct GroupElement {
    /// Child elements in drawing order.
    pub children: Vec<Element>,
}

/// Kind-specific payload of an [`Element`].
#[derive(Clone, Debug)]
pub enum ElementKind {
    /// A path.
    Path(PathElement),
    /// Text as glyph outlines.
    Text(TextElement),
    /// An image.
    Image(ImageElement),
    /// A nested display list.
    Group(GroupElement),
}

impl ElementKind {
    /// Local-space bounds of the geometry, ignoring stroke and shadow.
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        match self {
            Self::Path(p) => p.path.bounding_box(),
            Self::Text(t) => t
                .glyphs
                .iter()
                .map(|g| g.outline.bounding_box() + g.offset)
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO),
            Self::Image(i) => i.dest.abs(),
            Self::Group(g) => g
                .children
                .iter()
                .map(Element::paint_rect)
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO),
        }
    }

    /// Appends this kind's outline geometry to the context's open path.
    ///
    /// Images and groups have no outline and emit nothing.
    pub fn emit_geometry<C: DrawingContext + ?Sized>(&self, ctx: &mut C) {
        match self {
            Self::Path(p) => ctx.append_path(&p.path),
            Self::Text(t) => {
                for glyph in &t.glyphs {
                    if glyph.offset == Vec2::ZERO {
                        ctx.append_path(&glyph.outline);
                    } else {
                        ctx.append_path(&(Affine::translate(glyph.offset) * glyph.outline.clone()));
                    }
                }
            }
            Self::Image(_) | Self::Group(_) => {}
        }
    }

    /// Returns `true` for kinds drawn by filling or stroking an outline.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        matches!(self, Self::Path(_) | Self::Text(_))
    }
}

/// The paint a batchable element contributes to an open batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchKey {
    /// Fill-only with a flat colour.
    Fill(Rgba),
    /// Stroke-only with a flat colour.
    Stroke(Rgba),
}

/// One entry of a display list.
#[derive(Clone, Debug)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    transform: Option<Affine>,
    clip_stack: Option<Vec<ClipRef>>,
    style: Style,
    visible: bool,
    culling: bool,
    dirty: bool,
    prev_paint_rect: Option<Rect>,
}

impl Element {
    /// Creates a visible, dirty element with the default style.
    #[must_use]
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            transform: None,
            clip_stack: None,
            style: Style::default(),
            visible: true,
            culling: false,
            dirty: true,
            prev_paint_rect: None,
        }
    }

    /// A path element.
    #[must_use]
    pub fn path(id: ElementId, path: BezPath) -> Self {
        Self::new(id, ElementKind::Path(PathElement { path }))
    }

    /// A text element from pre-shaped glyphs.
    #[must_use]
    pub fn text(id: ElementId, glyphs: Vec<Glyph>) -> Self {
        Self::new(id, ElementKind::Text(TextElement { glyphs }))
    }

    /// An image element.
    #[must_use]
    pub fn image(id: ElementId, image: Option<ImageData>, dest: Rect) -> Self {
        Self::new(id, ElementKind::Image(ImageElement { image, dest }))
    }

    /// A group of nested elements.
    #[must_use]
    pub fn group(id: ElementId, children: Vec<Self>) -> Self {
        Self::new(id, ElementKind::Group(GroupElement { children }))
    }

    // -- Builders --

    /// Sets the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the clip stack, outermost first.
    #[must_use]
    pub fn with_clip_stack(mut self, clips: Vec<ClipRef>) -> Self {
        self.clip_stack = Some(clips);
        self
    }

    /// Enables or disables viewport culling.
    #[must_use]
    pub fn with_culling(mut self, culling: bool) -> Self {
        self.culling = culling;
        self
    }

    // -- Property getters (no dirty marking) --

    /// The element's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The kind-specific payload.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The transform, or `None` for identity.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> Option<&Affine> {
        self.transform.as_ref()
    }

    /// The clip stack, outermost first.
    #[inline]
    #[must_use]
    pub fn clip_stack(&self) -> Option<&[ClipRef]> {
        self.clip_stack.as_deref()
    }

    /// The style.
    #[inline]
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Whether the element is visible.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether viewport culling is enabled.
    #[inline]
    #[must_use]
    pub fn culling(&self) -> bool {
        self.culling
    }

    /// Whether the element changed since it was last drawn.
    ///
    /// A group is dirty when it or any of its children is.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
            || matches!(&self.kind, ElementKind::Group(g) if g.children.iter().any(Self::is_dirty))
    }

    /// The rect recorded at the end of the previous repaint, if the element
    /// was painted.
    #[inline]
    #[must_use]
    pub fn prev_paint_rect(&self) -> Option<Rect> {
        self.prev_paint_rect
    }

    // -- Property setters (mark dirty) --

    /// Replaces the kind-specific payload.
    pub fn kind_mut(&mut self) -> &mut ElementKind {
        self.dirty = true;
        &mut self.kind
    }

    /// Replaces the style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
        self.dirty = true;
    }

    /// Mutable access to the style.
    pub fn style_mut(&mut self) -> &mut Style {
        self.dirty = true;
        &mut self.style
    }

    /// Replaces the transform.
    pub fn set_transform(&mut self, transform: Option<Affine>) {
        self.transform = transform;
        self.dirty = true;
    }

    /// Replaces the clip stack.
    pub fn set_clip_stack(&mut self, clips: Option<Vec<ClipRef>>) {
        self.clip_stack = clips;
        self.dirty = true;
    }

    /// Shows or hides the element.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }

    /// Enables or disables viewport culling.
    pub fn set_culling(&mut self, culling: bool) {
        self.culling = culling;
        self.dirty = true;
    }

    // -- Repaint bookkeeping --

    /// Marks the element as needing a repaint.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks the element as up to date.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        if let ElementKind::Group(g) = &mut self.kind {
            for child in &mut g.children {
                child.mark_clean();
            }
        }
    }

    /// Records the rect this element is painted at for the next frame.
    pub fn set_prev_paint_rect(&mut self, rect: Option<Rect>) {
        self.prev_paint_rect = rect;
    }

    // -- Derived geometry --

    /// Surface-space extent of everything this element paints now.
    ///
    /// Includes half the stroke width, the shadow footprint, and rounds
    /// outward to whole pixels so anti-aliased edges are covered. Groups
    /// report the union of their visible children.
    #[must_use]
    pub fn paint_rect(&self) -> Rect {
        if let ElementKind::Group(g) = &self.kind {
            return g
                .children
                .iter()
                .filter(|c| c.visible)
                .map(Self::paint_rect)
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO);
        }
        let mut local = self.kind.local_bounds();
        if self.kind.is_outline() && self.style.has_stroke() {
            let half = self.style.stroke_style.width / 2.0;
            local = local.inflate(half, half);
        }
        let mut rect = transform_bounds(local, self.transform.as_ref());
        if let Some(shadow) = self.style.shadow.filter(|s| s.is_visible()) {
            let shadow_rect = (rect + shadow.offset).inflate(shadow.blur, shadow.blur);
            rect = rect.union(shadow_rect);
        }
        rect.expand()
    }

    /// Returns `true` if the element would put any pixels on a surface
    /// whose logical bounds are `viewport`.
    ///
    /// Hidden, fully transparent and zero-scaled elements are never painted;
    /// elements with culling enabled are also skipped when their paint rect
    /// misses the viewport.
    #[must_use]
    pub fn should_paint(&self, viewport: &Rect) -> bool {
        if !self.visible || self.style.is_transparent() || is_zero_scale(self.transform.as_ref()) {
            return false;
        }
        !(self.culling && !overlaps(&self.paint_rect(), viewport))
    }

    /// Appends this element's outline to the context's open path.
    #[inline]
    pub fn emit_geometry<C: DrawingContext + ?Sized>(&self, ctx: &mut C) {
        self.kind.emit_geometry(ctx);
    }

    /// Returns the batch this element can join, if any.
    ///
    /// Only paths qualify, and only when they use exactly one of fill or
    /// stroke, that paint is a flat colour, and no dash pattern is set.
    #[must_use]
    pub fn batch_key(&self) -> Option<BatchKey> {
        if !matches!(self.kind, ElementKind::Path(_)) || self.style.stroke_style.is_dashed() {
            return None;
        }
        match (self.style.has_fill(), self.style.has_stroke()) {
            (true, false) => self
                .style
                .fill
                .as_ref()
                .and_then(|p| p.solid_color())
                .map(BatchKey::Fill),
            (false, true) => self
                .style
                .stroke
                .as_ref()
                .and_then(|p| p.solid_color())
                .map(BatchKey::Stroke),
            _ => None,
        }
    }
}
