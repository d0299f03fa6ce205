// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned rectangle helpers.
//!
//! Damage tracking works on [`kurbo::Rect`] values in surface space. The
//! functions here add the few operations the compositor needs on top of
//! kurbo's own: validity checks, in-place intersection that reports whether
//! the rects overlapped at all, and the "area cost" used to decide which
//! clusters to merge.
//!
//! Overlap is inclusive: two rects that only share an edge are considered
//! overlapping, so adjacent damage merges into one cluster.

use kurbo::{Affine, Rect};

/// Returns `true` if every coordinate of `rect` is finite.
///
/// Rects containing `NaN` or infinities are excluded from damage
/// aggregation rather than treated as errors.
#[inline]
#[must_use]
pub fn is_valid(rect: &Rect) -> bool {
    rect.is_finite()
}

/// Returns `true` if `rect` covers a non-zero area.
#[inline]
#[must_use]
pub fn has_area(rect: &Rect) -> bool {
    rect.width() != 0.0 && rect.height() != 0.0
}

/// Returns the (non-negative) area of `rect`.
#[inline]
#[must_use]
pub fn area(rect: &Rect) -> f64 {
    rect.abs().area()
}

/// Returns `true` if the two rects overlap or touch.
#[must_use]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    let a = a.abs();
    let b = b.abs();
    !(a.x1 < b.x0 || b.x1 < a.x0 || a.y1 < b.y0 || b.y1 < a.y0)
}

/// Intersects `target` with `other` in place.
///
/// Returns `false` and leaves `target` untouched when the rects do not
/// overlap.
pub fn intersect_into(target: &mut Rect, other: &Rect) -> bool {
    if !overlaps(target, other) {
        return false;
    }
    *target = target.abs().intersect(other.abs());
    true
}

/// Grows `target` to the bounding rect of itself and `other`.
pub fn union_into(target: &mut Rect, other: &Rect) {
    *target = target.abs().union(other.abs());
}

/// Transforms the four corners of `rect` and returns their axis-aligned
/// bounds. `None` is the identity.
#[must_use]
pub fn transform_bounds(rect: Rect, transform: Option<&Affine>) -> Rect {
    match transform {
        Some(t) => t.transform_rect_bbox(rect.abs()),
        None => rect.abs(),
    }
}

/// Extra area covered by merging `a` and `b` into their bounding rect.
///
/// Overlapping rects can produce a negative cost; that only makes them
/// better merge candidates.
#[must_use]
pub fn merge_cost(a: &Rect, b: &Rect) -> f64 {
    area(&a.union(*b)) - area(a) - area(b)
}

/// Scales a logical-pixel rect to device pixels.
#[inline]
#[must_use]
pub fn to_device(rect: Rect, dpr: f64) -> Rect {
    rect.scale_from_origin(dpr)
}
