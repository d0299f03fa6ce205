// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for drawing contexts and raster surfaces.
//!
//! The compositor drives two capabilities that backends provide:
//!
//! - **[`DrawingContext`]**: a stateful, canvas-like context: an affine
//!   transform, a clip region, fill/stroke paints and stroke parameters, an
//!   open path, and a save/restore stack covering all of those.
//!
//! - **[`Surface`]**: whole-surface pixel operations used by layer
//!   clearing: rectangular erase and fill, and the copy/composite steps of
//!   motion-blur trailing.
//!
//! All rect arguments of [`Surface`] methods are in device pixels and ignore
//! the context transform and clip. [`DrawingContext`] methods operate under
//! the current transform and clip.
//!
//! # State on failure
//!
//! Setting a paint that cannot be realized returns a [`PaintError`] and must
//! leave every piece of context state exactly as it was. The compositor
//! relies on this: it skips the affected fill or stroke and re-applies the
//! full style for the next element, so a bad value never leaks from one
//! element into another.

use kurbo::{Affine, BezPath, Rect};

use crate::image::ImageData;
use crate::style::{BlendMode, Paint, Shadow, StrokeStyle};

/// Why a paint could not be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PaintError {
    /// The pattern's tile image has not finished loading.
    #[error("pattern image is not loaded yet")]
    PatternNotReady,
    /// An image element's pixels have not finished loading.
    #[error("image is not loaded yet")]
    ImageNotReady,
    /// The backend cannot represent this paint (for example a gradient
    /// without stops).
    #[error("paint is not supported by this context")]
    Unsupported,
}

/// A stateful 2-D drawing context.
///
/// Implemented by raster backends and by
/// [`CommandRecorder`](crate::record::CommandRecorder) for tests.
pub trait DrawingContext {
    /// Pushes the transform, clip, paint and stroke state.
    fn save(&mut self);

    /// Pops the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Replaces the current transform (user space to device pixels).
    fn set_transform(&mut self, transform: Affine);

    /// Intersects the clip region with `path` under the current transform.
    fn clip(&mut self, path: &BezPath);

    /// Sets the global opacity applied to every subsequent draw.
    fn set_opacity(&mut self, opacity: f32);

    /// Sets the composition mode.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Sets or clears the drop shadow.
    fn set_shadow(&mut self, shadow: Option<&Shadow>);

    /// Sets the fill paint. `bounds` is the local-space box that
    /// bounding-box gradients resolve against.
    ///
    /// # Errors
    ///
    /// Returns a [`PaintError`] if the paint cannot be realized; the previous
    /// fill stays in effect.
    fn set_fill(&mut self, paint: &Paint, bounds: Rect) -> Result<(), PaintError>;

    /// Sets the stroke paint. See [`set_fill`](Self::set_fill).
    ///
    /// # Errors
    ///
    /// Returns a [`PaintError`] if the paint cannot be realized; the previous
    /// stroke stays in effect.
    fn set_stroke(&mut self, paint: &Paint, bounds: Rect) -> Result<(), PaintError>;

    /// Sets line width, caps, joins, miter limit and dash.
    fn set_stroke_style(&mut self, style: &StrokeStyle);

    /// Discards the open path and starts an empty one.
    fn begin_path(&mut self);

    /// Appends `path` to the open path.
    fn append_path(&mut self, path: &BezPath);

    /// Fills the open path with the current fill paint.
    fn fill(&mut self);

    /// Strokes the open path with the current stroke paint and style.
    fn stroke(&mut self);

    /// Draws `image` scaled into `dest` (local space).
    fn draw_image(&mut self, image: &ImageData, dest: Rect);
}

/// Pixel-level operations on a layer's backing store.
pub trait Surface {
    /// Width and height in device pixels.
    fn size(&self) -> (u32, u32);

    /// Sets every pixel in `rect` to transparent.
    fn erase_rect(&mut self, rect: Rect);

    /// Paints `rect` with `paint`, resolving bounding-box gradients against
    /// `paint_bounds` rather than `rect`.
    ///
    /// # Errors
    ///
    /// Returns a [`PaintError`] if the paint cannot be realized; no pixels
    /// are touched in that case.
    fn fill_rect(&mut self, rect: Rect, paint: &Paint, paint_bounds: Rect)
    -> Result<(), PaintError>;

    /// Creates a transparent surface of the same size.
    fn blank_like(&self) -> Self
    where
        Self: Sized;

    /// Replaces this surface's pixels with `source`'s.
    fn copy_from(&mut self, source: &Self)
    where
        Self: Sized;

    /// Draws the pixels of `source` within `rect` over this surface at
    /// `alpha` opacity.
    fn composite_from(&mut self, source: &Self, rect: Rect, alpha: f32)
    where
        Self: Sized;

    /// The whole surface as a device-pixel rect.
    fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0.0, 0.0, f64::from(w), f64::from(h))
    }
}
