// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tiny-skia` raster backend for palimpsest.
//!
//! [`RasterSurface`] wraps a [`tiny_skia::Pixmap`] and implements both
//! halves of the backend contract:
//!
//! - [`DrawingContext`](palimpsest_core::context::DrawingContext): transform,
//!   mask-based clipping, solid/gradient/pattern paints, strokes with dashes,
//!   hard drop shadows and image drawing.
//! - [`Surface`](palimpsest_core::context::Surface): erase, background fill,
//!   and the copy/composite steps a layer uses for motion-blur trails.
//!
//! ```
//! use kurbo::Rect;
//! use palimpsest_core::context::Surface;
//! use palimpsest_core::style::{Paint, Rgba};
//! use palimpsest_raster::RasterSurface;
//!
//! let mut surface = RasterSurface::new(4, 4).unwrap();
//! let paint = Paint::Solid(Rgba::rgb(0, 0, 255));
//! surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), &paint, surface.bounds()).unwrap();
//! assert_eq!(surface.pixel(1, 1), Some([0, 0, 255, 255]));
//! assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 0]));
//! ```

mod convert;
mod error;
mod surface;

pub use error::SurfaceError;
pub use surface::RasterSurface;
