// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical surface size and device pixel ratio.

use kurbo::Rect;

/// Logical size of a layer's surface and its device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels.
    pub width: f64,
    /// Height in logical pixels.
    pub height: f64,
    /// Device pixels per logical pixel.
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    /// The viewport in logical pixels, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Surface size in whole device pixels.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "surface dimensions are far below u32::MAX"
    )]
    pub fn device_size(&self) -> (u32, u32) {
        let w = (self.width * self.dpr).ceil().max(0.0);
        let h = (self.height * self.dpr).ceil().max(0.0);
        (w as u32, h as u32)
    }
}
