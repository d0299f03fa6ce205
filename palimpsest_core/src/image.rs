// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared raster image data.

use alloc::sync::Arc;
use alloc::vec::Vec;

/// Immutable premultiplied RGBA8 pixels.
///
/// Cloning is cheap: the pixel buffer is reference-counted, so the same
/// image can back many elements and pattern paints.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl core::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl ImageData {
    /// Wraps premultiplied RGBA8 pixels.
    ///
    /// Returns `None` if either dimension is zero or `pixels` is not exactly
    /// `width * height * 4` bytes long.
    #[must_use]
    pub fn from_premultiplied_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if expected == 0 || pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Creates an image filled with one premultiplied colour.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let count = (width as usize).checked_mul(height as usize)?;
        let mut pixels = Vec::with_capacity(count.checked_mul(4)?);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self::from_premultiplied_rgba8(width, height, pixels)
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw premultiplied RGBA8 bytes, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(ImageData::from_premultiplied_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(ImageData::from_premultiplied_rgba8(0, 2, vec![]).is_none());
        assert!(ImageData::from_premultiplied_rgba8(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = ImageData::solid(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.pixels().len(), 24);
        assert!(img.pixels().chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn solid_rejects_sizes_whose_byte_count_overflows() {
        assert!(ImageData::solid(u32::MAX, u32::MAX, [0; 4]).is_none());
    }
}
