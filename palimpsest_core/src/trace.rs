// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the repaint cycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the damage, clear and replay stages call. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`DamageRect`] events and the
//!   corresponding `TraceSink` method.

use crate::context::PaintError;
use crate::element::ElementId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether a clip stack was entered or left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipAction {
    /// A clip stack was pushed.
    Push,
    /// A clip stack was popped.
    Pop,
}

/// Which paint operation a flushed batch performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// The batch was filled.
    Fill,
    /// The batch was stroked.
    Stroke,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a layer computed its damage for a frame.
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    /// Stacking order of the layer.
    pub z_level: i32,
    /// Valid candidate rects gathered before merging.
    pub candidates: usize,
    /// Rects left after merging.
    pub regions: usize,
    /// Whether this was the layer's first paint (damage suppressed).
    pub first_paint: bool,
}

/// Emitted when a layer clears its surface.
#[derive(Clone, Copy, Debug)]
pub struct ClearEvent {
    /// Stacking order of the layer.
    pub z_level: i32,
    /// Number of rects cleared (1 for a full clear).
    pub rects: usize,
    /// Whether the whole surface was cleared.
    pub full: bool,
    /// Whether the motion-blur trail was composited back.
    pub motion_blur: bool,
}

/// Emitted when the compositor pushes or pops an element clip stack.
#[derive(Clone, Copy, Debug)]
pub struct ClipEvent {
    /// Push or pop.
    pub action: ClipAction,
    /// Number of clips in the stack.
    pub depth: usize,
    /// Whether any clip in the stack encloses no area.
    pub degenerate: bool,
}

/// Emitted when a pending batch is drawn.
#[derive(Clone, Copy, Debug)]
pub struct BatchFlushEvent {
    /// Fill or stroke.
    pub kind: BatchKind,
    /// Number of elements whose geometry the batch combined.
    pub elements: usize,
}

/// Emitted when an element's paint could not be realized.
#[derive(Clone, Copy, Debug)]
pub struct PaintUnresolvedEvent {
    /// The affected element.
    pub element: ElementId,
    /// Why the paint failed.
    pub error: PaintError,
}

/// Per-pass totals emitted at the end of a replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Elements in the display list (top level).
    pub elements: usize,
    /// Elements whose geometry was emitted.
    pub drawn: usize,
    /// Elements skipped by visibility or viewport culling.
    pub culled: usize,
    /// Elements skipped under a degenerate clip.
    pub suppressed: usize,
    /// Batch flushes.
    pub batches: usize,
    /// Transform sets.
    pub transform_changes: usize,
    /// Style applications.
    pub style_changes: usize,
    /// Clip stack pushes.
    pub clip_pushes: usize,
}

/// An axis-aligned damage rectangle in device pixels.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[cfg(feature = "trace-rich")]
impl DamageRect {
    /// Converts a device-pixel rect, rounding outward.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "damage rects lie within surface bounds, well inside i32/u32"
    )]
    pub fn from_rect(rect: &kurbo::Rect) -> Self {
        let r = rect.expand();
        Self {
            x: r.x0 as i32,
            y: r.y0 as i32,
            width: r.width().max(0.0) as u32,
            height: r.height().max(0.0) as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the repaint cycle.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a layer computed its damage.
    fn on_damage(&mut self, e: &DamageEvent) {
        _ = e;
    }

    /// Called when a layer clears its surface.
    fn on_clear(&mut self, e: &ClearEvent) {
        _ = e;
    }

    /// Called on every clip stack push and pop.
    fn on_clip(&mut self, e: &ClipEvent) {
        _ = e;
    }

    /// Called when a pending batch is drawn.
    fn on_batch_flush(&mut self, e: &BatchFlushEvent) {
        _ = e;
    }

    /// Called when an element's paint could not be realized.
    fn on_paint_unresolved(&mut self, e: &PaintUnresolvedEvent) {
        _ = e;
    }

    /// Called at the end of a replay pass.
    fn on_replay_summary(&mut self, s: &ReplaySummary) {
        _ = s;
    }

    /// Called with a layer's merged damage rectangles (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, z_level: i32, rects: &[DamageRect]) {
        _ = (z_level, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`DamageEvent`].
    #[inline]
    pub fn damage(&mut self, e: &DamageEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_damage(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClearEvent`].
    #[inline]
    pub fn clear(&mut self, e: &ClearEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clear(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClipEvent`].
    #[inline]
    pub fn clip(&mut self, e: &ClipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BatchFlushEvent`].
    #[inline]
    pub fn batch_flush(&mut self, e: &BatchFlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_batch_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PaintUnresolvedEvent`].
    #[inline]
    pub fn paint_unresolved(&mut self, e: &PaintUnresolvedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_paint_unresolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReplaySummary`].
    #[inline]
    pub fn replay_summary(&mut self, s: &ReplaySummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_replay_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits damage rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, z_level: i32, rects: &[DamageRect]) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rects(z_level, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
