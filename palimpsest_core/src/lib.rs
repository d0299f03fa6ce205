// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry, style, element model and drawing-context contracts for
//! damage-tracked 2D compositing.
//!
//! `palimpsest_core` provides the data that a retained-mode compositor
//! consumes. It is `no_std` compatible (with `alloc`) and keeps every piece
//! of per-frame bookkeeping explicit on plain structs, so that the repaint
//! machinery in `palimpsest_render` can be tested with nothing more than a
//! [`CommandRecorder`](record::CommandRecorder).
//!
//! # Architecture
//!
//! An external scene graph flattens its tree into a display list of
//! [`Element`](element::Element)s and marks the ones that changed. The
//! render crate then runs one repaint cycle per layer:
//!
//! ```text
//!   scene graph ──► [Element] (dirty flags, paint rects)
//!                        │
//!                        ▼
//!   Layer::compute_damage ──► merged damage rects
//!                        │
//!                        ▼
//!   Layer::clear ──► Surface (erase, background, motion-blur trail)
//!                        │
//!                        ▼
//!   Compositor::replay ──► DrawingContext (clip/transform/style diffing)
//! ```
//!
//! **[`geometry`]**: Rect helpers on top of [`kurbo::Rect`]: validity,
//! in-place intersection and union, transformed bounds, merge cost.
//!
//! **[`transform`]**: Optional-affine comparisons used by transform diffing.
//!
//! **[`style`]**: Paints (solid, gradient, pattern), shadows, stroke styles
//! and the diffable [`Style`](style::Style) record.
//!
//! **[`image`]**: Premultiplied RGBA8 pixel data shared by image elements
//! and pattern paints.
//!
//! **[`element`]**: The drawable [`Element`](element::Element) with its
//! tagged [`ElementKind`](element::ElementKind), clip stack, dirty flag and
//! previous paint rect.
//!
//! **[`context`]**: The [`DrawingContext`](context::DrawingContext) and
//! [`Surface`](context::Surface) traits that backends implement.
//!
//! **[`record`]**: A recording context for tests and diagnostics.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! repaint instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-rect
//!   damage events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod context;
pub mod element;
pub mod geometry;
pub mod image;
pub mod record;
pub mod style;
pub mod trace;
pub mod transform;
