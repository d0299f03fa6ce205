// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage computation, layer clearing and display-list replay.
//!
//! This crate turns a display list of [`Element`]s into pixels on a
//! [`Surface`] while touching as little as possible:
//!
//! - [`Layer`]: owns one surface at a stacking level, works out which
//!   device-pixel rects changed since the last frame, and clears them
//!   (optionally with a background paint and a motion-blur trail).
//! - [`Compositor`]: replays elements into a [`DrawingContext`], diffing
//!   clip, transform and style against the previous element so the context
//!   only sees real state changes, and batching flat-colour paths into one
//!   fill or stroke.
//! - [`merge_and_bound`]: the clustering step that bounds the number of
//!   damage rects a frame repaints.
//! - [`DamageRegion`]: what a [`Layer::refresh`] repainted.
//!
//! [`Element`]: palimpsest_core::element::Element
//! [`Surface`]: palimpsest_core::context::Surface
//! [`DrawingContext`]: palimpsest_core::context::DrawingContext

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod clip;
mod compositor;
mod damage;
mod layer;
mod scope;
mod viewport;

pub use clip::{ClipToken, StateGuard, same_clip_stack};
pub use compositor::{Compositor, ReplayStats};
pub use damage::{DamageRegion, merge_and_bound};
pub use layer::{Layer, LayerConfig, Refresh};
pub use scope::{DrawScope, PendingBatch};
pub use viewport::Viewport;
