// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass diffing state.

use palimpsest_core::context::DrawingContext;
use palimpsest_core::element::{BatchKey, ClipRef, Element};

use crate::clip::ClipToken;
use crate::viewport::Viewport;

/// A run of batchable elements whose geometry shares one open path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingBatch {
    /// The paint every element in the run uses.
    pub key: BatchKey,
    /// Number of elements appended so far.
    pub count: usize,
}

/// What the compositor remembers between consecutive elements of a pass.
///
/// A fresh scope has nothing to diff against, so the first element sets its
/// transform and full style. Groups replay their children with their own
/// scope.
#[derive(Debug)]
pub struct DrawScope<'a> {
    /// The last element drawn in this scope.
    pub prev_element: Option<&'a Element>,
    /// Clip stack currently pushed on the context.
    pub prev_clip_stack: Option<&'a [ClipRef]>,
    /// Whether [`prev_clip_stack`](Self::prev_clip_stack) encloses no area.
    pub clip_degenerate: bool,
    /// The open batch, if any.
    pub batch: Option<PendingBatch>,
    /// Logical viewport, for culling.
    pub viewport: Viewport,
    pub(crate) clip_token: Option<ClipToken>,
    pub(crate) transform_stale: bool,
    pub(crate) style_stale: bool,
}

impl DrawScope<'_> {
    /// A scope with no previous element.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            prev_element: None,
            prev_clip_stack: None,
            clip_degenerate: false,
            batch: None,
            viewport,
            clip_token: None,
            transform_stale: true,
            style_stale: true,
        }
    }

    /// Draws the open batch, if any, and returns it.
    pub fn flush<C: DrawingContext + ?Sized>(&mut self, ctx: &mut C) -> Option<PendingBatch> {
        let batch = self.batch.take()?;
        match batch.key {
            BatchKey::Fill(_) => ctx.fill(),
            BatchKey::Stroke(_) => ctx.stroke(),
        }
        Some(batch)
    }

    /// Forgets the previous transform and style, so the next element sets
    /// both in full.
    pub fn force_reset(&mut self) {
        self.transform_stale = true;
        self.style_stale = true;
    }
}

#[cfg(test)]
mod tests {
    use palimpsest_core::record::{Command, CommandRecorder};
    use palimpsest_core::style::Rgba;

    use super::*;

    #[test]
    fn flush_draws_with_the_batch_paint() {
        let mut rec = CommandRecorder::new(1, 1);
        let mut scope = DrawScope::new(Viewport::default());
        assert!(scope.flush(&mut rec).is_none());

        scope.batch = Some(PendingBatch {
            key: BatchKey::Stroke(Rgba::BLACK),
            count: 2,
        });
        let flushed = scope.flush(&mut rec);
        assert_eq!(flushed.map(|b| b.count), Some(2));
        assert!(scope.batch.is_none());
        assert_eq!(rec.commands(), &[Command::Stroke]);
    }
}
