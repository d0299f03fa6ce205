// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Balanced save/restore around a drawing context.
//!
//! [`StateGuard`] owns every `save()` the compositor issues. Each nested
//! scope (a clip stack, a group, a damage region) is opened with
//! [`StateGuard::save`] or [`StateGuard::push_clips`] and hands back a
//! [`ClipToken`] that must be returned in LIFO order. Dropping the guard
//! restores whatever is still open, so an early return or a panic inside a
//! pass still leaves the context as it was found.

use core::ops::{Deref, DerefMut};

use alloc::sync::Arc;

use palimpsest_core::context::DrawingContext;
use palimpsest_core::element::ClipRef;
use palimpsest_core::transform::device_transform;

/// Proof of an open save level, returned to [`StateGuard::restore`].
#[must_use = "an open save level must be handed back to `StateGuard::restore`"]
#[derive(Debug, PartialEq, Eq)]
pub struct ClipToken {
    depth: usize,
}

impl ClipToken {
    /// Save depth this token closes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// RAII wrapper that keeps a context's save stack balanced.
pub struct StateGuard<'a, C: DrawingContext + ?Sized> {
    ctx: &'a mut C,
    depth: usize,
}

impl<C: DrawingContext + ?Sized> core::fmt::Debug for StateGuard<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateGuard")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl<'a, C: DrawingContext + ?Sized> StateGuard<'a, C> {
    /// Saves the context state; it is restored when the guard drops.
    pub fn new(ctx: &'a mut C) -> Self {
        ctx.save();
        Self { ctx, depth: 1 }
    }

    /// Number of saves currently held, including the guard's own.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Opens a nested save level.
    pub fn save(&mut self) -> ClipToken {
        self.ctx.save();
        self.depth += 1;
        ClipToken { depth: self.depth }
    }

    /// Closes the level opened by `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the innermost open level.
    pub fn restore(&mut self, token: ClipToken) {
        assert_eq!(
            token.depth, self.depth,
            "save levels must be restored innermost first"
        );
        self.ctx.restore();
        self.depth -= 1;
    }

    /// Opens a save level and intersects every clip of `clips` in order.
    ///
    /// Each clip is applied under its own transform scaled by `dpr`. The
    /// returned flag is `true` if any clip encloses no area.
    pub fn push_clips(&mut self, clips: &[ClipRef], dpr: f64) -> (ClipToken, bool) {
        let token = self.save();
        let mut degenerate = false;
        for clip in clips {
            self.ctx
                .set_transform(device_transform(dpr, Some(&clip.transform())));
            self.ctx.clip(clip.shape());
            degenerate |= clip.is_degenerate();
        }
        (token, degenerate)
    }

    /// Closes a level opened by [`push_clips`](Self::push_clips).
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the innermost open level.
    pub fn pop_clip(&mut self, token: ClipToken) {
        self.restore(token);
    }
}

impl<C: DrawingContext + ?Sized> Deref for StateGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.ctx
    }
}

impl<C: DrawingContext + ?Sized> DerefMut for StateGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.ctx
    }
}

impl<C: DrawingContext + ?Sized> Drop for StateGuard<'_, C> {
    fn drop(&mut self) {
        while self.depth > 0 {
            self.ctx.restore();
            self.depth -= 1;
        }
    }
}

/// Compares two clip stacks by the identity of their entries.
///
/// `None` and an empty stack are the same stack.
#[must_use]
pub fn same_clip_stack(a: Option<&[ClipRef]>, b: Option<&[ClipRef]>) -> bool {
    let a = a.unwrap_or_default();
    let b = b.unwrap_or_default();
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Rect;
    use palimpsest_core::element::Clip;
    use palimpsest_core::record::{Command, CommandRecorder};

    use super::*;

    #[test]
    fn drop_restores_outstanding_levels() {
        let mut rec = CommandRecorder::new(10, 10);
        {
            let mut guard = StateGuard::new(&mut rec);
            let clip = Clip::rect(Rect::new(0.0, 0.0, 5.0, 5.0)).shared();
            let (_token, degenerate) = guard.push_clips(&[clip.clone(), clip], 1.0);
            assert!(!degenerate);
            assert_eq!(guard.depth(), 2);
        }
        assert_eq!(rec.save_depth(), 0);
        assert_eq!(rec.state().clip_depth, 0);
        assert_eq!(rec.count(|c| *c == Command::Clip(Rect::new(0.0, 0.0, 5.0, 5.0))), 2);
    }

    #[test]
    fn push_clips_reports_degenerate() {
        let mut rec = CommandRecorder::new(10, 10);
        let mut guard = StateGuard::new(&mut rec);
        let ok = Clip::rect(Rect::new(0.0, 0.0, 5.0, 5.0)).shared();
        let empty = Clip::rect(Rect::new(3.0, 3.0, 3.0, 3.0)).shared();
        let (token, degenerate) = guard.push_clips(&[ok, empty], 2.0);
        assert!(degenerate);
        guard.pop_clip(token);
        assert_eq!(guard.depth(), 1);
    }

    #[test]
    #[should_panic(expected = "innermost first")]
    fn out_of_order_restore_panics() {
        let mut rec = CommandRecorder::new(10, 10);
        let mut guard = StateGuard::new(&mut rec);
        let outer = guard.save();
        let _inner = guard.save();
        guard.restore(outer);
    }

    #[test]
    fn clip_stack_identity() {
        let a = Clip::rect(Rect::new(0.0, 0.0, 1.0, 1.0)).shared();
        let a_copy = Arc::new((*a).clone());
        let stack = vec![a.clone()];
        assert!(same_clip_stack(Some(&stack[..]), Some(&[a][..])));
        assert!(!same_clip_stack(Some(&stack[..]), Some(&[a_copy][..])));
        assert!(same_clip_stack(None, Some(&[][..])));
        assert!(!same_clip_stack(None, Some(&stack[..])));
    }
}
