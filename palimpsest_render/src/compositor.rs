// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display-list replay with state diffing and batching.
//!
//! For each element, in order, the compositor:
//!
//! 1. skips it if it is hidden, fully transparent, collapsed to zero scale,
//!    or culled against the viewport;
//! 2. reconciles the clip stack by entry identity, popping the previous
//!    stack (which invalidates transform and style) and pushing the new one;
//! 3. skips it if the active clip encloses no area;
//! 4. sets the transform if it differs from the previous element's;
//! 5. applies only the style fields that changed;
//! 6. appends its geometry to the open batch, starts a new batch, or draws
//!    it on its own.
//!
//! The open batch is drawn before any change to clip, transform or style,
//! and at the end of the pass. The whole pass runs inside one save level,
//! so the context is left exactly as it was found.

use alloc::vec::Vec;

use kurbo::{Affine, Rect, Shape};
use palimpsest_core::context::{DrawingContext, PaintError};
use palimpsest_core::element::{BatchKey, Element, ElementKind};
use palimpsest_core::geometry::{overlaps, to_device};
use palimpsest_core::style::StyleDelta;
use palimpsest_core::trace::{
    BatchFlushEvent, BatchKind, ClipAction, ClipEvent, PaintUnresolvedEvent, ReplaySummary,
    Tracer,
};
use palimpsest_core::transform::{device_transform, same_transform};

use crate::clip::{StateGuard, same_clip_stack};
use crate::scope::{DrawScope, PendingBatch};
use crate::viewport::Viewport;

/// Tolerance for turning a damage rect into a clip path.
const REGION_TOLERANCE: f64 = 0.1;

/// Counters collected during one replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Elements whose geometry or image was emitted.
    pub drawn: usize,
    /// Elements skipped by visibility or viewport culling.
    pub culled: usize,
    /// Elements skipped under a degenerate clip.
    pub suppressed: usize,
    /// Batch flushes.
    pub batches: usize,
    /// Elements drawn through a batch.
    pub batched_elements: usize,
    /// Transform sets.
    pub transform_changes: usize,
    /// Style applications.
    pub style_changes: usize,
    /// Clip stack pushes.
    pub clip_pushes: usize,
    /// Top-level indices of elements whose paint could not be realized,
    /// ascending. These stay dirty after the pass.
    pub unresolved: Vec<usize>,
}

impl ReplayStats {
    /// Condenses the counters into a trace event.
    #[must_use]
    pub fn summary(&self, elements: usize) -> ReplaySummary {
        ReplaySummary {
            elements,
            drawn: self.drawn,
            culled: self.culled,
            suppressed: self.suppressed,
            batches: self.batches,
            transform_changes: self.transform_changes,
            style_changes: self.style_changes,
            clip_pushes: self.clip_pushes,
        }
    }
}

/// Replays display lists into a [`DrawingContext`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Compositor {
    viewport: Viewport,
}

impl Compositor {
    /// Creates a compositor for a surface of the given viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// The viewport elements are culled against.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replaces the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Draws every element into `ctx`.
    ///
    /// Elements are marked clean afterwards, except those listed in
    /// [`ReplayStats::unresolved`].
    pub fn replay<C: DrawingContext + ?Sized>(
        &self,
        ctx: &mut C,
        elements: &mut [Element],
    ) -> ReplayStats {
        self.replay_traced(ctx, elements, &mut Tracer::none())
    }

    /// [`replay`](Self::replay) with trace events.
    pub fn replay_traced<C: DrawingContext + ?Sized>(
        &self,
        ctx: &mut C,
        elements: &mut [Element],
        tracer: &mut Tracer<'_>,
    ) -> ReplayStats {
        self.run(ctx, elements, None, tracer)
    }

    /// Redraws only inside `regions` (device pixels).
    ///
    /// Each region is replayed under its own clip, with only the elements
    /// whose device paint rect touches it.
    pub fn replay_regions<C: DrawingContext + ?Sized>(
        &self,
        ctx: &mut C,
        elements: &mut [Element],
        regions: &[Rect],
        tracer: &mut Tracer<'_>,
    ) -> ReplayStats {
        self.run(ctx, elements, Some(regions), tracer)
    }

    fn run<C: DrawingContext + ?Sized>(
        &self,
        ctx: &mut C,
        elements: &mut [Element],
        regions: Option<&[Rect]>,
        tracer: &mut Tracer<'_>,
    ) -> ReplayStats {
        let mut stats = ReplayStats::default();
        {
            let list: &[Element] = elements;
            let mut guard = StateGuard::new(ctx);
            let mut pass = Pass {
                stats: &mut stats,
                tracer: &mut *tracer,
                dpr: self.viewport.dpr,
            };
            match regions {
                None => self.draw_list(&mut guard, list, None, None, &mut pass),
                Some(regions) => {
                    for region in regions {
                        let token = guard.save();
                        guard.set_transform(Affine::IDENTITY);
                        guard.clip(&region.to_path(REGION_TOLERANCE));
                        self.draw_list(&mut guard, list, Some(region), None, &mut pass);
                        guard.restore(token);
                    }
                }
            }
        }

        stats.unresolved.sort_unstable();
        for (index, el) in elements.iter_mut().enumerate() {
            if stats.unresolved.binary_search(&index).is_err() {
                el.mark_clean();
            }
        }
        tracer.replay_summary(&stats.summary(elements.len()));
        stats
    }

    /// Replays `elements` with a fresh scope.
    ///
    /// `owner` is the top-level index of the group being replayed, if any;
    /// unresolved children are reported against it.
    fn draw_list<'a, C: DrawingContext + ?Sized>(
        &self,
        guard: &mut StateGuard<'_, C>,
        elements: &'a [Element],
        region: Option<&Rect>,
        owner: Option<usize>,
        pass: &mut Pass<'_, '_>,
    ) {
        let mut scope = DrawScope::new(self.viewport);
        for (i, el) in elements.iter().enumerate() {
            if let Some(region) = region
                && !overlaps(&to_device(el.paint_rect(), pass.dpr), region)
            {
                continue;
            }
            self.draw_element(guard, &mut scope, el, owner.unwrap_or(i), pass);
        }

        pass.flush(&mut scope, &mut **guard);
        if let Some(token) = scope.clip_token.take() {
            guard.pop_clip(token);
            pass.tracer.clip(&ClipEvent {
                action: ClipAction::Pop,
                depth: scope.prev_clip_stack.map_or(0, <[_]>::len),
                degenerate: scope.clip_degenerate,
            });
        }
    }

    fn draw_element<'a, C: DrawingContext + ?Sized>(
        &self,
        guard: &mut StateGuard<'_, C>,
        scope: &mut DrawScope<'a>,
        el: &'a Element,
        index: usize,
        pass: &mut Pass<'_, '_>,
    ) {
        if !el.should_paint(&scope.viewport.bounds()) {
            pass.stats.culled += 1;
            return;
        }

        let clips = el.clip_stack();
        if !same_clip_stack(scope.prev_clip_stack, clips) {
            pass.flush(scope, &mut **guard);
            if let Some(token) = scope.clip_token.take() {
                guard.pop_clip(token);
                pass.tracer.clip(&ClipEvent {
                    action: ClipAction::Pop,
                    depth: scope.prev_clip_stack.map_or(0, <[_]>::len),
                    degenerate: scope.clip_degenerate,
                });
                scope.clip_degenerate = false;
                scope.force_reset();
            }
            if let Some(stack) = clips.filter(|s| !s.is_empty()) {
                let (token, degenerate) = guard.push_clips(stack, pass.dpr);
                scope.clip_token = Some(token);
                scope.clip_degenerate = degenerate;
                scope.transform_stale = true;
                pass.stats.clip_pushes += 1;
                pass.tracer.clip(&ClipEvent {
                    action: ClipAction::Push,
                    depth: stack.len(),
                    degenerate,
                });
            }
            scope.prev_clip_stack = clips;
        }
        if scope.clip_degenerate {
            pass.stats.suppressed += 1;
            return;
        }

        if let ElementKind::Group(group) = el.kind() {
            pass.flush(scope, &mut **guard);
            let token = guard.save();
            self.draw_list(guard, &group.children, None, Some(index), pass);
            guard.restore(token);
            scope.force_reset();
            scope.prev_element = Some(el);
            return;
        }

        let transform_changed = scope.transform_stale
            || scope
                .prev_element
                .is_none_or(|prev| !same_transform(prev.transform(), el.transform()));
        if transform_changed {
            pass.flush(scope, &mut **guard);
            guard.set_transform(device_transform(pass.dpr, el.transform()));
            scope.transform_stale = false;
            pass.stats.transform_changes += 1;
        }

        let key = el.batch_key();
        if key.is_none() {
            pass.flush(scope, &mut **guard);
        }

        let delta = match scope.prev_element {
            Some(prev) if !scope.style_stale => StyleDelta::between(prev.style(), el.style()),
            _ => StyleDelta::ALL,
        };
        let mut realized = Realized::ALL;
        if delta.any() {
            pass.flush(scope, &mut **guard);
            pass.stats.style_changes += 1;
            realized = apply_style(&mut **guard, el, delta);
            scope.style_stale = realized.error.is_some();
            if let Some(error) = realized.error {
                pass.unresolved(index, el, error);
            }
        }

        match el.kind() {
            ElementKind::Image(image) => match &image.image {
                Some(data) => {
                    guard.draw_image(data, image.dest);
                    pass.stats.drawn += 1;
                }
                None => pass.unresolved(index, el, PaintError::ImageNotReady),
            },
            _ => {
                if let Some(key) = key {
                    let joins = scope.batch.is_some_and(|b| b.key == key);
                    if joins {
                        if let Some(batch) = scope.batch.as_mut() {
                            batch.count += 1;
                        }
                    } else {
                        pass.flush(scope, &mut **guard);
                        guard.begin_path();
                        scope.batch = Some(PendingBatch { key, count: 1 });
                    }
                    el.emit_geometry(&mut **guard);
                    pass.stats.batched_elements += 1;
                } else {
                    guard.begin_path();
                    el.emit_geometry(&mut **guard);
                    let style = el.style();
                    if style.has_fill() && realized.fill {
                        guard.fill();
                    }
                    if style.has_stroke() && realized.stroke {
                        guard.stroke();
                    }
                }
                pass.stats.drawn += 1;
            }
        }
        scope.prev_element = Some(el);
    }
}

/// Mutable state shared by every scope of one pass.
struct Pass<'p, 't> {
    stats: &'p mut ReplayStats,
    tracer: &'p mut Tracer<'t>,
    dpr: f64,
}

impl Pass<'_, '_> {
    fn flush<C: DrawingContext + ?Sized>(&mut self, scope: &mut DrawScope<'_>, ctx: &mut C) {
        if let Some(batch) = scope.flush(ctx) {
            self.stats.batches += 1;
            self.tracer.batch_flush(&BatchFlushEvent {
                kind: match batch.key {
                    BatchKey::Fill(_) => BatchKind::Fill,
                    BatchKey::Stroke(_) => BatchKind::Stroke,
                },
                elements: batch.count,
            });
        }
    }

    fn unresolved(&mut self, index: usize, el: &Element, error: PaintError) {
        if !self.stats.unresolved.contains(&index) {
            self.stats.unresolved.push(index);
        }
        self.tracer.paint_unresolved(&PaintUnresolvedEvent {
            element: el.id(),
            error,
        });
    }
}

/// Which paints of an element made it onto the context.
#[derive(Clone, Copy, Debug)]
struct Realized {
    fill: bool,
    stroke: bool,
    error: Option<PaintError>,
}

impl Realized {
    const ALL: Self = Self {
        fill: true,
        stroke: true,
        error: None,
    };
}

/// Sets the fields of `el`'s style selected by `delta`.
///
/// A paint that fails to apply is skipped; the other fields are still set.
fn apply_style<C: DrawingContext + ?Sized>(
    ctx: &mut C,
    el: &Element,
    delta: StyleDelta,
) -> Realized {
    let style = el.style();
    if delta.opacity {
        ctx.set_opacity(style.opacity);
    }
    if delta.blend {
        ctx.set_blend_mode(style.blend);
    }
    if delta.shadow {
        ctx.set_shadow(style.shadow.as_ref());
    }
    if delta.stroke_style {
        ctx.set_stroke_style(&style.stroke_style);
    }

    let bounds = el.kind().local_bounds();
    let mut realized = Realized::ALL;
    if delta.fill
        && let Some(Err(error)) = style.fill.as_ref().map(|p| ctx.set_fill(p, bounds))
    {
        realized.fill = false;
        realized.error = Some(error);
    }
    if delta.stroke
        && let Some(Err(error)) = style.stroke.as_ref().map(|p| ctx.set_stroke(p, bounds))
    {
        realized.stroke = false;
        realized.error.get_or_insert(error);
    }
    realized
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{BezPath, Vec2};
    use palimpsest_core::element::{Clip, ElementId};
    use palimpsest_core::image::ImageData;
    use palimpsest_core::record::{Command, CommandRecorder};
    use palimpsest_core::style::{Pattern, Rgba, Style};

    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);
    const BLUE: Rgba = Rgba::rgb(0, 0, 255);

    fn compositor() -> Compositor {
        Compositor::new(Viewport::new(200.0, 200.0, 1.0))
    }

    fn rect_path(x: f64, y: f64, size: f64) -> BezPath {
        Rect::new(x, y, x + size, y + size).to_path(0.1)
    }

    fn filled(id: u64, x: f64, y: f64, color: Rgba) -> Element {
        Element::path(ElementId(id), rect_path(x, y, 10.0)).with_style(Style::filled(color))
    }

    fn position(cmds: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
        cmds.iter().position(pred).expect("command not recorded")
    }

    #[test]
    fn pass_restores_context_state() {
        let outer = Clip::rect(Rect::new(0.0, 0.0, 100.0, 100.0)).shared();
        let inner = Clip::rect(Rect::new(10.0, 10.0, 50.0, 50.0)).shared();
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            filled(2, 20.0, 20.0, BLUE)
                .with_clip_stack(vec![outer, inner])
                .with_transform(Affine::translate((5.0, 5.0))),
            filled(3, 60.0, 60.0, RED),
        ];

        let mut rec = CommandRecorder::new(200, 200);
        rec.set_transform(Affine::scale(3.0));
        let before = rec.state().clone();

        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.drawn, 3);
        assert_eq!(stats.clip_pushes, 1);
        assert_eq!(rec.state(), &before);
        assert_eq!(rec.save_depth(), 0);
        assert_eq!(
            rec.count(|c| *c == Command::Save),
            rec.count(|c| *c == Command::Restore)
        );
    }

    #[test]
    fn clip_boundary_forces_one_transform_set() {
        let clip = Clip::rect(Rect::new(0.0, 0.0, 50.0, 50.0)).shared();
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            filled(2, 20.0, 20.0, RED).with_clip_stack(vec![clip]),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        compositor().replay(&mut rec, &mut elements);
        let cmds = rec.commands();

        let clip_at = position(cmds, |c| matches!(c, Command::Clip(_)));
        let save_at = position(&cmds[1..], |c| *c == Command::Save) + 1;
        assert!(save_at < clip_at, "clip must be inside its own save level");

        let b_fill = cmds.iter().rposition(|c| *c == Command::Fill).unwrap();
        let sets = cmds[clip_at..b_fill]
            .iter()
            .filter(|c| matches!(c, Command::SetTransform(_)))
            .count();
        assert_eq!(sets, 1);

        // A's batch is drawn before the clip is pushed.
        let a_fill = position(cmds, |c| *c == Command::Fill);
        assert!(a_fill < save_at, "A must be flushed before B's clip");

        // B's clip level is closed before the pass level.
        assert_eq!(&cmds[cmds.len() - 2..], &[Command::Restore, Command::Restore]);
        // Same colour, so B does not re-apply style.
        assert_eq!(rec.count(|c| matches!(c, Command::SetFill(_))), 1);
    }

    #[test]
    fn flat_fills_share_one_batch() {
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            filled(2, 20.0, 0.0, RED),
            filled(3, 40.0, 0.0, RED),
            Element::path(ElementId(4), rect_path(60.0, 0.0, 10.0))
                .with_style(Style::stroked(RED, 2.0)),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        let cmds = rec.commands();

        let first_stroke_set = position(cmds, |c| matches!(c, Command::SetStroke(_)));
        let fills_before = cmds[..first_stroke_set]
            .iter()
            .filter(|c| **c == Command::Fill)
            .count();
        assert_eq!(fills_before, 1);
        assert_eq!(rec.count(|c| *c == Command::Fill), 1);
        assert_eq!(rec.count(|c| *c == Command::Stroke), 1);
        assert_eq!(rec.count(|c| matches!(c, Command::AppendPath(_))), 4);
        assert_eq!(rec.count(|c| *c == Command::BeginPath), 2);
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.batched_elements, 4);
        assert_eq!(stats.transform_changes, 1);
    }

    #[test]
    fn colour_change_splits_batches() {
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            filled(2, 20.0, 0.0, BLUE),
            filled(3, 40.0, 0.0, BLUE),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.batches, 2);
        assert_eq!(rec.count(|c| *c == Command::Fill), 2);
        assert_eq!(rec.count(|c| matches!(c, Command::SetFill(_))), 2);
    }

    #[test]
    fn unbatchable_elements_draw_individually() {
        let mut both = Style::filled(RED);
        both.stroke = Some(BLUE.into());
        let mut elements = vec![
            Element::path(ElementId(1), rect_path(0.0, 0.0, 10.0)).with_style(both.clone()),
            Element::path(ElementId(2), rect_path(20.0, 0.0, 10.0)).with_style(both),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.batches, 0);
        assert_eq!(rec.count(|c| *c == Command::BeginPath), 2);
        assert_eq!(rec.count(|c| *c == Command::Fill), 2);
        assert_eq!(rec.count(|c| *c == Command::Stroke), 2);
        // Identical styles are applied once.
        assert_eq!(stats.style_changes, 1);
    }

    #[test]
    fn degenerate_clip_suppresses_drawing() {
        let empty = Clip::rect(Rect::new(5.0, 5.0, 5.0, 30.0)).shared();
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED).with_clip_stack(vec![empty.clone()]),
            filled(2, 20.0, 0.0, BLUE).with_clip_stack(vec![empty]),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.suppressed, 2);
        assert_eq!(stats.drawn, 0);
        assert_eq!(stats.clip_pushes, 1);
        assert_eq!(rec.count(|c| matches!(c, Command::AppendPath(_))), 0);
        assert_eq!(rec.count(|c| matches!(c, Command::SetFill(_))), 0);
        assert_eq!(rec.save_depth(), 0);
    }

    #[test]
    fn culled_elements_are_counted_and_cleaned() {
        let mut hidden = filled(1, 0.0, 0.0, RED);
        hidden.set_visible(false);
        let mut elements = vec![
            hidden,
            filled(2, 500.0, 500.0, RED).with_culling(true),
            filled(3, 0.0, 0.0, RED),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.culled, 2);
        assert_eq!(stats.drawn, 1);
        assert!(elements.iter().all(|e| !e.is_dirty()));
    }

    #[test]
    fn pending_pattern_leaves_element_dirty() {
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            Element::path(ElementId(2), rect_path(20.0, 0.0, 10.0))
                .with_style(Style::filled(Pattern::pending())),
            filled(3, 40.0, 0.0, RED),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);

        assert_eq!(stats.unresolved, vec![1]);
        assert!(!elements[0].is_dirty());
        assert!(elements[1].is_dirty());
        assert!(!elements[2].is_dirty());

        // The failed element's fill is skipped, and the element after it
        // re-applies its full style.
        assert_eq!(rec.count(|c| *c == Command::Fill), 2);
        assert_eq!(rec.count(|c| matches!(c, Command::SetOpacity(_))), 2);
        assert_eq!(rec.state().fill, None, "pass must restore the fill");
    }

    #[test]
    fn images_draw_or_report_not_ready() {
        let pixels = ImageData::solid(2, 2, [255, 0, 0, 255]);
        let dest = Rect::new(0.0, 0.0, 20.0, 20.0);
        let mut elements = vec![
            Element::image(ElementId(1), pixels, dest),
            Element::image(ElementId(2), None, dest),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(rec.count(|c| *c == Command::DrawImage(dest)), 1);
        assert_eq!(stats.unresolved, vec![1]);
        assert!(elements[1].is_dirty());
    }

    #[test]
    fn groups_replay_in_their_own_level() {
        let clip = Clip::rect(Rect::new(0.0, 0.0, 100.0, 100.0)).shared();
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED),
            Element::group(
                ElementId(2),
                vec![
                    filled(3, 10.0, 10.0, RED).with_clip_stack(vec![clip]),
                    filled(4, 30.0, 10.0, RED),
                ],
            ),
            filled(5, 50.0, 50.0, RED),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.drawn, 4);
        assert_eq!(rec.save_depth(), 0);
        // The group's first child and the element after the group both
        // start from a reset scope.
        assert_eq!(stats.transform_changes, 4);
        assert!(elements.iter().all(|e| !e.is_dirty()));
    }

    #[test]
    fn unresolved_group_child_keeps_group_dirty() {
        let mut elements = vec![Element::group(
            ElementId(1),
            vec![
                filled(2, 0.0, 0.0, RED),
                Element::path(ElementId(3), rect_path(20.0, 0.0, 10.0))
                    .with_style(Style::stroked(Pattern::pending(), 1.0)),
            ],
        )];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.unresolved, vec![0]);
        assert!(elements[0].is_dirty());
    }

    #[test]
    fn transforms_are_only_set_on_change() {
        let shifted = Affine::translate(Vec2::new(5.0, 0.0));
        let mut elements = vec![
            filled(1, 0.0, 0.0, RED).with_transform(shifted),
            filled(2, 20.0, 0.0, RED).with_transform(shifted),
            filled(3, 40.0, 0.0, RED),
            filled(4, 60.0, 0.0, RED).with_transform(Affine::IDENTITY),
        ];
        let mut rec = CommandRecorder::new(200, 200);
        let stats = compositor().replay(&mut rec, &mut elements);
        assert_eq!(stats.transform_changes, 2);
        assert_eq!(stats.batches, 2, "a transform change splits the batch");
    }

    #[test]
    fn device_pixel_ratio_scales_transforms() {
        let mut elements = vec![filled(1, 0.0, 0.0, RED).with_transform(Affine::translate((3.0, 4.0)))];
        let mut rec = CommandRecorder::new(400, 400);
        Compositor::new(Viewport::new(200.0, 200.0, 2.0)).replay(&mut rec, &mut elements);
        assert!(rec.commands().contains(&Command::SetTransform(Affine::new([
            2.0, 0.0, 0.0, 2.0, 6.0, 8.0
        ]))));
    }

    #[test]
    fn region_replay_draws_only_touching_elements() {
        let mut elements = vec![filled(1, 0.0, 0.0, RED), filled(2, 150.0, 150.0, RED)];
        let mut rec = CommandRecorder::new(200, 200);
        let region = Rect::new(140.0, 140.0, 170.0, 170.0);
        let stats = compositor().replay_regions(
            &mut rec,
            &mut elements,
            &[region],
            &mut Tracer::none(),
        );
        assert_eq!(stats.drawn, 1);
        assert_eq!(
            rec.commands()
                .iter()
                .filter_map(|c| match c {
                    Command::AppendPath(r) => Some(*r),
                    _ => None,
                })
                .collect::<Vec<_>>(),
            vec![Rect::new(150.0, 150.0, 160.0, 160.0)]
        );
        assert!(rec.commands().contains(&Command::Clip(region)));
        assert_eq!(rec.save_depth(), 0);
    }
}
