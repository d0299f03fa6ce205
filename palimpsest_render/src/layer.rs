// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One raster surface at one stacking level.
//!
//! A [`Layer`] remembers where each element was painted last frame, turns
//! the changes since then into a short list of device-pixel damage rects,
//! and clears those rects before the compositor redraws them.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use kurbo::Rect;
use palimpsest_core::context::{DrawingContext, PaintError, Surface};
use palimpsest_core::element::{Element, ElementId};
use palimpsest_core::geometry::{has_area, is_valid, to_device};
use palimpsest_core::style::Paint;
use palimpsest_core::trace::{ClearEvent, DamageEvent, Tracer};

use crate::compositor::{Compositor, ReplayStats};
use crate::damage::{DamageRegion, merge_and_bound};
use crate::viewport::Viewport;

/// Per-layer repaint settings.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    /// Paint laid under every cleared area, if any.
    pub background: Option<Paint>,
    /// Composite the previous frame back over cleared areas.
    pub motion_blur: bool,
    /// Opacity of the previous frame in the trail, `0.0..=1.0`.
    pub trail_alpha: f32,
    /// Upper bound on damage rects per frame.
    pub max_merged_regions: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            background: None,
            motion_blur: false,
            trail_alpha: Self::DEFAULT_TRAIL_ALPHA,
            max_merged_regions: Self::DEFAULT_MAX_MERGED_REGIONS,
        }
    }
}

impl LayerConfig {
    /// Default bound on damage rects per frame.
    pub const DEFAULT_MAX_MERGED_REGIONS: usize = 5;

    /// Default trail opacity.
    pub const DEFAULT_TRAIL_ALPHA: f32 = 0.7;

    /// A motion-blur configuration with the given trail opacity.
    #[must_use]
    pub fn trailing(alpha: f32) -> Self {
        Self {
            motion_blur: true,
            trail_alpha: alpha.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Sets the background paint.
    #[must_use]
    pub fn with_background(mut self, paint: impl Into<Paint>) -> Self {
        self.background = Some(paint.into());
        self
    }
}

/// Result of one [`Layer::refresh`].
#[derive(Clone, Debug, PartialEq)]
pub struct Refresh {
    /// What was repainted.
    pub region: DamageRegion,
    /// Counters from the replay, if one ran.
    pub stats: ReplayStats,
    /// Set when the background could not be painted. The cleared area was
    /// left transparent and the next refresh repaints the whole surface.
    pub background: Option<PaintError>,
}

/// A surface bound to a stacking level, with damage tracking.
#[derive(Debug)]
pub struct Layer<S> {
    z_level: i32,
    surface: S,
    back_buffer: Option<S>,
    viewport: Viewport,
    config: LayerConfig,
    first_paint: bool,
    force_full: bool,
    /// Where each element was painted last frame, in logical pixels.
    painted: Vec<(ElementId, Rect)>,
}

impl<S: Surface> Layer<S> {
    /// Creates a layer drawing into `surface`.
    ///
    /// `surface` should be [`Viewport::device_size`] pixels large.
    pub fn new(z_level: i32, surface: S, viewport: Viewport, config: LayerConfig) -> Self {
        Self {
            z_level,
            surface,
            back_buffer: None,
            viewport,
            config,
            first_paint: true,
            force_full: false,
            painted: Vec::new(),
        }
    }

    /// Stacking order.
    #[must_use]
    pub fn z_level(&self) -> i32 {
        self.z_level
    }

    /// The backing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the backing surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The logical viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Replaces the settings for the next frame.
    pub fn set_config(&mut self, config: LayerConfig) {
        self.config = config;
    }

    /// Whether no damage has been computed yet.
    #[must_use]
    pub fn is_first_paint(&self) -> bool {
        self.first_paint
    }

    /// Whether the motion-blur back-buffer has been allocated.
    #[must_use]
    pub fn has_back_buffer(&self) -> bool {
        self.back_buffer.is_some()
    }

    /// Makes the next refresh repaint the whole surface.
    pub fn mark_full_repaint(&mut self) {
        self.force_full = true;
    }

    /// Swaps in a surface for a new viewport.
    ///
    /// The back-buffer is dropped and the layer starts over as if it had
    /// never painted.
    pub fn resize(&mut self, surface: S, viewport: Viewport) {
        self.surface = surface;
        self.back_buffer = None;
        self.viewport = viewport;
        self.first_paint = true;
        self.painted.clear();
    }

    /// Works out which device-pixel rects must be repainted.
    ///
    /// See [`compute_damage_traced`](Self::compute_damage_traced).
    pub fn compute_damage(&mut self, elements: &mut [Element]) -> Vec<Rect> {
        self.compute_damage_traced(elements, &mut Tracer::none())
    }

    /// Works out which device-pixel rects must be repainted, emitting a
    /// [`DamageEvent`].
    ///
    /// On first paint every dirty element's paint rect is recorded and no
    /// damage is returned. Afterwards, damage covers where each changed
    /// element was and where it is now, where vanished and removed elements
    /// used to be, and where newly paintable elements appear. The result is
    /// merged to at most [`LayerConfig::max_merged_regions`] rects.
    ///
    /// Every element's previous paint rect is updated to its current one.
    pub fn compute_damage_traced(
        &mut self,
        elements: &mut [Element],
        tracer: &mut Tracer<'_>,
    ) -> Vec<Rect> {
        let viewport = self.viewport.bounds();

        if self.first_paint {
            self.first_paint = false;
            for el in elements.iter_mut().filter(|e| e.is_dirty()) {
                let rect = el.should_paint(&viewport).then(|| el.paint_rect());
                el.set_prev_paint_rect(rect);
            }
            self.record_painted(elements);
            tracer.damage(&DamageEvent {
                z_level: self.z_level,
                candidates: 0,
                regions: 0,
                first_paint: true,
            });
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let mut collect = |rect: Option<Rect>| {
            if let Some(rect) = rect.filter(|r| is_valid(r) && has_area(r)) {
                candidates.push(rect);
            }
        };

        for el in elements.iter_mut() {
            let paintable = el.should_paint(&viewport);
            let dirty = el.is_dirty();
            let prev = el.prev_paint_rect();
            let current = paintable.then(|| el.paint_rect());
            if dirty || !paintable {
                collect(prev);
            }
            if paintable && (dirty || prev.is_none()) {
                collect(current);
            }
            el.set_prev_paint_rect(current);
        }

        let present: BTreeSet<ElementId> = elements.iter().map(Element::id).collect();
        for (id, rect) in &self.painted {
            if !present.contains(id) {
                collect(Some(*rect));
            }
        }
        self.record_painted(elements);

        let dpr = self.viewport.dpr;
        let merged: Vec<Rect> = merge_and_bound(&candidates, self.config.max_merged_regions)
            .into_iter()
            .map(|r| to_device(r, dpr))
            .collect();

        tracer.damage(&DamageEvent {
            z_level: self.z_level,
            candidates: candidates.len(),
            regions: merged.len(),
            first_paint: false,
        });
        #[cfg(feature = "trace-rich")]
        {
            let rects: Vec<_> = merged
                .iter()
                .map(palimpsest_core::trace::DamageRect::from_rect)
                .collect();
            tracer.damage_rects(self.z_level, &rects);
        }
        merged
    }

    fn record_painted(&mut self, elements: &[Element]) {
        self.painted.clear();
        self.painted.extend(
            elements
                .iter()
                .filter_map(|e| e.prev_paint_rect().map(|r| (e.id(), r))),
        );
    }

    /// Clears `rects` (device pixels), or the whole surface for `None`.
    ///
    /// See [`clear_traced`](Self::clear_traced).
    ///
    /// # Errors
    ///
    /// Returns the [`PaintError`] of a background that could not be painted.
    pub fn clear(&mut self, rects: Option<&[Rect]>) -> Result<(), PaintError> {
        self.clear_traced(rects, &mut Tracer::none())
    }

    /// Clears `rects` (device pixels), or the whole surface for `None`,
    /// emitting a [`ClearEvent`].
    ///
    /// Each rect is erased to transparent and then filled with the
    /// background paint, if any; gradients resolve against the whole
    /// surface so partial clears line up. With motion blur on, a partial
    /// clear first snapshots the surface into the back-buffer and then
    /// composites the snapshot back over each rect at the trail opacity.
    ///
    /// # Errors
    ///
    /// Returns the [`PaintError`] of a background that could not be painted.
    /// Affected rects are left transparent and the next refresh repaints
    /// the whole surface.
    pub fn clear_traced(
        &mut self,
        rects: Option<&[Rect]>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PaintError> {
        let Self {
            z_level,
            surface,
            back_buffer,
            config,
            force_full,
            ..
        } = self;

        let bounds = surface.bounds();
        let whole = [bounds];
        let targets = rects.unwrap_or(&whole);
        let trailing = config.motion_blur && rects.is_some();

        let trail = if trailing {
            let back = back_buffer.get_or_insert_with(|| surface.blank_like());
            back.copy_from(surface);
            Some(&*back)
        } else {
            None
        };

        let mut result = Ok(());
        for rect in targets {
            surface.erase_rect(*rect);
            if let Some(paint) = &config.background
                && let Err(error) = surface.fill_rect(*rect, paint, bounds)
            {
                result = result.and(Err(error));
            }
            if let Some(back) = trail {
                surface.composite_from(back, *rect, config.trail_alpha);
            }
        }
        if result.is_err() {
            *force_full = true;
        }

        tracer.clear(&ClearEvent {
            z_level: *z_level,
            rects: targets.len(),
            full: rects.is_none(),
            motion_blur: trailing,
        });
        result
    }
}

impl<S: Surface + DrawingContext> Layer<S> {
    /// Runs one repaint cycle.
    ///
    /// See [`refresh_traced`](Self::refresh_traced).
    pub fn refresh(&mut self, elements: &mut [Element]) -> Refresh {
        self.refresh_traced(elements, &mut Tracer::none())
    }

    /// Runs one repaint cycle: damage, clear, replay.
    ///
    /// The first refresh, and any refresh after a failed background, clears
    /// and redraws everything. Otherwise only the damage rects are cleared
    /// and redrawn, and a frame without damage touches no pixels.
    pub fn refresh_traced(&mut self, elements: &mut [Element], tracer: &mut Tracer<'_>) -> Refresh {
        let full = self.first_paint || self.force_full;
        let damage = self.compute_damage_traced(elements, tracer);
        let compositor = Compositor::new(self.viewport);

        if full {
            self.force_full = false;
            let background = self.clear_traced(None, tracer).err();
            let stats = compositor.replay_traced(&mut self.surface, elements, tracer);
            return Refresh {
                region: DamageRegion::Full,
                stats,
                background,
            };
        }

        if damage.is_empty() {
            for el in elements.iter_mut() {
                el.mark_clean();
            }
            return Refresh {
                region: DamageRegion::None,
                stats: ReplayStats::default(),
                background: None,
            };
        }

        let background = self.clear_traced(Some(&damage), tracer).err();
        let stats = compositor.replay_regions(&mut self.surface, elements, &damage, tracer);
        Refresh {
            region: DamageRegion::Rects(damage),
            stats,
            background,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Affine, Shape};
    use palimpsest_core::record::{Command, CommandRecorder};
    use palimpsest_core::style::{Gradient, Pattern, Rgba, Style};

    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    fn square(id: u64, x: f64, y: f64) -> Element {
        Element::path(ElementId(id), Rect::new(x, y, x + 10.0, y + 10.0).to_path(0.1))
            .with_style(Style::filled(RED))
    }

    fn layer(dpr: f64) -> Layer<CommandRecorder> {
        let viewport = Viewport::new(100.0, 100.0, dpr);
        let (w, h) = viewport.device_size();
        Layer::new(0, CommandRecorder::new(w, h), viewport, LayerConfig::default())
    }

    fn settle(layer: &mut Layer<CommandRecorder>, elements: &mut [Element]) {
        assert!(layer.compute_damage(elements).is_empty());
        for el in elements.iter_mut() {
            el.mark_clean();
        }
    }

    #[test]
    fn first_paint_records_rects_without_damage() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        assert!(layer.is_first_paint());
        assert!(layer.compute_damage(&mut elements).is_empty());
        assert!(!layer.is_first_paint());
        assert_eq!(
            elements[0].prev_paint_rect(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn moved_element_damages_old_and_new_positions() {
        let mut layer = layer(2.0);
        let mut elements = vec![square(1, 0.0, 0.0), square(2, 50.0, 50.0)];
        settle(&mut layer, &mut elements);

        elements[0].set_transform(Some(Affine::translate((10.0, 0.0))));
        let damage = layer.compute_damage(&mut elements);
        // Old and new rects touch, so they merge; scaled by the pixel ratio.
        assert_eq!(damage, vec![Rect::new(0.0, 0.0, 40.0, 20.0)]);
        assert_eq!(
            elements[0].prev_paint_rect(),
            Some(Rect::new(10.0, 0.0, 20.0, 10.0))
        );
    }

    #[test]
    fn clean_frames_have_no_damage() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        settle(&mut layer, &mut elements);
        assert!(layer.compute_damage(&mut elements).is_empty());
    }

    #[test]
    fn hiding_damages_the_old_rect() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0), square(2, 50.0, 50.0)];
        settle(&mut layer, &mut elements);

        elements[1].set_visible(false);
        let damage = layer.compute_damage(&mut elements);
        assert_eq!(damage, vec![Rect::new(50.0, 50.0, 60.0, 60.0)]);
        assert_eq!(elements[1].prev_paint_rect(), None);
    }

    #[test]
    fn removed_elements_damage_where_they_were() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0), square(2, 50.0, 50.0)];
        settle(&mut layer, &mut elements);

        let mut remaining = vec![elements.remove(0)];
        let damage = layer.compute_damage(&mut remaining);
        assert_eq!(damage, vec![Rect::new(50.0, 50.0, 60.0, 60.0)]);
    }

    #[test]
    fn element_added_after_first_paint_damages_its_rect() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        settle(&mut layer, &mut elements);

        elements.push(square(2, 50.0, 0.0));
        assert!(elements[1].is_dirty(), "new elements start dirty");
        let damage = layer.compute_damage(&mut elements);
        assert_eq!(damage, vec![Rect::new(50.0, 0.0, 60.0, 10.0)]);
        assert_eq!(
            elements[1].prev_paint_rect(),
            Some(Rect::new(50.0, 0.0, 60.0, 10.0))
        );
    }

    #[test]
    fn clean_element_never_painted_damages_its_rect() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        settle(&mut layer, &mut elements);

        let mut fresh = square(3, 80.0, 0.0);
        fresh.mark_clean();
        assert_eq!(fresh.prev_paint_rect(), None);
        elements.push(fresh);
        let damage = layer.compute_damage(&mut elements);
        assert_eq!(damage, vec![Rect::new(80.0, 0.0, 90.0, 10.0)]);
        assert_eq!(
            elements[1].prev_paint_rect(),
            Some(Rect::new(80.0, 0.0, 90.0, 10.0))
        );
    }

    #[test]
    fn invalid_paint_rect_is_excluded() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        settle(&mut layer, &mut elements);

        elements.push(square(2, 30.0, 30.0).with_transform(Affine::translate((f64::NAN, 0.0))));
        elements[0].mark_dirty();
        let damage = layer.compute_damage(&mut elements);
        assert_eq!(damage, vec![Rect::new(0.0, 0.0, 10.0, 10.0)]);
    }

    #[test]
    fn damage_is_bounded_by_config() {
        let mut layer = layer(1.0);
        let mut elements: Vec<Element> = (0..8_u32)
            .map(|i| square(u64::from(i), f64::from(i) * 12.0, 0.0))
            .collect();
        settle(&mut layer, &mut elements);

        for el in &mut elements {
            el.mark_dirty();
        }
        layer.set_config(LayerConfig {
            max_merged_regions: 3,
            ..LayerConfig::default()
        });
        assert!(layer.compute_damage(&mut elements).len() <= 3);
    }

    #[test]
    fn full_clear_erases_and_fills_whole_surface() {
        let mut layer = layer(2.0);
        layer.set_config(LayerConfig::default().with_background(Rgba::WHITE));
        layer.clear(None).unwrap();
        assert_eq!(
            layer.surface().commands(),
            &[
                Command::EraseRect(Rect::new(0.0, 0.0, 200.0, 200.0)),
                Command::FillRect(Rect::new(0.0, 0.0, 200.0, 200.0)),
            ]
        );
        assert!(!layer.has_back_buffer());
    }

    #[test]
    fn motion_blur_trails_partial_clears_only() {
        let mut layer = layer(1.0);
        layer.set_config(LayerConfig::trailing(0.5));
        let rects = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 20.0, 30.0, 30.0)];
        layer.clear(Some(&rects)).unwrap();
        assert!(layer.has_back_buffer());
        assert_eq!(
            layer.surface_mut().take_commands(),
            vec![
                Command::EraseRect(rects[0]),
                Command::CompositeFrom(rects[0], 0.5),
                Command::EraseRect(rects[1]),
                Command::CompositeFrom(rects[1], 0.5),
            ]
        );

        layer.clear(None).unwrap();
        assert_eq!(
            layer.surface().count(|c| matches!(c, Command::CompositeFrom(..))),
            0
        );
    }

    #[test]
    fn trail_alpha_is_clamped() {
        assert!((LayerConfig::trailing(3.0).trail_alpha - 1.0).abs() < f32::EPSILON);
        assert!(LayerConfig::trailing(-1.0).trail_alpha.abs() < f32::EPSILON);
    }

    #[test]
    fn unrealizable_background_forces_full_repaint() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        layer.refresh(&mut elements);

        layer.set_config(LayerConfig::default().with_background(Pattern::pending()));
        elements[0].mark_dirty();
        let refresh = layer.refresh(&mut elements);
        assert_eq!(refresh.background, Some(PaintError::PatternNotReady));
        assert!(matches!(refresh.region, DamageRegion::Rects(_)));

        layer.set_config(LayerConfig::default().with_background(
            Gradient::linear((0.0, 0.0), (100.0, 0.0)).with_stop(0.0, RED),
        ));
        let refresh = layer.refresh(&mut elements);
        assert_eq!(refresh.region, DamageRegion::Full);
        assert_eq!(refresh.background, None);
    }

    #[test]
    fn refresh_cycle() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0), square(2, 50.0, 50.0)];

        let first = layer.refresh(&mut elements);
        assert_eq!(first.region, DamageRegion::Full);
        assert_eq!(first.stats.drawn, 2);
        assert!(elements.iter().all(|e| !e.is_dirty()));

        let idle = layer.refresh(&mut elements);
        assert!(idle.region.is_empty());

        layer.surface_mut().take_commands();
        elements[1].set_style(Style::filled(Rgba::BLACK));
        let partial = layer.refresh(&mut elements);
        let expected = Rect::new(50.0, 50.0, 60.0, 60.0);
        assert_eq!(partial.region, DamageRegion::Rects(vec![expected]));
        assert_eq!(partial.stats.drawn, 1);
        assert!(layer.surface().commands().contains(&Command::EraseRect(expected)));
        assert!(layer.surface().commands().contains(&Command::Clip(expected)));
    }

    #[test]
    fn resize_restarts_first_paint() {
        let mut layer = layer(1.0);
        let mut elements = vec![square(1, 0.0, 0.0)];
        layer.refresh(&mut elements);
        assert!(!layer.is_first_paint());
        layer.resize(CommandRecorder::new(50, 50), Viewport::new(50.0, 50.0, 1.0));
        assert!(layer.is_first_paint());
        assert_eq!(layer.refresh(&mut elements).region, DamageRegion::Full);
    }
}
