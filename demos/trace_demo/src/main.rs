// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated scene that exercises damage tracking and the diagnostics sinks.
//!
//! Repaints a small scene for 30 frames on a [`RasterSurface`] layer. One
//! box slides across the viewport, a clipped box blinks, and a pattern-filled
//! box waits on an image that never loads. Events go to both a
//! [`PrettyPrintSink`] on stdout and a [`JsonRecorder`], which is written to
//! `trace.json` at the end.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Affine, Rect, Shape};
use palimpsest_core::element::{Clip, Element, ElementId};
use palimpsest_core::style::{Gradient, Pattern, Rgba, Style};
use palimpsest_core::trace::{
    BatchFlushEvent, ClearEvent, ClipEvent, DamageEvent, DamageRect, PaintUnresolvedEvent,
    ReplaySummary, TraceSink, Tracer,
};
use palimpsest_debug::json::JsonRecorder;
use palimpsest_debug::pretty::PrettyPrintSink;
use palimpsest_raster::RasterSurface;
use palimpsest_render::{DamageRegion, Layer, LayerConfig, Viewport};

const FRAME_COUNT: u32 = 30;
const VIEWPORT: Viewport = Viewport::new(320.0, 120.0, 2.0);

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_damage(&mut self, e: &DamageEvent) {
        self.a.on_damage(e);
        self.b.on_damage(e);
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        self.a.on_clear(e);
        self.b.on_clear(e);
    }

    fn on_clip(&mut self, e: &ClipEvent) {
        self.a.on_clip(e);
        self.b.on_clip(e);
    }

    fn on_batch_flush(&mut self, e: &BatchFlushEvent) {
        self.a.on_batch_flush(e);
        self.b.on_batch_flush(e);
    }

    fn on_paint_unresolved(&mut self, e: &PaintUnresolvedEvent) {
        self.a.on_paint_unresolved(e);
        self.b.on_paint_unresolved(e);
    }

    fn on_replay_summary(&mut self, s: &ReplaySummary) {
        self.a.on_replay_summary(s);
        self.b.on_replay_summary(s);
    }

    fn on_damage_rects(&mut self, z_level: i32, rects: &[DamageRect]) {
        self.a.on_damage_rects(z_level, rects);
        self.b.on_damage_rects(z_level, rects);
    }
}

fn square(id: u64, size: f64) -> Element {
    Element::path(ElementId(id), Rect::new(0.0, 0.0, size, size).to_path(0.1))
}

fn scene() -> Vec<Element> {
    let clip = Clip::rect(Rect::new(200.0, 20.0, 240.0, 60.0)).shared();
    vec![
        square(1, 24.0)
            .with_style(Style::filled(Rgba::rgb(220, 40, 40)))
            .with_transform(Affine::translate((10.0, 10.0))),
        square(2, 24.0)
            .with_style(Style::filled(Rgba::rgb(220, 40, 40)))
            .with_transform(Affine::translate((10.0, 80.0))),
        square(3, 60.0)
            .with_style(Style::stroked(Rgba::rgb(30, 30, 200), 3.0))
            .with_transform(Affine::translate((190.0, 10.0)))
            .with_clip_stack(vec![clip]),
        square(4, 30.0)
            .with_style(Style::filled(Pattern::pending()))
            .with_transform(Affine::translate((270.0, 70.0))),
    ]
}

fn main() {
    let (width, height) = VIEWPORT.device_size();
    let surface = RasterSurface::new(width, height).expect("viewport has a valid size");
    let background = Gradient::linear((0.0, 0.0), (0.0, 1.0))
        .with_stop(0.0, Rgba::WHITE)
        .with_stop(1.0, Rgba::rgb(200, 210, 230));
    let config = LayerConfig::default().with_background(background);
    let mut layer = Layer::new(0, surface, VIEWPORT, config);
    let mut elements = scene();

    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = JsonRecorder::new();

    for frame in 0..FRAME_COUNT {
        let x = 10.0 + f64::from(frame) * 8.0;
        elements[0].set_transform(Some(Affine::translate((x, 10.0))));
        if frame % 10 == 5 {
            let visible = elements[2].is_visible();
            elements[2].set_visible(!visible);
        }

        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        let refresh = layer.refresh_traced(&mut elements, &mut tracer);
        let region = match &refresh.region {
            DamageRegion::Full => "full".to_owned(),
            DamageRegion::Rects(rects) => format!("{} rects", rects.len()),
            DamageRegion::None => "none".to_owned(),
        };
        println!(
            "frame {frame}: repainted {region}, drew {} elements, unresolved {:?}",
            refresh.stats.drawn, refresh.stats.unresolved,
        );
    }

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    recorder
        .write_to(&mut writer)
        .expect("failed to write trace events");

    println!("Wrote {path} ({} events)", recorder.len());
}
