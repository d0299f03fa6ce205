// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use palimpsest_core::trace::{
    BatchFlushEvent, BatchKind, ClearEvent, ClipAction, ClipEvent, DamageEvent, DamageRect,
    PaintUnresolvedEvent, ReplaySummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_damage(&mut self, e: &DamageEvent) {
        if e.first_paint {
            let _ = writeln!(self.writer, "[damage] z={} first paint", e.z_level);
            return;
        }
        let _ = writeln!(
            self.writer,
            "[damage] z={} candidates={} regions={}",
            e.z_level, e.candidates, e.regions,
        );
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        let scope = if e.full { "full" } else { "partial" };
        let _ = writeln!(
            self.writer,
            "[clear] z={} {scope} rects={} trail={}",
            e.z_level, e.rects, e.motion_blur,
        );
    }

    fn on_clip(&mut self, e: &ClipEvent) {
        let action = match e.action {
            ClipAction::Push => "push",
            ClipAction::Pop => "pop",
        };
        let degenerate = if e.degenerate { " DEGENERATE" } else { "" };
        let _ = writeln!(
            self.writer,
            "[clip:{action}] depth={}{degenerate}",
            e.depth,
        );
    }

    fn on_batch_flush(&mut self, e: &BatchFlushEvent) {
        let kind = match e.kind {
            BatchKind::Fill => "fill",
            BatchKind::Stroke => "stroke",
        };
        let _ = writeln!(self.writer, "[batch] {kind} elements={}", e.elements);
    }

    fn on_paint_unresolved(&mut self, e: &PaintUnresolvedEvent) {
        let _ = writeln!(
            self.writer,
            "[unresolved] element={} {}",
            e.element.0, e.error,
        );
    }

    fn on_replay_summary(&mut self, s: &ReplaySummary) {
        let _ = writeln!(
            self.writer,
            "[summary] elements={} drawn={} culled={} suppressed={} batches={} \
             transforms={} styles={} clips={}",
            s.elements,
            s.drawn,
            s.culled,
            s.suppressed,
            s.batches,
            s.transform_changes,
            s.style_changes,
            s.clip_pushes,
        );
    }

    fn on_damage_rects(&mut self, z_level: i32, rects: &[DamageRect]) {
        let _ = write!(self.writer, "[damage:rects] z={z_level}");
        for r in rects {
            let _ = write!(self.writer, " {}x{}@{},{}", r.width, r.height, r.x, r.y);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use palimpsest_core::context::PaintError;
    use palimpsest_core::element::ElementId;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_damage() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_damage(&DamageEvent {
            z_level: 2,
            candidates: 7,
            regions: 3,
            first_paint: false,
        });
        sink.on_damage(&DamageEvent {
            z_level: 2,
            candidates: 0,
            regions: 0,
            first_paint: true,
        });
        let out = output(sink);
        assert!(out.contains("[damage] z=2 candidates=7 regions=3"), "got: {out}");
        assert!(out.contains("first paint"), "got: {out}");
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn pretty_print_unresolved_and_rects() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_paint_unresolved(&PaintUnresolvedEvent {
            element: ElementId(42),
            error: PaintError::PatternNotReady,
        });
        sink.on_damage_rects(
            0,
            &[DamageRect {
                x: 4,
                y: 8,
                width: 16,
                height: 2,
            }],
        );
        let out = output(sink);
        assert!(out.contains("element=42 pattern image is not loaded yet"), "got: {out}");
        assert!(out.contains("16x2@4,8"), "got: {out}");
    }
}
