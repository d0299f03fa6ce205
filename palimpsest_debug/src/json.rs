// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON event recording.
//!
//! [`JsonRecorder`] implements [`TraceSink`] by turning every event into a
//! JSON object of the form `{"event": <name>, ...fields}`. The collected
//! events can be inspected in place or written out as one JSON array with
//! [`JsonRecorder::write_to`].

use std::io::{self, Write};

use serde_json::{Value, json};

use palimpsest_core::trace::{
    BatchFlushEvent, BatchKind, ClearEvent, ClipAction, ClipEvent, DamageEvent, DamageRect,
    PaintUnresolvedEvent, ReplaySummary, TraceSink,
};

/// Collects trace events as JSON values.
#[derive(Clone, Debug, Default)]
pub struct JsonRecorder {
    events: Vec<Value>,
}

impl JsonRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Consumes the recorder and returns the events as a JSON array.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Array(self.events)
    }

    /// Writes the recorded events as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &self.events)?;
        Ok(())
    }
}

impl TraceSink for JsonRecorder {
    fn on_damage(&mut self, e: &DamageEvent) {
        self.events.push(json!({
            "event": "damage",
            "z_level": e.z_level,
            "candidates": e.candidates,
            "regions": e.regions,
            "first_paint": e.first_paint,
        }));
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        self.events.push(json!({
            "event": "clear",
            "z_level": e.z_level,
            "rects": e.rects,
            "full": e.full,
            "motion_blur": e.motion_blur,
        }));
    }

    fn on_clip(&mut self, e: &ClipEvent) {
        let action = match e.action {
            ClipAction::Push => "push",
            ClipAction::Pop => "pop",
        };
        self.events.push(json!({
            "event": "clip",
            "action": action,
            "depth": e.depth,
            "degenerate": e.degenerate,
        }));
    }

    fn on_batch_flush(&mut self, e: &BatchFlushEvent) {
        let kind = match e.kind {
            BatchKind::Fill => "fill",
            BatchKind::Stroke => "stroke",
        };
        self.events.push(json!({
            "event": "batch_flush",
            "kind": kind,
            "elements": e.elements,
        }));
    }

    fn on_paint_unresolved(&mut self, e: &PaintUnresolvedEvent) {
        self.events.push(json!({
            "event": "paint_unresolved",
            "element": e.element.0,
            "error": format!("{:?}", e.error),
        }));
    }

    fn on_replay_summary(&mut self, s: &ReplaySummary) {
        self.events.push(json!({
            "event": "replay_summary",
            "elements": s.elements,
            "drawn": s.drawn,
            "culled": s.culled,
            "suppressed": s.suppressed,
            "batches": s.batches,
            "transform_changes": s.transform_changes,
            "style_changes": s.style_changes,
            "clip_pushes": s.clip_pushes,
        }));
    }

    fn on_damage_rects(&mut self, z_level: i32, rects: &[DamageRect]) {
        let rects: Vec<Value> = rects
            .iter()
            .map(|r| json!([r.x, r.y, r.width, r.height]))
            .collect();
        self.events.push(json!({
            "event": "damage_rects",
            "z_level": z_level,
            "rects": rects,
        }));
    }
}

#[cfg(test)]
mod tests {
    use palimpsest_core::trace::Tracer;

    use super::*;

    #[test]
    fn records_through_a_tracer() {
        let mut rec = JsonRecorder::new();
        {
            let mut tracer = Tracer::new(&mut rec);
            tracer.clip(&ClipEvent {
                action: ClipAction::Push,
                depth: 2,
                degenerate: false,
            });
            tracer.batch_flush(&BatchFlushEvent {
                kind: BatchKind::Fill,
                elements: 3,
            });
        }
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.events()[0]["event"], "clip");
        assert_eq!(rec.events()[0]["action"], "push");
        assert_eq!(rec.events()[1]["kind"], "fill");
        assert_eq!(rec.events()[1]["elements"], 3);
    }

    #[test]
    fn write_to_produces_a_json_array() {
        let mut rec = JsonRecorder::new();
        rec.on_replay_summary(&ReplaySummary {
            elements: 4,
            drawn: 3,
            culled: 1,
            ..ReplaySummary::default()
        });
        rec.on_damage_rects(
            1,
            &[DamageRect {
                x: 0,
                y: 0,
                width: 8,
                height: 8,
            }],
        );

        let mut out = Vec::new();
        rec.write_to(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["event"], "replay_summary");
        assert_eq!(parsed[0]["culled"], 1);
        assert_eq!(parsed[1]["rects"][0], json!([0, 0, 8, 8]));
    }

    #[test]
    fn empty_recording_is_an_empty_array() {
        let rec = JsonRecorder::new();
        assert!(rec.is_empty());
        let mut out = Vec::new();
        rec.write_to(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(rec.into_value(), json!([]));
    }
}
