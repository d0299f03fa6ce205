// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A drawing context that records calls instead of rasterizing.
//!
//! [`CommandRecorder`] implements both [`DrawingContext`] and [`Surface`].
//! Every call appends a [`Command`], and the recorder tracks enough state
//! (transform, clip depth, save depth, paints) to check that a pass leaves
//! the context as it found it.

use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Rect, Shape};

use crate::context::{DrawingContext, PaintError, Surface};
use crate::image::ImageData;
use crate::style::{BlendMode, Paint, Shadow, StrokeStyle};

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// [`DrawingContext::save`].
    Save,
    /// [`DrawingContext::restore`].
    Restore,
    /// [`DrawingContext::set_transform`].
    SetTransform(Affine),
    /// [`DrawingContext::clip`], recorded as the device-space bounds of the
    /// clip outline.
    Clip(Rect),
    /// [`DrawingContext::set_opacity`].
    SetOpacity(f32),
    /// [`DrawingContext::set_blend_mode`].
    SetBlendMode(BlendMode),
    /// [`DrawingContext::set_shadow`].
    SetShadow(Option<Shadow>),
    /// A successful [`DrawingContext::set_fill`].
    SetFill(Paint),
    /// A successful [`DrawingContext::set_stroke`].
    SetStroke(Paint),
    /// [`DrawingContext::set_stroke_style`].
    SetStrokeStyle(StrokeStyle),
    /// [`DrawingContext::begin_path`].
    BeginPath,
    /// [`DrawingContext::append_path`], recorded as the path's local bounds.
    AppendPath(Rect),
    /// [`DrawingContext::fill`].
    Fill,
    /// [`DrawingContext::stroke`].
    Stroke,
    /// [`DrawingContext::draw_image`], recorded as the destination rect.
    DrawImage(Rect),
    /// [`Surface::erase_rect`].
    EraseRect(Rect),
    /// A successful [`Surface::fill_rect`].
    FillRect(Rect),
    /// [`Surface::copy_from`].
    CopyFrom,
    /// [`Surface::composite_from`].
    CompositeFrom(Rect, f32),
}

/// Snapshot of the state a [`CommandRecorder`] tracks.
#[derive(Clone, Debug, PartialEq)]
pub struct RecorderState {
    /// Current transform.
    pub transform: Affine,
    /// Number of clips intersected since the outermost save.
    pub clip_depth: usize,
    /// Current opacity.
    pub opacity: f32,
    /// Current blend mode.
    pub blend: BlendMode,
    /// Current shadow.
    pub shadow: Option<Shadow>,
    /// Current fill paint.
    pub fill: Option<Paint>,
    /// Current stroke paint.
    pub stroke: Option<Paint>,
    /// Current stroke parameters.
    pub stroke_style: StrokeStyle,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip_depth: 0,
            opacity: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
            fill: None,
            stroke: None,
            stroke_style: StrokeStyle::default(),
        }
    }
}

/// Records [`DrawingContext`] and [`Surface`] calls.
#[derive(Clone, Debug)]
pub struct CommandRecorder {
    size: (u32, u32),
    commands: Vec<Command>,
    state: RecorderState,
    stack: Vec<RecorderState>,
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl CommandRecorder {
    /// Creates a recorder posing as a surface of `width × height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            commands: Vec::new(),
            state: RecorderState::default(),
            stack: Vec::new(),
        }
    }

    /// All commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Removes and returns the recorded commands, keeping the state.
    pub fn take_commands(&mut self) -> Vec<Command> {
        core::mem::take(&mut self.commands)
    }

    /// Number of recorded commands matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// The current tracked state.
    #[must_use]
    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    /// Number of outstanding saves.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

impl DrawingContext for CommandRecorder {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.push(Command::Save);
    }

    fn restore(&mut self) {
        assert!(
            !self.stack.is_empty(),
            "restore() without a matching save()"
        );
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
        self.push(Command::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
        self.push(Command::SetTransform(transform));
    }

    fn clip(&mut self, path: &BezPath) {
        self.state.clip_depth += 1;
        let bounds = self.state.transform.transform_rect_bbox(path.bounding_box());
        self.push(Command::Clip(bounds));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity;
        self.push(Command::SetOpacity(opacity));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
        self.push(Command::SetBlendMode(mode));
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.state.shadow = shadow.copied();
        self.push(Command::SetShadow(shadow.copied()));
    }

    fn set_fill(&mut self, paint: &Paint, _bounds: Rect) -> Result<(), PaintError> {
        paint.ensure_ready()?;
        self.state.fill = Some(paint.clone());
        self.push(Command::SetFill(paint.clone()));
        Ok(())
    }

    fn set_stroke(&mut self, paint: &Paint, _bounds: Rect) -> Result<(), PaintError> {
        paint.ensure_ready()?;
        self.state.stroke = Some(paint.clone());
        self.push(Command::SetStroke(paint.clone()));
        Ok(())
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.state.stroke_style = style.clone();
        self.push(Command::SetStrokeStyle(style.clone()));
    }

    fn begin_path(&mut self) {
        self.push(Command::BeginPath);
    }

    fn append_path(&mut self, path: &BezPath) {
        self.push(Command::AppendPath(path.bounding_box()));
    }

    fn fill(&mut self) {
        self.push(Command::Fill);
    }

    fn stroke(&mut self) {
        self.push(Command::Stroke);
    }

    fn draw_image(&mut self, _image: &ImageData, dest: Rect) {
        self.push(Command::DrawImage(dest));
    }
}

impl Surface for CommandRecorder {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn erase_rect(&mut self, rect: Rect) {
        self.push(Command::EraseRect(rect));
    }

    fn fill_rect(
        &mut self,
        rect: Rect,
        paint: &Paint,
        _paint_bounds: Rect,
    ) -> Result<(), PaintError> {
        paint.ensure_ready()?;
        self.push(Command::FillRect(rect));
        Ok(())
    }

    fn blank_like(&self) -> Self {
        Self::new(self.size.0, self.size.1)
    }

    fn copy_from(&mut self, _source: &Self) {
        self.push(Command::CopyFrom);
    }

    fn composite_from(&mut self, _source: &Self, rect: Rect, alpha: f32) {
        self.push(Command::CompositeFrom(rect, alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Pattern, Rgba};

    #[test]
    fn restore_returns_to_saved_state() {
        let mut rec = CommandRecorder::new(10, 10);
        let before = rec.state().clone();
        rec.save();
        rec.set_transform(Affine::scale(2.0));
        rec.clip(&Rect::new(0.0, 0.0, 5.0, 5.0).to_path(0.1));
        assert_eq!(rec.state().clip_depth, 1);
        rec.restore();
        assert_eq!(rec.state(), &before);
        assert_eq!(rec.save_depth(), 0);
    }

    #[test]
    fn clip_is_recorded_in_device_space() {
        let mut rec = CommandRecorder::new(10, 10);
        rec.set_transform(Affine::scale(2.0));
        rec.clip(&Rect::new(1.0, 1.0, 3.0, 3.0).to_path(0.1));
        assert_eq!(
            rec.commands().last(),
            Some(&Command::Clip(Rect::new(2.0, 2.0, 6.0, 6.0)))
        );
    }

    #[test]
    fn failed_fill_changes_nothing() {
        let mut rec = CommandRecorder::new(10, 10);
        rec.set_fill(&Rgba::BLACK.into(), Rect::ZERO).unwrap();
        let before = rec.state().clone();
        let len = rec.commands().len();

        let err = rec.set_fill(&Pattern::pending().into(), Rect::ZERO);
        assert_eq!(err, Err(PaintError::PatternNotReady));
        assert_eq!(rec.state(), &before);
        assert_eq!(rec.commands().len(), len);
    }

    #[test]
    #[should_panic(expected = "without a matching save")]
    fn unbalanced_restore_panics() {
        CommandRecorder::new(1, 1).restore();
    }
}
