//! Animation programs
//!
//! An animation is a chain of frames, each of them describing one step the
//! device firmware plays: a color, its on/off timings, how often the step is
//! repeated and an optional sound.
//!
//! Frames live in a fixed-size arena owned by the [`Animation`] and are
//! addressed by [`FrameId`]. Links are only created by [`Animation::extend`],
//! which always appends a fresh frame, and by [`Animation::loop_to`], which may
//! only jump back to an earlier frame of the same chain. A chain reachable from
//! the head is therefore always a run of sequential positions, optionally
//! ending with a jump back.

use core::fmt;

use heapless::Vec;

use crate::color::{BLACK, Rgb};
use crate::sound::Sound;

/// Maximum number of frames an animation can hold
///
/// Devices only play the first [`MAX_STEPS`](crate::protocol::MAX_STEPS)
/// frames of a chain, the rest is dropped by the encoder.
pub const MAX_FRAMES: usize = 16;

/// Errors returned when building an animation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    /// No free frame slots are left
    CapacityExceeded,
    /// The frame id does not belong to this animation
    UnknownFrame,
    /// A loop may only jump back to an earlier frame of the same chain
    NotAncestor,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => f.write_str("animation frame capacity exceeded"),
            Self::UnknownFrame => f.write_str("frame does not belong to this animation"),
            Self::NotAncestor => f.write_str("loop target is not an earlier frame of the chain"),
        }
    }
}

impl core::error::Error for AnimationError {}

/// Handle of a frame inside an [`Animation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u8);

impl FrameId {
    const HEAD: Self = Self(0);

    fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// One step of an animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    color: Rgb,
    on_timing: u8,
    off_timing: u8,
    repeat_interval: u8,
    sound: Option<Sound>,
    /// Sequential index in the chain, fixed when the frame is created
    position: u8,
    prev: Option<FrameId>,
    next: Option<FrameId>,
}

impl Frame {
    const HEAD: Self = Self {
        color: BLACK,
        on_timing: 0,
        off_timing: 0,
        repeat_interval: 0,
        sound: None,
        position: 0,
        prev: None,
        next: None,
    };

    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub const fn on_timing(&self) -> u8 {
        self.on_timing
    }

    pub const fn off_timing(&self) -> u8 {
        self.off_timing
    }

    pub const fn repeat_interval(&self) -> u8 {
        self.repeat_interval
    }

    pub const fn sound(&self) -> Option<Sound> {
        self.sound
    }

    /// Position of the frame in its chain, `0` for the head
    pub const fn position(&self) -> u8 {
        self.position
    }

    pub const fn prev(&self) -> Option<FrameId> {
        self.prev
    }

    pub const fn next(&self) -> Option<FrameId> {
        self.next
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Set the "on" and "off" timings of the step
    ///
    /// Values are not validated, the firmware interprets them.
    pub fn set_timing(&mut self, on_timing: u8, off_timing: u8) {
        self.on_timing = on_timing;
        self.off_timing = off_timing;
    }

    pub fn set_repeat_interval(&mut self, repeat_interval: u8) {
        self.repeat_interval = repeat_interval;
    }

    pub fn set_sound(&mut self, sound: Option<Sound>) {
        self.sound = sound;
    }
}

/// Chain of animation frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Frame, MAX_FRAMES>,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    /// Create an animation with a single unlinked head frame
    ///
    /// The head is black, has zero timings and no sound.
    pub fn new() -> Self {
        let mut frames = Vec::new();
        // The arena is never empty, so the head always fits.
        let _ = frames.push(Frame::HEAD);
        Self { frames }
    }

    /// Create a one-frame animation showing a solid color
    pub fn solid(color: Rgb) -> Self {
        let mut animation = Self::new();
        animation.head_frame_mut().set_color(color);
        animation
    }

    /// The canonical "off" state: black, no sound, zero timings
    pub fn off() -> Self {
        Self::new()
    }

    /// Id of the first frame of the chain
    pub const fn head_id(&self) -> FrameId {
        FrameId::HEAD
    }

    pub fn head_frame(&self) -> &Frame {
        &self.frames[FrameId::HEAD.index()]
    }

    pub fn head_frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[FrameId::HEAD.index()]
    }

    /// Number of frames stored, including frames no longer reachable from the head
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, id: FrameId) -> Result<&Frame, AnimationError> {
        self.frames.get(id.index()).ok_or(AnimationError::UnknownFrame)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, AnimationError> {
        self.frames
            .get_mut(id.index())
            .ok_or(AnimationError::UnknownFrame)
    }

    /// Find the first frame of the chain by walking the back links
    pub fn head(&self, id: FrameId) -> Result<FrameId, AnimationError> {
        let mut current = id;
        while let Some(prev) = self.frame(current)?.prev {
            current = prev;
        }
        Ok(current)
    }

    /// Position of the frame in the chain, `0` for the head
    pub fn position(&self, id: FrameId) -> Result<u8, AnimationError> {
        self.frame(id).map(Frame::position)
    }

    pub fn next(&self, id: FrameId) -> Result<Option<FrameId>, AnimationError> {
        self.frame(id).map(Frame::next)
    }

    pub fn prev(&self, id: FrameId) -> Result<Option<FrameId>, AnimationError> {
        self.frame(id).map(Frame::prev)
    }

    /// Append a fresh frame after `id` and return its id
    ///
    /// An existing successor of `id` is unlinked and stays unreachable from the
    /// head.
    pub fn extend(&mut self, id: FrameId) -> Result<FrameId, AnimationError> {
        let position = self.frame(id)?.position.wrapping_add(1);
        let new_id = u8::try_from(self.frames.len())
            .map(FrameId)
            .map_err(|_| AnimationError::CapacityExceeded)?;

        self.frames
            .push(Frame {
                position,
                prev: Some(id),
                ..Frame::HEAD
            })
            .map_err(|_| AnimationError::CapacityExceeded)?;
        self.frame_mut(id)?.next = Some(new_id);

        Ok(new_id)
    }

    /// Make `from` jump back to `to` after it has been played
    ///
    /// `to` must be `from` itself or one of the frames preceding it in the
    /// chain, which turns the tail of the chain into a repeating program.
    pub fn loop_to(&mut self, from: FrameId, to: FrameId) -> Result<(), AnimationError> {
        self.frame(to)?;

        let mut current = Some(from);
        while let Some(id) = current {
            if id == to {
                self.frame_mut(from)?.next = Some(to);
                return Ok(());
            }
            current = self.frame(id)?.prev;
        }

        Err(AnimationError::NotAncestor)
    }

    /// Position of the frame `frame` continues with
    ///
    /// A frame without successor points at itself.
    pub fn next_position(&self, frame: &Frame) -> u8 {
        frame
            .next
            .and_then(|next| self.frames.get(next.index()))
            .map_or(frame.position, Frame::position)
    }

    /// Iterate over the chain starting at the head
    ///
    /// Iteration stops at the end of the chain or when a link jumps back to a
    /// frame that has already been visited.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            animation: self,
            cursor: Some(FrameId::HEAD),
            expected: 0,
        }
    }
}

/// Iterator over the frames of an [`Animation`], see [`Animation::frames`]
pub struct Frames<'a> {
    animation: &'a Animation,
    cursor: Option<FrameId>,
    expected: u8,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.animation.frames.get(self.cursor?.index())?;
        if frame.position != self.expected {
            // The chain loops back on itself
            self.cursor = None;
            return None;
        }

        self.expected = self.expected.wrapping_add(1);
        self.cursor = frame.next;
        Some(frame)
    }
}
