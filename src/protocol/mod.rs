//! Busylight wire protocol
//!
//! Frame-chain devices receive a fixed 65 byte command:
//!
//! | Offset | Length | Content                                   |
//! |--------|--------|-------------------------------------------|
//! | 0      | 1      | marker, always `0x00`                     |
//! | 1      | 56     | up to 7 steps of 8 bytes, zero padded     |
//! | 57     | 6      | footer `06 04 55 FF FF FF`                |
//! | 63     | 2      | big-endian sum of bytes `0..63`           |
//!
//! Older single-color devices take a 9 byte command carrying only the color.
//!
//! All encoding functions are pure, transport errors are reported by whoever
//! writes the buffer.

mod family;
mod step;

pub use family::{Family, StepLayout};
pub use step::Step;

use crate::animation::Animation;
use crate::color::Rgb;

/// Length of a frame-chain command
pub const COMMAND_LEN: usize = 65;
/// Length of a single-color command
pub const SOLID_COMMAND_LEN: usize = 9;

/// Length of one serialized step
pub const STEP_LEN: usize = 8;
/// Number of steps a command can carry
pub const MAX_STEPS: usize = 7;
/// Length of the step region
pub const STEPS_LEN: usize = STEP_LEN * MAX_STEPS;

/// Flag set on every next-step byte
pub const NEXT_STEP_FLAG: u8 = 0x10;
/// Sound byte of a step without sound
pub const SOUND_BASE: u8 = 0x80;
/// Footer shared by the frame-chain devices
pub const FOOTER: [u8; FOOTER_LEN] = [0x06, 0x04, 0x55, 0xFF, 0xFF, 0xFF];
/// Step sent instead of a chain to keep a device awake without changing it
pub const KEEPALIVE_STEP: [u8; STEP_LEN] = [0x8F, 0, 0, 0, 0, 0, 0, 0];

const MARKER: u8 = 0x00;
const FOOTER_LEN: usize = 6;

const STEPS_OFFSET: usize = 1;
const FOOTER_OFFSET: usize = STEPS_OFFSET + STEPS_LEN;
const CHECKSUM_OFFSET: usize = FOOTER_OFFSET + FOOTER_LEN;

const SOLID_COLOR_OFFSET: usize = 3;

/// Encoded command ready to be written to a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Frame-chain command
    Steps([u8; COMMAND_LEN]),
    /// Single-color command
    Solid([u8; SOLID_COMMAND_LEN]),
}

impl Command {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Steps(buffer) => buffer,
            Self::Solid(buffer) => buffer,
        }
    }
}

/// 16-bit wrapping sum of all bytes
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(u16::from(byte)))
}

/// Encode an animation into a frame-chain command
///
/// `None` produces a keepalive command which has no visible effect. Only the
/// first [`MAX_STEPS`] frames of the chain are encoded, and the traversal ends
/// early when the chain jumps back to an earlier frame.
pub fn encode_steps(layout: &StepLayout, animation: Option<&Animation>) -> [u8; COMMAND_LEN] {
    let mut buffer = [0u8; COMMAND_LEN];
    buffer[0] = MARKER;

    let steps = &mut buffer[STEPS_OFFSET..FOOTER_OFFSET];
    match animation {
        Some(animation) => {
            for (chunk, frame) in steps.chunks_exact_mut(STEP_LEN).zip(animation.frames()) {
                let step = Step::from_frame(animation, frame, layout);
                chunk.copy_from_slice(&step.to_bytes());
            }
        }
        None => steps[..STEP_LEN].copy_from_slice(&KEEPALIVE_STEP),
    }

    buffer[FOOTER_OFFSET..CHECKSUM_OFFSET].copy_from_slice(&layout.footer);
    let checksum = checksum(&buffer[..CHECKSUM_OFFSET]);
    buffer[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_be_bytes());

    buffer
}

/// Encode a color into a single-color command
pub fn encode_solid(color: Rgb) -> [u8; SOLID_COMMAND_LEN] {
    let mut buffer = [0u8; SOLID_COMMAND_LEN];
    buffer[SOLID_COLOR_OFFSET..SOLID_COLOR_OFFSET + 3].copy_from_slice(&[color.r, color.g, color.b]);
    buffer
}

/// Iterate over the steps of a frame-chain command
///
/// Stops at the first all-zero step, which marks the start of the padding.
pub fn decode_steps(buffer: &[u8; COMMAND_LEN]) -> impl Iterator<Item = Step> + '_ {
    buffer[STEPS_OFFSET..FOOTER_OFFSET]
        .chunks_exact(STEP_LEN)
        .take_while(|chunk| chunk.iter().any(|&byte| byte != 0))
        .filter_map(|chunk| <[u8; STEP_LEN]>::try_from(chunk).ok())
        .map(Step::from_bytes)
}

/// Checksum stored at the end of a frame-chain command
pub const fn stored_checksum(buffer: &[u8; COMMAND_LEN]) -> u16 {
    u16::from_be_bytes([buffer[CHECKSUM_OFFSET], buffer[CHECKSUM_OFFSET + 1]])
}
