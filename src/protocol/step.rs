use super::{NEXT_STEP_FLAG, STEP_LEN, StepLayout};
use crate::animation::{Animation, Frame};
use crate::color::Rgb;

/// One serialized animation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Position of the step the firmware continues with
    pub next_step: u8,
    pub repeat_interval: u8,
    pub color: Rgb,
    pub on_timing: u8,
    pub off_timing: u8,
    /// Raw sound/volume byte
    pub sound: u8,
}

impl Step {
    /// Build the step for a frame of `animation`
    pub fn from_frame(animation: &Animation, frame: &Frame, layout: &StepLayout) -> Self {
        Self {
            next_step: animation.next_position(frame),
            repeat_interval: frame.repeat_interval(),
            color: frame.color(),
            on_timing: frame.on_timing(),
            off_timing: frame.off_timing(),
            sound: layout.sound_byte(frame.sound()),
        }
    }

    pub const fn to_bytes(&self) -> [u8; STEP_LEN] {
        [
            self.next_step | NEXT_STEP_FLAG,
            self.repeat_interval,
            self.color.r,
            self.color.g,
            self.color.b,
            self.on_timing,
            self.off_timing,
            self.sound,
        ]
    }

    pub const fn from_bytes(bytes: [u8; STEP_LEN]) -> Self {
        Self {
            next_step: bytes[0] & !NEXT_STEP_FLAG,
            repeat_interval: bytes[1],
            color: Rgb {
                r: bytes[2],
                g: bytes[3],
                b: bytes[4],
            },
            on_timing: bytes[5],
            off_timing: bytes[6],
            sound: bytes[7],
        }
    }
}
