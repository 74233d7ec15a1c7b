#![no_std]

pub mod animation;
pub mod color;
pub mod device;
pub mod model;
pub mod protocol;
pub mod sound;

pub use animation::{Animation, AnimationError, Frame, FrameId, MAX_FRAMES};
pub use device::{
    Busylight, DeviceActor, DeviceConfig, DeviceError, DeviceLink, DeviceRequest, KeepaliveMode,
};
pub use model::{DeviceModel, SUPPORTED_MODELS, find_models};
pub use protocol::{Command, Family};
pub use sound::Sound;

pub use color::Rgb;
pub use embassy_time::Duration;

/// Abstract device transport
///
/// Implement this trait on top of the HID handle of an opened busylight.
/// The device actor is generic over this trait and is its only user.
pub trait Transport {
    /// Error reported by a failed write
    type Error: core::fmt::Debug;

    /// Write a command to the device
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Release the device
    ///
    /// Must be safe to call more than once.
    fn close(&mut self);
}
