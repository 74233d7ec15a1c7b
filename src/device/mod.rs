//! Per-device worker
//!
//! Every opened device is driven by a single [`DeviceActor`] which owns the
//! transport. Callers talk to it through a [`Busylight`] handle, requests are
//! queued in the shared [`DeviceLink`] and applied in order. While idle, the
//! actor refreshes the device periodically because the hardware switches
//! itself off when it receives no traffic.

mod actor;
mod handle;
mod link;
mod session;

use core::fmt;

use embassy_time::Duration;

pub use actor::DeviceActor;
pub use handle::Busylight;
pub use link::{DeviceLink, REQUEST_QUEUE_SIZE, RequestChannel};

use crate::animation::Animation;
use crate::color::Rgb;
use crate::model::DeviceModel;
use crate::protocol::{Command, Family};

/// Errors reported to the callers of a [`Busylight`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The operation is not supported by this device family
    Unsupported,
    /// The device has been closed
    Closed,
    /// The request queue is full, or the link still serves another device
    Busy,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("operation not supported by the device"),
            Self::Closed => f.write_str("device is closed"),
            Self::Busy => f.write_str("device is busy"),
        }
    }
}

impl core::error::Error for DeviceError {}

/// Requests processed by the device actor
#[derive(Debug, Clone)]
pub enum DeviceRequest {
    /// Show a solid color
    SetColor(Rgb),
    /// Play an animation
    SetAnimation(Animation),
    /// Switch the light off, the device stays open
    TurnOff,
    /// Switch the light off and release the device
    Close,
}

/// What the actor sends when the keepalive timer fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeepaliveMode {
    /// Resend the current state
    #[default]
    Refresh,
    /// Send the family's keepalive command, falling back to [`Self::Refresh`]
    /// for families without one
    Ping,
}

/// Configuration of an opened device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub family: Family,
    /// Keepalive interval, has to stay well below the ~30s hardware timeout
    pub keepalive: Duration,
    pub keepalive_mode: KeepaliveMode,
}

impl DeviceConfig {
    /// Default configuration of a family
    pub const fn new(family: Family) -> Self {
        Self {
            family,
            keepalive: family.keepalive_period(),
            keepalive_mode: KeepaliveMode::Refresh,
        }
    }

    #[must_use]
    pub const fn with_keepalive_mode(mut self, keepalive_mode: KeepaliveMode) -> Self {
        self.keepalive_mode = keepalive_mode;
        self
    }

    /// Command sent when the keepalive timer fires
    fn keepalive_command(&self, current: &Animation) -> Command {
        match self.keepalive_mode {
            KeepaliveMode::Ping => self
                .family
                .keepalive_command()
                .unwrap_or_else(|| self.family.encode(current)),
            KeepaliveMode::Refresh => self.family.encode(current),
        }
    }
}

impl From<&DeviceModel> for DeviceConfig {
    fn from(model: &DeviceModel) -> Self {
        Self::new(model.family)
    }
}
