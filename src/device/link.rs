use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::{Busylight, DeviceActor, DeviceConfig, DeviceError, DeviceRequest};
use crate::Transport;

/// Number of requests that can be queued for one device
pub const REQUEST_QUEUE_SIZE: usize = 4;

/// Type alias for the device request channel
pub type RequestChannel = Channel<CriticalSectionRawMutex, DeviceRequest, REQUEST_QUEUE_SIZE>;

/// State shared between a device actor and its handles
///
/// A link serves one opened device at a time. It is usually placed in a
/// `static`:
///
/// ```ignore
/// static LINK: DeviceLink = DeviceLink::new();
///
/// let (light, actor) = LINK.open(transport, DeviceConfig::new(Family::Omega))?;
/// spawner.spawn(busylight_task(actor));
/// light.set_color(Rgb::new(255, 0, 0)).await?;
/// ```
pub struct DeviceLink {
    pub(super) requests: RequestChannel,
    closed: AtomicBool,
}

impl Default for DeviceLink {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLink {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            closed: AtomicBool::new(true),
        }
    }

    /// Attach a freshly opened transport to this link
    ///
    /// Returns the handle used to control the light and the actor owning the
    /// transport. The actor does nothing until [`DeviceActor::run`] is polled.
    /// Requests left over from a previous session are discarded.
    ///
    /// A link serves a single device: while a previous session has not
    /// released its transport yet, the new transport is dropped and
    /// [`DeviceError::Busy`] is returned.
    pub fn open<T: Transport>(
        &self,
        transport: T,
        config: DeviceConfig,
    ) -> Result<(Busylight<'_>, DeviceActor<'_, T>), DeviceError> {
        self.closed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DeviceError::Busy)?;
        self.requests.clear();

        Ok((
            Busylight::new(self, config.family),
            DeviceActor::new(self, transport, config),
        ))
    }

    /// Check if no device is attached to the link
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(super) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
