use super::{DeviceError, DeviceLink, DeviceRequest};
use crate::animation::Animation;
use crate::color::Rgb;
use crate::protocol::Family;

/// Handle controlling an opened busylight
///
/// Handles are cheap to copy, every copy feeds the same request queue.
#[derive(Clone, Copy)]
pub struct Busylight<'a> {
    link: &'a DeviceLink,
    family: Family,
}

impl<'a> Busylight<'a> {
    pub(super) const fn new(link: &'a DeviceLink, family: Family) -> Self {
        Self { link, family }
    }

    pub const fn family(&self) -> Family {
        self.family
    }

    /// Check if the device has been closed, either on request or after a
    /// transport failure
    pub fn is_closed(&self) -> bool {
        self.link.is_closed()
    }

    /// Keep the device active without showing anything
    ///
    /// None of the supported families can do this.
    pub fn set_keep_active(&self, _keep_active: bool) -> Result<(), DeviceError> {
        Err(DeviceError::Unsupported)
    }

    /// Show a solid color
    pub async fn set_color(&self, color: Rgb) -> Result<(), DeviceError> {
        self.send(DeviceRequest::SetColor(color)).await
    }

    /// Play an animation
    ///
    /// Single-color devices show the color of the first frame.
    pub async fn set_animation(&self, animation: Animation) -> Result<(), DeviceError> {
        self.send(DeviceRequest::SetAnimation(animation)).await
    }

    /// Switch the light off, keeping the device open
    pub async fn turn_off(&self) -> Result<(), DeviceError> {
        self.send(DeviceRequest::TurnOff).await
    }

    /// Switch the light off and release the device
    ///
    /// Closing an already closed device does nothing.
    pub async fn close(&self) {
        let _ = self.send(DeviceRequest::Close).await;
    }

    /// Non-blocking version of [`Self::set_color`]
    pub fn try_set_color(&self, color: Rgb) -> Result<(), DeviceError> {
        self.try_send(DeviceRequest::SetColor(color))
    }

    /// Non-blocking version of [`Self::set_animation`]
    pub fn try_set_animation(&self, animation: Animation) -> Result<(), DeviceError> {
        self.try_send(DeviceRequest::SetAnimation(animation))
    }

    /// Non-blocking version of [`Self::turn_off`]
    pub fn try_turn_off(&self) -> Result<(), DeviceError> {
        self.try_send(DeviceRequest::TurnOff)
    }

    async fn send(&self, request: DeviceRequest) -> Result<(), DeviceError> {
        if self.is_closed() {
            return Err(DeviceError::Closed);
        }
        self.link.requests.send(request).await;
        Ok(())
    }

    fn try_send(&self, request: DeviceRequest) -> Result<(), DeviceError> {
        if self.is_closed() {
            return Err(DeviceError::Closed);
        }
        self.link
            .requests
            .try_send(request)
            .map_err(|_| DeviceError::Busy)
    }
}
