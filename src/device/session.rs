use super::DeviceLink;
use crate::Transport;
use crate::animation::Animation;
use crate::protocol::{Command, Family};

/// Exclusive owner of an opened transport
///
/// However the session ends, the transport is closed exactly once and only
/// then the link is marked closed, so the link cannot be reopened while the
/// transport is still held. Unless the session is aborted after a transport failure,
/// the device is switched off first, which also happens when the session is
/// simply dropped.
pub(super) struct Session<'a, T: Transport> {
    link: &'a DeviceLink,
    family: Family,
    transport: Option<T>,
}

impl<'a, T: Transport> Session<'a, T> {
    pub(super) fn new(link: &'a DeviceLink, family: Family, transport: T) -> Self {
        Self {
            link,
            family,
            transport: Some(transport),
        }
    }

    pub(super) fn write(&mut self, command: &Command) -> Result<(), T::Error> {
        match self.transport.as_mut() {
            Some(transport) => transport.write(command.as_bytes()),
            None => Ok(()),
        }
    }

    /// Switch the device off and release it
    pub(super) fn shutdown(mut self) -> Result<(), T::Error> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };

        let result = transport.write(self.off_command().as_bytes());
        transport.close();
        self.link.mark_closed();
        result
    }

    /// Release the device without touching it, used once it stopped responding
    pub(super) fn abort(mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            self.link.mark_closed();
        }
    }

    fn off_command(&self) -> Command {
        self.family.encode(&Animation::off())
    }
}

impl<T: Transport> Drop for Session<'_, T> {
    fn drop(&mut self) {
        // A session that already ended must not touch a link reopened since
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.write(self.off_command().as_bytes());
            transport.close();
            self.link.mark_closed();
        }
    }
}
