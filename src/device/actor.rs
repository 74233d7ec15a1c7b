use embassy_futures::select::{Either, select};
use embassy_time::Ticker;
use log::{debug, trace, warn};

use super::session::Session;
use super::{DeviceConfig, DeviceLink, DeviceRequest};
use crate::Transport;
use crate::animation::Animation;

/// Worker owning an opened device
///
/// Created by [`DeviceLink::open`]. Dropping the actor, whether it ran or not,
/// switches the device off and releases the transport.
pub struct DeviceActor<'a, T: Transport> {
    link: &'a DeviceLink,
    config: DeviceConfig,
    session: Session<'a, T>,
}

impl<'a, T: Transport> DeviceActor<'a, T> {
    pub(super) fn new(link: &'a DeviceLink, transport: T, config: DeviceConfig) -> Self {
        Self {
            link,
            config,
            session: Session::new(link, config.family, transport),
        }
    }

    /// Serve requests until the device is closed
    ///
    /// Requests are applied one at a time in the order they were sent. When no
    /// request arrives within the keepalive interval the device is refreshed.
    /// A failed write ends the session without further writes and the
    /// transport error is returned.
    pub async fn run(self) -> Result<(), T::Error> {
        let Self {
            link,
            config,
            mut session,
        } = self;
        debug!("[busylight] {} device opened", config.family.as_str());

        let mut current = Animation::off();
        let mut keepalive = Ticker::every(config.keepalive);

        loop {
            // Pending requests always win over the keepalive tick
            let event = select(link.requests.receive(), keepalive.next()).await;
            let result = match event {
                Either::First(request) => {
                    match request {
                        DeviceRequest::SetColor(color) => current = Animation::solid(color),
                        DeviceRequest::SetAnimation(animation) => current = animation,
                        DeviceRequest::TurnOff => current = Animation::off(),
                        DeviceRequest::Close => break,
                    }
                    keepalive.reset();
                    session.write(&config.family.encode(&current))
                }
                Either::Second(()) => {
                    trace!("[busylight] keepalive");
                    session.write(&config.keepalive_command(&current))
                }
            };

            if let Err(err) = result {
                warn!("[busylight] write failed, closing device: {:?}", err);
                session.abort();
                return Err(err);
            }
        }

        debug!("[busylight] {} device closed", config.family.as_str());
        session.shutdown()
    }
}
