mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_time::{Duration, Timer};
    use myrtio_busylight::{
        Animation, DeviceConfig, DeviceError, DeviceLink, Family, KeepaliveMode, Rgb, Sound,
        Transport,
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const GREEN: Rgb = Rgb { r: 0, g: 128, b: 0 };

    #[derive(Default)]
    struct Record {
        writes: Vec<Vec<u8>>,
        closes: usize,
    }

    /// Transport recording every write, optionally failing after `fail_after` writes
    /// or blocking the caller for `delay` on each write
    struct MockTransport {
        record: Rc<RefCell<Record>>,
        fail_after: Option<usize>,
        delay: Option<std::time::Duration>,
    }

    impl MockTransport {
        fn new() -> (Self, Rc<RefCell<Record>>) {
            let record = Rc::new(RefCell::new(Record::default()));
            let transport = Self {
                record: record.clone(),
                fail_after: None,
                delay: None,
            };
            (transport, record)
        }

        fn failing_after(writes: usize) -> (Self, Rc<RefCell<Record>>) {
            let (mut transport, record) = Self::new();
            transport.fail_after = Some(writes);
            (transport, record)
        }

        fn slow(delay: std::time::Duration) -> (Self, Rc<RefCell<Record>>) {
            let (mut transport, record) = Self::new();
            transport.delay = Some(delay);
            (transport, record)
        }
    }

    impl Transport for MockTransport {
        type Error = &'static str;

        fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            let mut record = self.record.borrow_mut();
            if self.fail_after.is_some_and(|limit| record.writes.len() >= limit) {
                return Err("disconnected");
            }
            record.writes.push(data.to_vec());
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            Ok(())
        }

        fn close(&mut self) {
            self.record.borrow_mut().closes += 1;
        }
    }

    fn encoded(family: Family, animation: &Animation) -> Vec<u8> {
        family.encode(animation).as_bytes().to_vec()
    }

    fn blink() -> Animation {
        let mut animation = Animation::solid(RED);
        animation.head_frame_mut().set_timing(5, 5);
        let head = animation.head_id();
        let next = animation.extend(head).unwrap();
        let frame = animation.frame_mut(next).unwrap();
        frame.set_color(GREEN);
        frame.set_sound(Some(Sound::new(1, 2)));
        animation.loop_to(next, head).unwrap();
        animation
    }

    #[test]
    fn test_requests_are_written_in_order() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            light.set_animation(blink()).await.unwrap();
            light.turn_off().await.unwrap();
            light.close().await;
        }));

        assert!(result.is_ok());
        let record = record.borrow();
        assert_eq!(
            record.writes,
            [
                encoded(Family::Omega, &Animation::solid(RED)),
                encoded(Family::Omega, &blink()),
                encoded(Family::Omega, &Animation::off()),
                encoded(Family::Omega, &Animation::off()),
            ]
        );
        assert_eq!(record.closes, 1);
        assert!(light.is_closed());
    }

    #[test]
    fn test_close_always_turns_off() {
        for family in [Family::Omega, Family::Kuando, Family::Classic] {
            let link = DeviceLink::new();
            let (transport, record) = MockTransport::new();
            let (light, actor) = link.open(transport, DeviceConfig::new(family)).unwrap();

            let (result, ()) = block_on(join(actor.run(), async {
                light.set_animation(blink()).await.unwrap();
                light.set_color(GREEN).await.unwrap();
                light.close().await;
            }));

            assert!(result.is_ok());
            let record = record.borrow();
            assert_eq!(record.writes.len(), 3);
            assert_eq!(
                record.writes.last(),
                Some(&encoded(family, &Animation::off()))
            );
            assert_eq!(record.closes, 1);
        }
    }

    #[test]
    fn test_set_color_on_classic_device() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Classic)).unwrap();

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            light.set_animation(blink()).await.unwrap();
            light.close().await;
        }));

        assert!(result.is_ok());
        assert_eq!(
            record.borrow().writes,
            [
                vec![0, 0, 0, 255, 0, 0, 0, 0, 0],
                vec![0, 0, 0, 255, 0, 0, 0, 0, 0],
                vec![0; 9],
            ]
        );
    }

    #[test]
    fn test_keepalive_resends_current_state() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let config = DeviceConfig {
            keepalive: Duration::from_millis(20),
            ..DeviceConfig::new(Family::Kuando)
        };
        let (light, actor) = link.open(transport, config).unwrap();

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(GREEN).await.unwrap();
            Timer::after(Duration::from_millis(110)).await;
            light.close().await;
        }));

        assert!(result.is_ok());
        let record = record.borrow();
        let green = encoded(Family::Kuando, &Animation::solid(GREEN));
        assert!(record.writes.len() >= 4, "got {} writes", record.writes.len());
        let (last, refreshes) = record.writes.split_last().unwrap();
        assert!(refreshes.iter().all(|write| *write == green));
        assert_eq!(*last, encoded(Family::Kuando, &Animation::off()));
    }

    #[test]
    fn test_keepalive_ping() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let config = DeviceConfig {
            keepalive: Duration::from_millis(20),
            ..DeviceConfig::new(Family::Omega)
        }
        .with_keepalive_mode(KeepaliveMode::Ping);
        let (light, actor) = link.open(transport, config).unwrap();

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            Timer::after(Duration::from_millis(70)).await;
            light.close().await;
        }));

        assert!(result.is_ok());
        let record = record.borrow();
        let ping = Family::Omega.keepalive_command().unwrap();
        assert!(record.writes.len() >= 3, "got {} writes", record.writes.len());
        assert_eq!(record.writes[0], encoded(Family::Omega, &Animation::solid(RED)));
        assert_eq!(record.writes[1], ping.as_bytes());
    }

    #[test]
    fn test_write_failure_closes_device() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::failing_after(1);
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            light.set_color(GREEN).await.unwrap();
        }));

        assert_eq!(result, Err("disconnected"));
        assert!(light.is_closed());
        assert_eq!(light.try_set_color(RED), Err(DeviceError::Closed));
        assert_eq!(block_on(light.set_color(RED)), Err(DeviceError::Closed));

        let record = record.borrow();
        // No off command is attempted on a failed device
        assert_eq!(record.writes.len(), 1);
        assert_eq!(record.closes, 1);
    }

    #[test]
    fn test_dropped_actor_turns_device_off() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Kuando)).unwrap();

        assert!(!light.is_closed());
        drop(actor);

        assert!(light.is_closed());
        let record = record.borrow();
        assert_eq!(
            record.writes,
            [encoded(Family::Kuando, &Animation::off())]
        );
        assert_eq!(record.closes, 1);
    }

    #[test]
    fn test_full_queue_is_busy() {
        let link = DeviceLink::new();
        let (transport, _record) = MockTransport::new();
        let (light, _actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();

        for _ in 0..myrtio_busylight::device::REQUEST_QUEUE_SIZE {
            assert_eq!(light.try_set_color(RED), Ok(()));
        }
        assert_eq!(light.try_turn_off(), Err(DeviceError::Busy));
        assert_eq!(light.try_set_animation(blink()), Err(DeviceError::Busy));
    }

    #[test]
    fn test_keep_active_is_unsupported() {
        let link = DeviceLink::new();
        let (transport, _record) = MockTransport::new();
        let (light, _actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();

        assert_eq!(light.set_keep_active(true), Err(DeviceError::Unsupported));
        assert_eq!(light.set_keep_active(false), Err(DeviceError::Unsupported));
    }

    #[test]
    fn test_link_can_be_reopened() {
        let link = DeviceLink::new();
        assert!(link.is_closed());

        let (transport, _record) = MockTransport::new();
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();
        let (result, ()) = block_on(join(actor.run(), light.close()));
        assert!(result.is_ok());
        assert!(link.is_closed());

        let (transport, record) = MockTransport::new();
        let (light, actor) = link.open(transport, DeviceConfig::new(Family::Classic)).unwrap();
        assert!(!light.is_closed());
        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(GREEN).await.unwrap();
            light.close().await;
        }));

        assert!(result.is_ok());
        assert_eq!(record.borrow().writes.len(), 2);
    }

    #[test]
    fn test_open_rejects_busy_link() {
        let link = DeviceLink::new();
        let (first, first_record) = MockTransport::new();
        let (light, actor) = link.open(first, DeviceConfig::new(Family::Classic)).unwrap();

        let (second, second_record) = MockTransport::new();
        let rejected = link.open(second, DeviceConfig::new(Family::Classic));
        assert_eq!(rejected.err(), Some(DeviceError::Busy));
        assert!(!light.is_closed());

        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            light.close().await;
        }));

        assert!(result.is_ok());
        assert_eq!(
            first_record.borrow().writes,
            [vec![0, 0, 0, 255, 0, 0, 0, 0, 0], vec![0; 9]]
        );
        assert!(second_record.borrow().writes.is_empty());
        assert_eq!(second_record.borrow().closes, 0);

        // Once the first device is released the link accepts a new one
        let (second, _record) = MockTransport::new();
        assert!(link.open(second, DeviceConfig::new(Family::Classic)).is_ok());
    }

    #[test]
    fn test_dropped_actor_releases_link() {
        let link = DeviceLink::new();
        let (transport, _record) = MockTransport::new();
        let (_light, actor) = link.open(transport, DeviceConfig::new(Family::Omega)).unwrap();

        let (transport, _record) = MockTransport::new();
        assert_eq!(
            link.open(transport, DeviceConfig::new(Family::Omega)).err(),
            Some(DeviceError::Busy)
        );

        drop(actor);
        let (transport, _record) = MockTransport::new();
        assert!(link.open(transport, DeviceConfig::new(Family::Omega)).is_ok());
    }

    #[test]
    fn test_pending_requests_win_over_keepalive() {
        let link = DeviceLink::new();
        // Every write outlasts the keepalive interval, so the tick is always
        // due when the actor looks for the next event
        let (transport, record) = MockTransport::slow(std::time::Duration::from_millis(30));
        let config = DeviceConfig {
            keepalive: Duration::from_millis(10),
            ..DeviceConfig::new(Family::Kuando)
        };
        let (light, actor) = link.open(transport, config).unwrap();

        light.try_set_color(RED).unwrap();
        light.try_set_animation(blink()).unwrap();
        light.try_turn_off().unwrap();
        block_on(light.close());

        assert!(block_on(actor.run()).is_ok());
        assert_eq!(
            record.borrow().writes,
            [
                encoded(Family::Kuando, &Animation::solid(RED)),
                encoded(Family::Kuando, &blink()),
                encoded(Family::Kuando, &Animation::off()),
                encoded(Family::Kuando, &Animation::off()),
            ]
        );
    }

    #[test]
    fn test_keepalive_restarts_after_request() {
        let link = DeviceLink::new();
        let (transport, record) = MockTransport::new();
        let config = DeviceConfig {
            keepalive: Duration::from_millis(100),
            ..DeviceConfig::new(Family::Omega)
        }
        .with_keepalive_mode(KeepaliveMode::Ping);
        let (light, actor) = link.open(transport, config).unwrap();

        // The second request lands 60ms into the first period and the device
        // is closed 60ms into the second one, so a timer that kept its
        // original schedule would fire in between
        let (result, ()) = block_on(join(actor.run(), async {
            light.set_color(RED).await.unwrap();
            Timer::after(Duration::from_millis(60)).await;
            light.set_color(GREEN).await.unwrap();
            Timer::after(Duration::from_millis(60)).await;
            light.close().await;
        }));

        assert!(result.is_ok());
        assert_eq!(
            record.borrow().writes,
            [
                encoded(Family::Omega, &Animation::solid(RED)),
                encoded(Family::Omega, &Animation::solid(GREEN)),
                encoded(Family::Omega, &Animation::off()),
            ]
        );
    }
}
