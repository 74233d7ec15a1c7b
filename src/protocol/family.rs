use embassy_time::Duration;

use super::{Command, FOOTER, SOUND_BASE, encode_solid, encode_steps};
use crate::animation::Animation;
use crate::sound::Sound;

const FAMILY_NAME_OMEGA: &str = "omega";
const FAMILY_NAME_KUANDO: &str = "kuando";
const FAMILY_NAME_CLASSIC: &str = "classic";

/// The devices switch themselves off after ~30 seconds without traffic
const OMEGA_KEEPALIVE: Duration = Duration::from_secs(9);
const KUANDO_KEEPALIVE: Duration = Duration::from_secs(20);
const CLASSIC_KEEPALIVE: Duration = Duration::from_secs(20);

/// Per-family parameters of the frame-chain encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLayout {
    /// Factor applied to the sound index in the sound byte
    pub sound_multiplier: u8,
    pub footer: [u8; 6],
}

impl StepLayout {
    pub const OMEGA: Self = Self {
        sound_multiplier: 8,
        footer: FOOTER,
    };

    pub const KUANDO: Self = Self {
        sound_multiplier: 3,
        footer: FOOTER,
    };

    /// Sound byte of a step: `0x80 + index * multiplier + volume`
    ///
    /// The arithmetic wraps like the 8-bit field it is written to.
    pub const fn sound_byte(&self, sound: Option<Sound>) -> u8 {
        match sound {
            Some(sound) => SOUND_BASE
                .wrapping_add(sound.index().wrapping_mul(self.sound_multiplier))
                .wrapping_add(sound.volume()),
            None => SOUND_BASE,
        }
    }
}

/// Group of device models sharing one wire format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// BusyLight UC Omega, frame chains with 8x sound index
    Omega,
    /// Kuando BusyLight, frame chains with 3x sound index
    Kuando,
    /// BusyLight UC and Lync, single color only
    Classic,
}

impl Family {
    /// Frame-chain layout, `None` for single-color devices
    pub const fn step_layout(self) -> Option<StepLayout> {
        match self {
            Self::Omega => Some(StepLayout::OMEGA),
            Self::Kuando => Some(StepLayout::KUANDO),
            Self::Classic => None,
        }
    }

    pub const fn supports_animation(self) -> bool {
        self.step_layout().is_some()
    }

    /// Interval at which the device has to be refreshed to stay on
    pub const fn keepalive_period(self) -> Duration {
        match self {
            Self::Omega => OMEGA_KEEPALIVE,
            Self::Kuando => KUANDO_KEEPALIVE,
            Self::Classic => CLASSIC_KEEPALIVE,
        }
    }

    /// Encode an animation for this family
    ///
    /// Single-color devices show the color of the head frame.
    pub fn encode(self, animation: &Animation) -> Command {
        match self.step_layout() {
            Some(layout) => Command::Steps(encode_steps(&layout, Some(animation))),
            None => Command::Solid(encode_solid(animation.head_frame().color())),
        }
    }

    /// Command that keeps the device awake without changing what it shows
    ///
    /// Single-color devices have no such command and need the current color
    /// to be resent instead.
    pub fn keepalive_command(self) -> Option<Command> {
        self.step_layout()
            .map(|layout| Command::Steps(encode_steps(&layout, None)))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Omega => FAMILY_NAME_OMEGA,
            Self::Kuando => FAMILY_NAME_KUANDO,
            Self::Classic => FAMILY_NAME_CLASSIC,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            FAMILY_NAME_OMEGA => Some(Self::Omega),
            FAMILY_NAME_KUANDO => Some(Self::Kuando),
            FAMILY_NAME_CLASSIC => Some(Self::Classic),
            _ => None,
        }
    }
}
