/// Sound played by the device while an animation step is active
///
/// Both values are passed to the firmware as-is, their meaning depends on
/// the device model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sound {
    index: u8,
    volume: u8,
}

impl Sound {
    pub const fn new(index: u8, volume: u8) -> Self {
        Self { index, volume }
    }

    /// Replace both the sound index and its volume
    pub fn set(&mut self, index: u8, volume: u8) {
        self.index = index;
        self.volume = volume;
    }

    pub const fn index(self) -> u8 {
        self.index
    }

    pub const fn volume(self) -> u8 {
        self.volume
    }
}
