/// Volume envelope (NRx2) for the pulse and noise channels.
#[derive(Clone, Debug, Default)]
pub(super) struct Envelope {
    initial_volume: u8,
    increase: bool,
    pace: u8,
    volume: u8,
    timer: u8,
}

impl Envelope {
    pub(super) fn write(&mut self, value: u8) {
        self.initial_volume = value >> 4;
        self.increase = value & 0x08 != 0;
        self.pace = value & 0x07;
    }

    /// The DAC is powered whenever the upper five bits of NRx2 are non-zero.
    pub(super) fn dac_enabled(value: u8) -> bool {
        value & 0xF8 != 0
    }

    pub(super) fn trigger(&mut self) {
        self.volume = self.initial_volume;
        self.timer = self.pace;
    }

    pub(super) fn clock(&mut self) {
        if self.pace == 0 {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return;
        }
        self.timer = self.pace;
        if self.increase && self.volume < 15 {
            self.volume += 1;
        } else if !self.increase && self.volume > 0 {
            self.volume -= 1;
        }
    }

    pub(super) fn volume(&self) -> u8 {
        self.volume
    }
}
