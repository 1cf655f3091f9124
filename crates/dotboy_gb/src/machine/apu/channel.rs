use super::StereoSide;

/// Counts down on frame-sequencer length steps and silences the channel at
/// zero.
#[derive(Clone, Debug)]
pub(super) struct LengthCounter {
    counter: u16,
    pub(super) enabled: bool,
    max: u16,
}

impl LengthCounter {
    pub(super) fn new(max: u16) -> Self {
        Self {
            counter: 0,
            enabled: false,
            max,
        }
    }

    /// Load the length field written to NRx1; the counter runs for
    /// `max - value` steps.
    pub(super) fn load(&mut self, value: u16) {
        self.counter = self.max - (value % self.max);
    }

    pub(super) fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }

    /// Returns `true` on the clock that takes the counter to zero.
    pub(super) fn clock(&mut self) -> bool {
        if self.enabled && self.counter > 0 {
            self.counter -= 1;
            self.counter == 0
        } else {
            false
        }
    }
}

/// State shared by all four channels.
#[derive(Clone, Debug)]
pub(super) struct ChannelCore {
    /// Position in NR51/NR52 bit order (0 = pulse 1).
    index: u8,
    pub(super) enabled: bool,
    pub(super) dac_enabled: bool,
    pub(super) length: LengthCounter,
    /// 11-bit frequency from NRx3/NRx4.
    pub(super) frequency: u16,
    timer: u32,
}

impl ChannelCore {
    pub(super) fn new(index: u8, length_max: u16) -> Self {
        Self {
            index,
            enabled: false,
            dac_enabled: false,
            length: LengthCounter::new(length_max),
            frequency: 0,
            timer: 0,
        }
    }

    pub(super) fn index(&self) -> u8 {
        self.index
    }

    pub(super) fn set_frequency_low(&mut self, value: u8) {
        self.frequency = (self.frequency & 0x0700) | u16::from(value);
    }

    pub(super) fn set_frequency_high(&mut self, value: u8) {
        self.frequency = (self.frequency & 0x00FF) | (u16::from(value & 0x07) << 8);
    }

    /// Common NRx4 handling. Returns `true` when the write triggers the
    /// channel; the caller then reloads its own generators.
    pub(super) fn write_control(&mut self, value: u8) -> bool {
        self.set_frequency_high(value);
        self.length.enabled = value & 0x40 != 0;
        if value & 0x80 == 0 {
            return false;
        }
        self.enabled = self.dac_enabled;
        self.length.trigger();
        self.timer = 0;
        true
    }

    pub(super) fn set_dac(&mut self, on: bool) {
        self.dac_enabled = on;
        if !on {
            self.enabled = false;
        }
    }

    pub(super) fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    /// Run the frequency timer for `cycles`; returns how many times it
    /// expired with the given `period`.
    pub(super) fn advance(&mut self, cycles: u32, period: u32) -> u32 {
        let period = period.max(1);
        self.timer += cycles;
        let steps = self.timer / period;
        self.timer %= period;
        steps
    }
}

/// A tone generator driven by the APU.
pub(super) trait SoundChannel {
    fn core(&self) -> &ChannelCore;

    fn core_mut(&mut self) -> &mut ChannelCore;

    /// Write register `reg` (0..=4) of this channel's NRx0..NRx4 block.
    fn write(&mut self, reg: u8, value: u8);

    /// Advance the frequency timer by `cycles` T-cycles.
    fn tick(&mut self, cycles: u32);

    /// Current digital output, 0..=15.
    fn amplitude(&self) -> u8;

    /// Output for one side in [-1.0, 1.0], after NR51 routing and the NR50
    /// master volume.
    fn sample(&self, side: StereoSide, nr50: u8, nr51: u8) -> f32 {
        let core = self.core();
        if !core.enabled || !core.dac_enabled {
            return 0.0;
        }
        let (route_bit, volume) = match side {
            StereoSide::Left => (core.index() + 4, (nr50 >> 4) & 0x07),
            StereoSide::Right => (core.index(), nr50 & 0x07),
        };
        if nr51 & (1 << route_bit) == 0 {
            return 0.0;
        }
        let analog = f32::from(self.amplitude()) / 7.5 - 1.0;
        analog * f32::from(volume + 1) / 8.0
    }
}
