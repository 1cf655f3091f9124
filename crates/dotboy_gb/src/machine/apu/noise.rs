use super::channel::{ChannelCore, SoundChannel};
use super::envelope::Envelope;

const DIVISORS: [u32; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

#[derive(Clone, Debug)]
pub(super) struct NoiseChannel {
    core: ChannelCore,
    envelope: Envelope,
    clock_shift: u8,
    /// 7-bit LFSR mode (NR43 bit 3).
    short_mode: bool,
    divisor_code: u8,
    lfsr: u16,
}

impl NoiseChannel {
    pub(super) fn new(index: u8) -> Self {
        Self {
            core: ChannelCore::new(index, 64),
            envelope: Envelope::default(),
            clock_shift: 0,
            short_mode: false,
            divisor_code: 0,
            lfsr: 0x7FFF,
        }
    }

    pub(super) fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    fn period(&self) -> u32 {
        DIVISORS[usize::from(self.divisor_code)] << self.clock_shift
    }

    fn shift_lfsr(&mut self) {
        let feedback = (self.lfsr ^ (self.lfsr >> 1)) & 0x01;
        self.lfsr = (self.lfsr >> 1) | (feedback << 14);
        if self.short_mode {
            self.lfsr = (self.lfsr & !(1 << 6)) | (feedback << 6);
        }
    }
}

impl SoundChannel for NoiseChannel {
    fn core(&self) -> &ChannelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChannelCore {
        &mut self.core
    }

    fn write(&mut self, reg: u8, value: u8) {
        match reg {
            1 => self.core.length.load(u16::from(value & 0x3F)),
            2 => {
                self.envelope.write(value);
                self.core.set_dac(Envelope::dac_enabled(value));
            }
            3 => {
                self.clock_shift = value >> 4;
                self.short_mode = value & 0x08 != 0;
                self.divisor_code = value & 0x07;
            }
            4 => {
                if self.core.write_control(value) {
                    self.envelope.trigger();
                    self.lfsr = 0x7FFF;
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, cycles: u32) {
        // Shifts of 14 and 15 stop the generator.
        if self.clock_shift >= 14 {
            return;
        }
        let steps = self.core.advance(cycles, self.period());
        for _ in 0..steps {
            self.shift_lfsr();
        }
    }

    fn amplitude(&self) -> u8 {
        if self.lfsr & 0x01 == 0 {
            self.envelope.volume()
        } else {
            0
        }
    }
}
