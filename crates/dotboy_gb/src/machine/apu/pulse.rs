use super::channel::{ChannelCore, SoundChannel};
use super::envelope::Envelope;
use super::sweep::Sweep;

/// 12.5%, 25%, 50% and 75% waveforms, one bit per duty step.
const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];

#[derive(Clone, Debug)]
pub(super) struct PulseChannel {
    core: ChannelCore,
    duty: u8,
    duty_position: u8,
    envelope: Envelope,
    /// Present on pulse 1 only.
    sweep: Option<Sweep>,
}

impl PulseChannel {
    pub(super) fn new(index: u8, with_sweep: bool) -> Self {
        Self {
            core: ChannelCore::new(index, 64),
            duty: 0,
            duty_position: 0,
            envelope: Envelope::default(),
            sweep: with_sweep.then(Sweep::default),
        }
    }

    pub(super) fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub(super) fn clock_sweep(&mut self) {
        let Some(sweep) = self.sweep.as_mut() else {
            return;
        };
        if !self.core.enabled {
            return;
        }
        if !sweep.clock(&mut self.core.frequency) {
            self.core.enabled = false;
        }
    }

    fn period(&self) -> u32 {
        (2048 - u32::from(self.core.frequency)) * 4
    }
}

impl SoundChannel for PulseChannel {
    fn core(&self) -> &ChannelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChannelCore {
        &mut self.core
    }

    fn write(&mut self, reg: u8, value: u8) {
        match reg {
            0 => {
                if let Some(sweep) = self.sweep.as_mut() {
                    sweep.write(value);
                }
            }
            1 => {
                self.duty = value >> 6;
                self.core.length.load(u16::from(value & 0x3F));
            }
            2 => {
                self.envelope.write(value);
                self.core.set_dac(Envelope::dac_enabled(value));
            }
            3 => self.core.set_frequency_low(value),
            4 => {
                if self.core.write_control(value) {
                    self.envelope.trigger();
                    let frequency = self.core.frequency;
                    if let Some(sweep) = self.sweep.as_mut() {
                        if !sweep.trigger(frequency) {
                            self.core.enabled = false;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, cycles: u32) {
        let steps = self.core.advance(cycles, self.period());
        self.duty_position = ((u32::from(self.duty_position) + steps) % 8) as u8;
    }

    fn amplitude(&self) -> u8 {
        let high = DUTY_TABLE[usize::from(self.duty)][usize::from(self.duty_position)];
        high * self.envelope.volume()
    }
}
