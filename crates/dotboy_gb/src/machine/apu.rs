//! Four-channel sound unit.
//!
//! The APU owns 0xFF10–0xFF3F. Channel registers are grouped in blocks of
//! five (NRx0..NRx4) starting at 0xFF10, so `(addr - 0xFF10) / 5` selects
//! the channel and the remainder the register inside it.

mod channel;
mod envelope;
mod noise;
mod pulse;
mod sweep;
mod wave;


use channel::SoundChannel;
use noise::NoiseChannel;
use pulse::PulseChannel;
use wave::WaveChannel;

use crate::CPU_CLOCK_HZ;

const NR10: u16 = 0xFF10;
const NR50: u16 = 0xFF24;
const NR51: u16 = 0xFF25;
const NR52: u16 = 0xFF26;
const WAVE_RAM: u16 = 0xFF30;
const WAVE_RAM_END: u16 = 0xFF3F;

/// T-cycles between frame-sequencer steps (512 Hz).
const FRAME_SEQUENCER_PERIOD: u32 = 8192;

/// Bits that read back as 1 for every register from NR10 to 0xFF2F.
const READ_MASKS: [u8; 0x20] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // NR20-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // NR40-NR44
    0x00, 0x00, 0x70, // NR50-NR52
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // unused
];

/// Output side of a stereo sample pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StereoSide {
    Left,
    Right,
}

pub(crate) struct Apu {
    powered: bool,
    pulse1: PulseChannel,
    pulse2: PulseChannel,
    wave: WaveChannel,
    noise: NoiseChannel,
    /// Last written value of each register from NR10 to 0xFF2F.
    registers: [u8; 0x20],
    frame_sequencer_clock: u32,
    frame_sequencer_step: u8,
    sample_rate: u32,
    /// `sample_rate * cycles` accumulated against the CPU clock.
    sample_clock: u64,
    /// Interleaved left/right samples produced since the last take.
    samples: Vec<f32>,
}

impl Apu {
    pub(crate) fn new(sample_rate: u32) -> Self {
        let mut apu = Self {
            powered: true,
            pulse1: PulseChannel::new(0, true),
            pulse2: PulseChannel::new(1, false),
            wave: WaveChannel::new(2),
            noise: NoiseChannel::new(3),
            registers: [0; 0x20],
            frame_sequencer_clock: 0,
            frame_sequencer_step: 0,
            sample_rate,
            sample_clock: 0,
            samples: Vec::new(),
        };
        // Master volume and panning as the boot ROM leaves them.
        apu.write(NR50, 0x77);
        apu.write(NR51, 0xF3);
        apu
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            NR52 => {
                let power = if self.powered { 0x80 } else { 0x00 };
                power | READ_MASKS[usize::from(NR52 - NR10)] | self.channel_status()
            }
            WAVE_RAM..=WAVE_RAM_END => self.wave.read_ram(usize::from(addr - WAVE_RAM)),
            NR10..=0xFF2F => {
                let offset = usize::from(addr - NR10);
                self.registers[offset] | READ_MASKS[offset]
            }
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            NR52 => self.set_power(value & 0x80 != 0),
            WAVE_RAM..=WAVE_RAM_END => self.wave.write_ram(usize::from(addr - WAVE_RAM), value),
            NR10..=NR51 => {
                if !self.powered {
                    return;
                }
                let offset = addr - NR10;
                self.registers[usize::from(offset)] = if offset % 5 == 4 {
                    value & 0x7F
                } else {
                    value
                };
                if addr < NR50 {
                    self.write_channel((offset / 5) as u8, (offset % 5) as u8, value);
                }
            }
            _ => {}
        }
    }

    fn write_channel(&mut self, channel: u8, reg: u8, value: u8) {
        match channel {
            0 => self.pulse1.write(reg, value),
            1 => self.pulse2.write(reg, value),
            2 => self.wave.write(reg, value),
            _ => self.noise.write(reg, value),
        }
    }

    fn set_power(&mut self, on: bool) {
        if self.powered && !on {
            log::debug!("APU powered off");
            let wave_ram = self.wave.ram();
            self.pulse1 = PulseChannel::new(0, true);
            self.pulse2 = PulseChannel::new(1, false);
            self.wave = WaveChannel::new(2).with_ram(wave_ram);
            self.noise = NoiseChannel::new(3);
            self.registers[..usize::from(NR52 - NR10)].fill(0);
        } else if !self.powered && on {
            self.frame_sequencer_step = 0;
            self.frame_sequencer_clock = 0;
        }
        self.powered = on;
    }

    fn channels(&self) -> [&dyn SoundChannel; 4] {
        [&self.pulse1, &self.pulse2, &self.wave, &self.noise]
    }

    fn channels_mut(&mut self) -> [&mut dyn SoundChannel; 4] {
        [
            &mut self.pulse1,
            &mut self.pulse2,
            &mut self.wave,
            &mut self.noise,
        ]
    }

    /// NR52 bits 3-0.
    fn channel_status(&self) -> u8 {
        self.channels()
            .iter()
            .filter(|channel| channel.core().enabled)
            .fold(0, |bits, channel| bits | (1 << channel.core().index()))
    }

    /// Advance by `cycles` T-cycles, emitting samples at the output rate.
    pub(crate) fn tick(&mut self, cycles: u32) {
        if self.powered {
            for channel in self.channels_mut() {
                channel.tick(cycles);
            }

            self.frame_sequencer_clock += cycles;
            while self.frame_sequencer_clock >= FRAME_SEQUENCER_PERIOD {
                self.frame_sequencer_clock -= FRAME_SEQUENCER_PERIOD;
                self.clock_frame_sequencer();
            }
        }

        self.sample_clock += u64::from(self.sample_rate) * u64::from(cycles);
        while self.sample_clock >= u64::from(CPU_CLOCK_HZ) {
            self.sample_clock -= u64::from(CPU_CLOCK_HZ);
            let left = self.mix(StereoSide::Left);
            let right = self.mix(StereoSide::Right);
            self.samples.push(left);
            self.samples.push(right);
        }
    }

    /// One 512 Hz step: length on even steps, sweep on 2 and 6, envelope
    /// on 7.
    pub(crate) fn clock_frame_sequencer(&mut self) {
        let step = self.frame_sequencer_step;
        if step % 2 == 0 {
            for channel in self.channels_mut() {
                channel.core_mut().clock_length();
            }
        }
        if step == 2 || step == 6 {
            self.pulse1.clock_sweep();
        }
        if step == 7 {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.noise.clock_envelope();
        }
        self.frame_sequencer_step = (step + 1) & 0x07;
    }

    fn mix(&self, side: StereoSide) -> f32 {
        let nr50 = self.registers[usize::from(NR50 - NR10)];
        let nr51 = self.registers[usize::from(NR51 - NR10)];
        let sum: f32 = self
            .channels()
            .iter()
            .map(|channel| channel.sample(side, nr50, nr51))
            .sum();
        sum / 4.0
    }

    pub(crate) fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub(crate) fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    pub(crate) fn clear_samples(&mut self) {
        self.samples.clear();
    }
}
