use super::channel::{ChannelCore, SoundChannel};

/// Right shift applied to each 4-bit sample for NR32 output levels
/// mute/100%/50%/25%.
const VOLUME_SHIFT: [u8; 4] = [4, 0, 1, 2];

#[derive(Clone, Debug)]
pub(super) struct WaveChannel {
    core: ChannelCore,
    volume_code: u8,
    /// Index into the 32 4-bit samples of wave RAM.
    position: u8,
    ram: [u8; 16],
}

impl WaveChannel {
    pub(super) fn new(index: u8) -> Self {
        Self {
            core: ChannelCore::new(index, 256),
            volume_code: 0,
            position: 0,
            ram: [0; 16],
        }
    }

    pub(super) fn read_ram(&self, offset: usize) -> u8 {
        self.ram[offset % self.ram.len()]
    }

    pub(super) fn write_ram(&mut self, offset: usize, value: u8) {
        let len = self.ram.len();
        self.ram[offset % len] = value;
    }

    pub(super) fn ram(&self) -> [u8; 16] {
        self.ram
    }

    pub(super) fn with_ram(mut self, ram: [u8; 16]) -> Self {
        self.ram = ram;
        self
    }

    fn period(&self) -> u32 {
        (2048 - u32::from(self.core.frequency)) * 2
    }

    fn current_sample(&self) -> u8 {
        let byte = self.ram[usize::from(self.position / 2)];
        if self.position % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }
}

impl SoundChannel for WaveChannel {
    fn core(&self) -> &ChannelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChannelCore {
        &mut self.core
    }

    fn write(&mut self, reg: u8, value: u8) {
        match reg {
            0 => self.core.set_dac(value & 0x80 != 0),
            1 => self.core.length.load(u16::from(value)),
            2 => self.volume_code = (value >> 5) & 0x03,
            3 => self.core.set_frequency_low(value),
            4 => {
                if self.core.write_control(value) {
                    self.position = 0;
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, cycles: u32) {
        let steps = self.core.advance(cycles, self.period());
        self.position = ((u32::from(self.position) + steps) % 32) as u8;
    }

    fn amplitude(&self) -> u8 {
        self.current_sample() >> VOLUME_SHIFT[usize::from(self.volume_code)]
    }
}
