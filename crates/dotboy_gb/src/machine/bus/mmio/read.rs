use super::super::{MemoryBus, IF, JOYP, KEY1, STAT, TAC};

impl MemoryBus {
    pub(in crate::machine::bus) fn read_mmio(&self, addr: u16) -> u8 {
        match addr {
            // Cartridge ROM and external RAM.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => match &self.cartridge {
                Some(cart) => cart.read_byte(addr),
                None => 0xFF,
            },

            // Echo RAM: 0xE000..0xFDFF mirrors 0xC000..0xDDFF.
            0xE000..=0xFDFF => self.memory[(addr - 0x2000) as usize],

            // Unusable area.
            0xFEA0..=0xFEFF => 0xFF,

            JOYP => self.read_joyp(),

            0xFF01 => self.serial.sb,
            0xFF02 => self.serial.sc | 0x7E,

            TAC => self.memory[TAC as usize] | 0xF8,

            // Upper 3 bits of IF always read as 1.
            IF => self.memory[IF as usize] | 0b1110_0000,

            0xFF10..=0xFF3F => self.apu.read(addr),

            STAT => self.memory[STAT as usize] | 0x80,

            KEY1 => {
                if self.model.is_cgb() {
                    self.memory[KEY1 as usize] | 0x7E
                } else {
                    0xFF
                }
            }

            _ => self.memory[addr as usize],
        }
    }
}
