use super::super::{MemoryBus, DIV, DMA, IF, JOYP, KEY1, LY, STAT};
use crate::cpu::Interrupt;

impl MemoryBus {
    pub(in crate::machine::bus) fn write_mmio(&mut self, addr: u16, value: u8) {
        match addr {
            // Writes to ROM space are bank-controller register writes.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.write_byte(addr, value);
                }
            }

            0xE000..=0xFDFF => self.memory[(addr - 0x2000) as usize] = value,

            0xFEA0..=0xFEFF => {}

            JOYP => self.write_joyp(value),

            0xFF01 => self.serial.write_sb(value),
            0xFF02 => {
                if self.serial.write_sc(value) {
                    self.request_interrupt(Interrupt::SERIAL);
                }
            }

            // DIV only changes through the timer's own override path.
            DIV => {}

            IF => self.memory[IF as usize] = value & 0x1F,

            0xFF10..=0xFF3F => self.apu.write(addr, value),

            // Mode and coincidence bits are owned by the PPU.
            STAT => {
                let current = self.memory[STAT as usize];
                self.memory[STAT as usize] = (value & 0x78) | (current & 0x07);
            }

            LY => {}

            DMA => self.do_oam_dma(value),

            KEY1 => {
                if self.model.is_cgb() {
                    let current = self.memory[KEY1 as usize];
                    self.memory[KEY1 as usize] = (current & 0x80) | (value & 0x01);
                }
            }

            _ => self.memory[addr as usize] = value,
        }
    }
}
