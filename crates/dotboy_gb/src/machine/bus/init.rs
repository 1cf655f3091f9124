use super::{MemoryBus, BGP, DIV, DMA, IE, IF, LCDC, STAT};
use crate::machine::GameBoyModel;

impl MemoryBus {
    /// I/O register state the boot ROM leaves behind at PC=0x0100.
    pub(super) fn apply_initial_io_state(&mut self) {
        // WRAM/HRAM contents are effectively random on hardware; a fixed-seed
        // fill keeps runs reproducible without being all-zero.
        self.randomize_internal_ram();

        self.joyp_select = 0x30;

        self.serial.sb = 0x00;
        self.serial.sc = match self.model {
            GameBoyModel::Dmg => 0x7E,
            GameBoyModel::Cgb => 0x7F,
        };

        self.timer.init(self.model);
        let div = self.timer.div();
        self.write_override(DIV, div);

        self.memory[IF as usize] = 0x01;
        self.memory[IE as usize] = 0x00;

        self.memory[LCDC as usize] = 0x91;
        self.memory[STAT as usize] = 0x85;
        self.memory[DMA as usize] = 0xFF;
        self.memory[BGP as usize] = 0xFC;
    }

    /// Fill WRAM and HRAM with xorshift32 output.
    fn randomize_internal_ram(&mut self) {
        let mut x: u32 = 0xC0DE_1234;
        let mut next_byte = || {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        };

        for addr in 0xC000..=0xDFFF {
            self.memory[addr] = next_byte();
        }
        for addr in 0xFF80..=0xFFFE {
            self.memory[addr] = next_byte();
        }
    }
}
