use super::rom_offset;

const MBC2_RAM_SIZE: usize = 512;

/// MBC2: 4-bit ROM bank and 512 half-bytes of built-in RAM.
///
/// Both registers live in 0x0000..0x3FFF; address bit 8 picks which one.
pub(super) struct Mbc2 {
    pub(super) ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u8,
}

impl Mbc2 {
    pub(super) fn new() -> Self {
        Self {
            ram: vec![0; MBC2_RAM_SIZE],
            ram_enabled: false,
            rom_bank: 1,
        }
    }

    pub(super) fn read_rom(&self, rom: &[u8], addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            0
        } else {
            usize::from(self.rom_bank)
        };
        rom[rom_offset(rom.len(), bank, addr)]
    }

    pub(super) fn write_register(&mut self, addr: u16, value: u8) {
        if addr >= 0x4000 {
            return;
        }
        if addr & 0x0100 == 0 {
            self.ram_enabled = (value & 0x0F) == 0x0A;
        } else {
            self.rom_bank = (value & 0x0F).max(1);
            log::trace!("MBC2 ROM bank {}", self.rom_bank);
        }
    }

    /// The 512 entries mirror across the whole 0xA000..0xBFFF window.
    pub(super) fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        self.ram[usize::from(addr) & (MBC2_RAM_SIZE - 1)] & 0x0F
    }

    pub(super) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        if !self.ram_enabled {
            return false;
        }
        self.ram[usize::from(addr) & (MBC2_RAM_SIZE - 1)] = value & 0x0F;
        true
    }
}
