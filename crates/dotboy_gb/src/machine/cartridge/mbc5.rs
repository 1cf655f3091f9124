use super::{ram_offset, rom_offset};

/// MBC5: 9-bit ROM bank (bank 0 selectable) and 4-bit RAM bank.
pub(super) struct Mbc5 {
    pub(super) ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
}

impl Mbc5 {
    pub(super) fn new(ram_size: usize) -> Self {
        Self {
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
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
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = (value & 0x0F) == 0x0A,
            0x2000..=0x2FFF => {
                self.rom_bank = (self.rom_bank & 0x100) | u16::from(value);
                log::trace!("MBC5 ROM bank {}", self.rom_bank);
            }
            0x3000..=0x3FFF => {
                self.rom_bank = (self.rom_bank & 0x0FF) | (u16::from(value & 0x01) << 8);
                log::trace!("MBC5 ROM bank {}", self.rom_bank);
            }
            0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
            _ => {}
        }
    }

    pub(super) fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled || self.ram.is_empty() {
            return 0xFF;
        }
        self.ram[ram_offset(self.ram.len(), usize::from(self.ram_bank), addr)]
    }

    pub(super) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        if !self.ram_enabled || self.ram.is_empty() {
            return false;
        }
        let index = ram_offset(self.ram.len(), usize::from(self.ram_bank), addr);
        self.ram[index] = value;
        true
    }
}
