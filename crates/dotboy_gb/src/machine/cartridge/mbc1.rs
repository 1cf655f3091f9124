use super::{ram_offset, rom_offset};

/// MBC1: 5-bit low ROM bank register plus a 2-bit register that either
/// extends the ROM bank or selects the RAM bank depending on the mode.
pub(super) struct Mbc1 {
    pub(super) ram: Vec<u8>,
    ram_enabled: bool,
    bank_low5: u8,
    bank_high2: u8,
    /// 0: bank 0 fixed at 0x0000 and RAM bank 0. 1: `bank_high2` also applies
    /// to the 0x0000 area and selects the RAM bank.
    mode: u8,
}

impl Mbc1 {
    pub(super) fn new(ram_size: usize) -> Self {
        Self {
            ram: vec![0; ram_size],
            ram_enabled: false,
            bank_low5: 1,
            bank_high2: 0,
            mode: 0,
        }
    }

    pub(super) fn rom_bank(&self) -> usize {
        usize::from(self.bank_high2 << 5 | self.bank_low5)
    }

    pub(super) fn read_rom(&self, rom: &[u8], addr: u16) -> u8 {
        let bank = match addr {
            0x0000..=0x3FFF if self.mode == 1 => usize::from(self.bank_high2 << 5),
            0x0000..=0x3FFF => 0,
            _ => self.rom_bank(),
        };
        rom[rom_offset(rom.len(), bank, addr)]
    }

    pub(super) fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = (value & 0x0F) == 0x0A,
            0x2000..=0x3FFF => {
                // Bank 0 is not selectable in the switchable window.
                self.bank_low5 = (value & 0x1F).max(1);
                log::trace!("MBC1 ROM bank {}", self.rom_bank());
            }
            0x4000..=0x5FFF => self.bank_high2 = value & 0x03,
            _ => self.mode = value & 0x01,
        }
    }

    fn ram_bank(&self) -> usize {
        if self.mode == 1 {
            usize::from(self.bank_high2)
        } else {
            0
        }
    }

    pub(super) fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled || self.ram.is_empty() {
            return 0xFF;
        }
        self.ram[ram_offset(self.ram.len(), self.ram_bank(), addr)]
    }

    pub(super) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        if !self.ram_enabled || self.ram.is_empty() {
            return false;
        }
        let index = ram_offset(self.ram.len(), self.ram_bank(), addr);
        self.ram[index] = value;
        true
    }
}
