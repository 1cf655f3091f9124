use super::{ram_offset, rom_offset};

/// MBC3 with its real-time clock left as an address-decode stub.
///
/// Selecting an RTC register (0x08..=0x0C) maps nothing: reads give 0xFF
/// and writes are dropped. Latch writes are accepted without effect.
pub(super) struct Mbc3 {
    pub(super) ram: Vec<u8>,
    ram_and_timer_enabled: bool,
    rom_bank: u8,
    /// 0x00..=0x03 selects a RAM bank, 0x08..=0x0C an RTC register.
    select: u8,
}

impl Mbc3 {
    pub(super) fn new(ram_size: usize) -> Self {
        Self {
            ram: vec![0; ram_size],
            ram_and_timer_enabled: false,
            rom_bank: 1,
            select: 0,
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
            0x0000..=0x1FFF => self.ram_and_timer_enabled = (value & 0x0F) == 0x0A,
            0x2000..=0x3FFF => {
                self.rom_bank = (value & 0x7F).max(1);
                log::trace!("MBC3 ROM bank {}", self.rom_bank);
            }
            0x4000..=0x5FFF => self.select = value & 0x0F,
            _ => log::trace!("MBC3 clock latch write 0x{value:02X} ignored"),
        }
    }

    fn ram_bank(&self) -> Option<usize> {
        match self.select {
            0x00..=0x03 if !self.ram.is_empty() => Some(usize::from(self.select)),
            _ => None,
        }
    }

    pub(super) fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_and_timer_enabled {
            return 0xFF;
        }
        match self.ram_bank() {
            Some(bank) => self.ram[ram_offset(self.ram.len(), bank, addr)],
            None => 0xFF,
        }
    }

    pub(super) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        if !self.ram_and_timer_enabled {
            return false;
        }
        let Some(bank) = self.ram_bank() else {
            return false;
        };
        let index = ram_offset(self.ram.len(), bank, addr);
        self.ram[index] = value;
        true
    }
}
