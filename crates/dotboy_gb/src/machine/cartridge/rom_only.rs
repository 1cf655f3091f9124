use super::ram_offset;

/// Cartridge without a bank controller, optionally with directly mapped RAM.
pub(super) struct RomOnly {
    pub(super) ram: Vec<u8>,
}

impl RomOnly {
    pub(super) fn new(ram_size: usize) -> Self {
        Self {
            ram: vec![0; ram_size],
        }
    }

    pub(super) fn read_rom(&self, rom: &[u8], addr: u16) -> u8 {
        rom[usize::from(addr) % rom.len()]
    }

    pub(super) fn read_ram(&self, addr: u16) -> u8 {
        if self.ram.is_empty() {
            return 0xFF;
        }
        self.ram[ram_offset(self.ram.len(), 0, addr)]
    }

    pub(super) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        if self.ram.is_empty() {
            return false;
        }
        let index = ram_offset(self.ram.len(), 0, addr);
        self.ram[index] = value;
        true
    }
}
