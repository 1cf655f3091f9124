mod header;
mod mbc1;
mod mbc2;
mod mbc3;
mod mbc5;
mod rom_only;


pub use header::{CartridgeHeader, CartridgeKind};

use header::HEADER_END;
use mbc1::Mbc1;
use mbc2::Mbc2;
use mbc3::Mbc3;
use mbc5::Mbc5;
use rom_only::RomOnly;

use crate::Result;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Offset into the ROM image for `addr` within `bank`, wrapped to the image.
#[inline]
fn rom_offset(len: usize, bank: usize, addr: u16) -> usize {
    (bank * ROM_BANK_SIZE + (usize::from(addr) & (ROM_BANK_SIZE - 1))) % len
}

/// Offset into external RAM for `addr` (0xA000..0xBFFF) within `bank`,
/// wrapped to the RAM size.
#[inline]
fn ram_offset(len: usize, bank: usize, addr: u16) -> usize {
    (bank * RAM_BANK_SIZE + (usize::from(addr) & (RAM_BANK_SIZE - 1))) % len
}

/// Active bank controller.
enum Controller {
    RomOnly(RomOnly),
    Mbc1(Mbc1),
    Mbc2(Mbc2),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Controller {
    fn new(kind: CartridgeKind, ram_size: usize) -> Self {
        match kind {
            CartridgeKind::RomOnly => Controller::RomOnly(RomOnly::new(ram_size)),
            CartridgeKind::Mbc1 => Controller::Mbc1(Mbc1::new(ram_size)),
            CartridgeKind::Mbc2 => Controller::Mbc2(Mbc2::new()),
            CartridgeKind::Mbc3 => Controller::Mbc3(Mbc3::new(ram_size)),
            CartridgeKind::Mbc5 => Controller::Mbc5(Mbc5::new(ram_size)),
        }
    }

    fn ram(&self) -> &[u8] {
        match self {
            Controller::RomOnly(c) => &c.ram,
            Controller::Mbc1(c) => &c.ram,
            Controller::Mbc2(c) => &c.ram,
            Controller::Mbc3(c) => &c.ram,
            Controller::Mbc5(c) => &c.ram,
        }
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        match self {
            Controller::RomOnly(c) => &mut c.ram,
            Controller::Mbc1(c) => &mut c.ram,
            Controller::Mbc2(c) => &mut c.ram,
            Controller::Mbc3(c) => &mut c.ram,
            Controller::Mbc5(c) => &mut c.ram,
        }
    }
}

/// A loaded cartridge: ROM image, decoded header and bank controller state.
pub struct Cartridge {
    header: CartridgeHeader,
    kind: CartridgeKind,
    rom: Vec<u8>,
    controller: Controller,
    /// Set by every accepted RAM write; cleared by [`Cartridge::take_dirty`].
    ram_dirty: bool,
}

impl Cartridge {
    pub fn from_rom(rom: Vec<u8>) -> Result<Self> {
        let header = CartridgeHeader::parse(&rom)?;
        let kind = header.kind()?;
        debug_assert!(rom.len() >= HEADER_END);

        if rom.len() != header.rom_size() {
            log::warn!(
                "ROM image is {} bytes but the header declares {}",
                rom.len(),
                header.rom_size()
            );
        }

        let controller = Controller::new(kind, header.ram_size());
        Ok(Self {
            header,
            kind,
            rom,
            controller,
            ram_dirty: false,
        })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn kind(&self) -> CartridgeKind {
        self.kind
    }

    pub fn cartridge_type(&self) -> u8 {
        self.header.cartridge_type
    }

    pub fn rom_size(&self) -> usize {
        self.header.rom_size()
    }

    pub fn ram_size(&self) -> usize {
        self.controller.ram().len()
    }

    pub fn has_battery(&self) -> bool {
        self.header.has_battery()
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => match &self.controller {
                Controller::RomOnly(c) => c.read_rom(&self.rom, addr),
                Controller::Mbc1(c) => c.read_rom(&self.rom, addr),
                Controller::Mbc2(c) => c.read_rom(&self.rom, addr),
                Controller::Mbc3(c) => c.read_rom(&self.rom, addr),
                Controller::Mbc5(c) => c.read_rom(&self.rom, addr),
            },
            0xA000..=0xBFFF => match &self.controller {
                Controller::RomOnly(c) => c.read_ram(addr),
                Controller::Mbc1(c) => c.read_ram(addr),
                Controller::Mbc2(c) => c.read_ram(addr),
                Controller::Mbc3(c) => c.read_ram(addr),
                Controller::Mbc5(c) => c.read_ram(addr),
            },
            _ => 0xFF,
        }
    }

    #[inline]
    pub fn read_signed_byte(&self, addr: u16) -> i8 {
        self.read_byte(addr) as i8
    }

    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => match &mut self.controller {
                Controller::RomOnly(_) => {}
                Controller::Mbc1(c) => c.write_register(addr, value),
                Controller::Mbc2(c) => c.write_register(addr, value),
                Controller::Mbc3(c) => c.write_register(addr, value),
                Controller::Mbc5(c) => c.write_register(addr, value),
            },
            0xA000..=0xBFFF => {
                let written = match &mut self.controller {
                    Controller::RomOnly(c) => c.write_ram(addr, value),
                    Controller::Mbc1(c) => c.write_ram(addr, value),
                    Controller::Mbc2(c) => c.write_ram(addr, value),
                    Controller::Mbc3(c) => c.write_ram(addr, value),
                    Controller::Mbc5(c) => c.write_ram(addr, value),
                };
                self.ram_dirty |= written;
            }
            _ => {}
        }
    }

    /// External RAM contents, all banks.
    pub fn ram(&self) -> &[u8] {
        self.controller.ram()
    }

    /// Restore external RAM from a previous session. Extra bytes are
    /// ignored; missing bytes keep their current value.
    pub fn load_ram(&mut self, data: &[u8]) {
        let ram = self.controller.ram_mut();
        let len = ram.len().min(data.len());
        ram[..len].copy_from_slice(&data[..len]);
        if data.len() != ram.len() {
            log::warn!(
                "save data is {} bytes, cartridge RAM is {}",
                data.len(),
                ram.len()
            );
        }
    }

    /// Whether RAM changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.ram_dirty)
    }

    /// Return the bank controller to its power-on state, keeping RAM.
    pub fn reset(&mut self) {
        let mut controller = Controller::new(self.kind, self.header.ram_size());
        let ram = self.controller.ram();
        let dst = controller.ram_mut();
        let len = dst.len().min(ram.len());
        dst[..len].copy_from_slice(&ram[..len]);
        self.controller = controller;
    }
}
