use crate::{EmulatorError, Result};

const TITLE_START: usize = 0x134;
const CGB_FLAG: usize = 0x143;
const CARTRIDGE_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
pub(super) const HEADER_END: usize = 0x150;

/// Bank-controller family named by the header's cartridge type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CartridgeKind {
    RomOnly,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

/// Metadata decoded once from 0x0134..0x014F.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self> {
        if rom.len() < HEADER_END {
            return Err(EmulatorError::InvalidRom(format!(
                "image is {} bytes, shorter than the 0x{HEADER_END:X}-byte header",
                rom.len()
            )));
        }

        let cgb_flag = rom[CGB_FLAG];
        // CGB-aware cartridges reuse 0x143 for the flag.
        let title_end = if cgb_flag & 0x80 != 0 {
            CGB_FLAG
        } else {
            CGB_FLAG + 1
        };
        let title = rom[TITLE_START..title_end]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect::<String>()
            .trim_end()
            .to_owned();

        Ok(Self {
            title,
            cgb_flag,
            cartridge_type: rom[CARTRIDGE_TYPE],
            rom_size_code: rom[ROM_SIZE],
            ram_size_code: rom[RAM_SIZE],
        })
    }

    pub fn kind(&self) -> Result<CartridgeKind> {
        Ok(match self.cartridge_type {
            0x00 | 0x08 | 0x09 => CartridgeKind::RomOnly,
            0x01..=0x03 => CartridgeKind::Mbc1,
            0x05 | 0x06 => CartridgeKind::Mbc2,
            0x0F..=0x13 => CartridgeKind::Mbc3,
            0x19..=0x1E => CartridgeKind::Mbc5,
            other => return Err(EmulatorError::UnsupportedCartridge(other)),
        })
    }

    pub fn has_battery(&self) -> bool {
        matches!(
            self.cartridge_type,
            0x03 | 0x06 | 0x09 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E
        )
    }

    /// ROM size in bytes: 32 KiB << code, for codes 0x00..=0x08 (up to 8 MiB).
    pub fn rom_size(&self) -> usize {
        0x8000 << self.rom_size_code.min(0x08)
    }

    /// External RAM size in bytes as declared by the header.
    pub fn ram_size(&self) -> usize {
        match self.ram_size_code {
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            _ => 0,
        }
    }

    pub fn supports_cgb(&self) -> bool {
        matches!(self.cgb_flag, 0x80 | 0xC0)
    }
}
