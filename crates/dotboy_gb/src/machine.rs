mod apu;
mod bus;
mod cartridge;
mod gameboy;
mod host;
mod joypad;
mod ppu;
mod serial;
mod timer;

pub use apu::StereoSide;
pub use bus::MemoryBus;
pub use cartridge::{Cartridge, CartridgeHeader, CartridgeKind};
pub use gameboy::GameBoy;
pub use host::{AudioSink, FrameSink, RamStore};
pub use joypad::Buttons;
pub use ppu::{LcdControl, LcdStatus, PpuMode, SpriteFlags};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum GameBoyModel {
    #[default]
    Dmg,
    /// Colour hardware. Only the register power-on state and the
    /// double-speed switch differ from DMG here; rendering stays monochrome.
    Cgb,
}

impl GameBoyModel {
    #[inline]
    pub fn is_cgb(self) -> bool {
        matches!(self, GameBoyModel::Cgb)
    }
}

/// Total addressable memory for the Game Boy (64 KiB).
const MEMORY_SIZE: usize = 0x10000;

#[cfg(test)]
mod tests;
