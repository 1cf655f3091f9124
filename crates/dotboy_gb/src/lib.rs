pub mod bits;
mod color;
mod config;
pub mod cpu;
mod error;
pub mod machine;

pub use color::Color;
pub use config::GameBoyConfig;
pub use error::{EmulatorError, Result};
pub use machine::{
    AudioSink, Buttons, Cartridge, CartridgeHeader, CartridgeKind, FrameSink, GameBoy,
    GameBoyModel, RamStore,
};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Bytes per pixel in the RGBA frame buffer handed to the display.
pub const BYTES_PER_PIXEL: usize = 4;
/// Master clock of the DMG in T-cycles per second.
pub const CPU_CLOCK_HZ: u32 = 4_194_304;
/// T-cycles in one video frame (154 lines of 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;
