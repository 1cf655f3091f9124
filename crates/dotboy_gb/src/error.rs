use thiserror::Error;

use crate::cpu::Reg;

/// Fatal conditions that stop the emulation loop.
///
/// Recoverable hardware quirks (disabled cartridge RAM, unimplemented MBC3
/// clock registers) never surface here; they are absorbed by the component
/// that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmulatorError {
    #[error("unknown opcode {} at 0x{address:04X}", opcode_name(.opcode, .extended))]
    UnknownOpcode {
        address: u16,
        opcode: u8,
        extended: bool,
    },

    #[error("register {register:?} cannot be used as a {expected}-bit operand")]
    InvalidRegister { register: Reg, expected: u8 },

    #[error("no cartridge loaded")]
    NoCartridge,

    #[error("invalid ROM image: {0}")]
    InvalidRom(String),

    #[error("unsupported cartridge type 0x{0:02X}")]
    UnsupportedCartridge(u8),
}

pub type Result<T, E = EmulatorError> = std::result::Result<T, E>;

fn opcode_name(opcode: &u8, extended: &bool) -> String {
    if *extended {
        format!("0xCB 0x{opcode:02X}")
    } else {
        format!("0x{opcode:02X}")
    }
}
