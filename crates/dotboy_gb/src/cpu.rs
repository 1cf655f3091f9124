//! SM83 instruction engine.
//!
//! The CPU only sees memory through the [`Bus`] trait, which keeps it
//! testable against a flat 64 KiB array and lets the machine bus drive the
//! timer and speed-switch hooks.

mod alu;
mod bus;
mod exec;
mod interrupts;
mod regs;
mod step;
mod table;


pub use bus::Bus;
pub use interrupts::Interrupt;
pub use regs::{Flag, Reg, Registers};
pub use table::{AluOp, Cond, Op, Opcode, Operand, RotOp, EXTENDED, PRIMARY};

use crate::bits::{get_bit, with_bit};
use crate::machine::GameBoyModel;
use crate::EmulatorError;

#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    /// Set by STOP when no speed switch was armed; cleared by a joypad request.
    pub stopped: bool,
    /// HALT bug: the next opcode fetch does not advance PC.
    pub(crate) halt_bug: bool,
    /// EI takes effect after the following instruction.
    pub(crate) ime_enable_pending: bool,
    /// Latched fatal error. Once set, every subsequent step fails with it.
    fault: Option<EmulatorError>,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the register state the boot ROM leaves behind on `model`.
    pub fn initialize(&mut self, model: GameBoyModel) {
        *self = Self::default();
        let regs = &mut self.regs;
        match model {
            GameBoyModel::Dmg => {
                regs.set_af(0x01B0);
                regs.set_bc(0x0013);
                regs.set_de(0x00D8);
                regs.set_hl(0x014D);
            }
            GameBoyModel::Cgb => {
                regs.set_af(0x1180);
                regs.set_bc(0x0000);
                regs.set_de(0xFF56);
                regs.set_hl(0x000D);
            }
        }
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
    }

    /// The fatal error that locked this CPU, if any.
    pub fn fault(&self) -> Option<&EmulatorError> {
        self.fault.as_ref()
    }

    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        get_bit(self.regs.f, flag as u8)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.regs.f = with_bit(self.regs.f, flag as u8, value);
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = 0;
    }

    #[inline]
    pub(crate) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        if self.halt_bug {
            self.halt_bug = false;
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        value
    }

    #[inline]
    pub(crate) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Push a word; memory[SP] holds the low byte afterwards.
    #[inline]
    pub fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp);
        let hi = bus.read8(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    fn lock(&mut self, error: EmulatorError) -> EmulatorError {
        log::error!("CPU locked: {error}");
        self.fault = Some(error.clone());
        error
    }
}
