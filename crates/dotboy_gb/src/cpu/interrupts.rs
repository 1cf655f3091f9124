use bitflags::bitflags;

use super::{Bus, Cpu};

pub const IF_ADDR: u16 = 0xFF0F;
pub const IE_ADDR: u16 = 0xFFFF;

bitflags! {
    /// Interrupt lines as laid out in IF (0xFF0F) and IE (0xFFFF).
    ///
    /// Bit order is also the service priority: VBlank first, Joypad last.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
        const TIMER = 0b0000_0100;
        const SERIAL = 0b0000_1000;
        const JOYPAD = 0b0001_0000;
    }
}

impl Interrupt {
    /// Lines both requested in IF and enabled in IE.
    pub fn pending<B: Bus>(bus: &mut B) -> Interrupt {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        Interrupt::from_bits_truncate(ie & iflags)
    }

    /// Highest-priority line in `self`, if any.
    pub fn highest(self) -> Option<Interrupt> {
        let bits = self.bits();
        if bits == 0 {
            return None;
        }
        Interrupt::from_bits(1 << bits.trailing_zeros())
    }

    /// Fixed dispatch address for a single line.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }
}

impl Cpu {
    /// Wake from HALT and dispatch the highest-priority pending interrupt.
    ///
    /// Any requested line wakes the CPU from HALT, enabled in IE or not.
    /// Dispatch needs IME and a line that is both requested and enabled.
    /// Returns the 20-cycle cost when a dispatch happened.
    pub(super) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let requested = Interrupt::from_bits_truncate(bus.read8(IF_ADDR));
        if !requested.is_empty() {
            self.halted = false;
        }

        if !self.ime {
            return None;
        }
        let interrupt = Interrupt::pending(bus).highest()?;

        self.ime = false;
        let pc = self.regs.pc;
        self.push_u16(bus, pc);

        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags & !interrupt.bits());
        self.regs.pc = interrupt.vector();

        log::debug!(
            "interrupt {:?}: vector=0x{:04X} pc=0x{:04X} sp=0x{:04X}",
            interrupt,
            self.regs.pc,
            pc,
            self.regs.sp,
        );

        Some(20)
    }
}
