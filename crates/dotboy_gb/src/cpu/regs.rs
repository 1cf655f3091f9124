use crate::{EmulatorError, Result};

/// Registers for the Game Boy CPU (SM83).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

/// Named register operand, either one 8-bit register or a 16-bit pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    A,
    B,
    C,
    D,
    E,
    F,
    H,
    L,
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl Reg {
    pub const fn name(self) -> &'static str {
        match self {
            Reg::A => "A",
            Reg::B => "B",
            Reg::C => "C",
            Reg::D => "D",
            Reg::E => "E",
            Reg::F => "F",
            Reg::H => "H",
            Reg::L => "L",
            Reg::AF => "AF",
            Reg::BC => "BC",
            Reg::DE => "DE",
            Reg::HL => "HL",
            Reg::SP => "SP",
        }
    }
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f & 0xF0])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    pub fn read8(&self, reg: Reg) -> Result<u8> {
        Ok(match reg {
            Reg::A => self.a,
            Reg::B => self.b,
            Reg::C => self.c,
            Reg::D => self.d,
            Reg::E => self.e,
            Reg::F => self.f,
            Reg::H => self.h,
            Reg::L => self.l,
            _ => return Err(width_error(reg, 8)),
        })
    }

    pub fn write8(&mut self, reg: Reg, value: u8) -> Result<()> {
        match reg {
            Reg::A => self.a = value,
            Reg::B => self.b = value,
            Reg::C => self.c = value,
            Reg::D => self.d = value,
            Reg::E => self.e = value,
            Reg::F => self.f = value & 0xF0,
            Reg::H => self.h = value,
            Reg::L => self.l = value,
            _ => return Err(width_error(reg, 8)),
        }
        Ok(())
    }

    pub fn read16(&self, reg: Reg) -> Result<u16> {
        Ok(match reg {
            Reg::AF => self.af(),
            Reg::BC => self.bc(),
            Reg::DE => self.de(),
            Reg::HL => self.hl(),
            Reg::SP => self.sp,
            _ => return Err(width_error(reg, 16)),
        })
    }

    pub fn write16(&mut self, reg: Reg, value: u16) -> Result<()> {
        match reg {
            Reg::AF => self.set_af(value),
            Reg::BC => self.set_bc(value),
            Reg::DE => self.set_de(value),
            Reg::HL => self.set_hl(value),
            Reg::SP => self.sp = value,
            _ => return Err(width_error(reg, 16)),
        }
        Ok(())
    }
}

fn width_error(register: Reg, expected: u8) -> EmulatorError {
    EmulatorError::InvalidRegister { register, expected }
}

/// Flag bits in the F register.
///
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}
