use super::{Bus, Cond, Cpu, Flag, Interrupt, Op, Opcode, Operand, EXTENDED};
use crate::bits::{clear_bit, get_bit, set_bit};
use crate::{EmulatorError, Result};

impl Cpu {
    /// Run the effect of one decoded instruction whose opcode byte has
    /// already been fetched. Returns the T-cycle cost.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, opcode: Opcode) -> Result<u32> {
        let base = u32::from(opcode.cycles);
        let taken = u32::from(opcode.branch_cycles);

        match opcode.op {
            Op::Nop => {}
            Op::Ld8(dst, src) => {
                let value = self.read_operand(bus, src)?;
                self.write_operand(bus, dst, value)?;
            }
            Op::Ld16Imm(reg) => {
                let value = self.fetch16(bus);
                self.regs.write16(reg, value)?;
            }
            Op::LdAbsSp => {
                let addr = self.fetch16(bus);
                let [lo, hi] = self.regs.sp.to_le_bytes();
                bus.write8(addr, lo);
                bus.write8(addr.wrapping_add(1), hi);
            }
            Op::LdSpHl => self.regs.sp = self.regs.hl(),
            Op::LdHlSpOffset => {
                let imm = self.fetch8(bus);
                let value = self.alu_add16_signed(self.regs.sp, imm);
                self.regs.set_hl(value);
            }
            Op::Push(reg) => {
                let value = self.regs.read16(reg)?;
                self.push_u16(bus, value);
            }
            Op::Pop(reg) => {
                let value = self.pop_u16(bus);
                self.regs.write16(reg, value)?;
            }
            Op::Alu(op, src) => {
                let value = self.read_operand(bus, src)?;
                self.alu(op, value);
            }
            Op::Inc8(target) => {
                let value = self.read_operand(bus, target)?;
                let result = self.alu_inc8(value);
                self.write_operand(bus, target, result)?;
            }
            Op::Dec8(target) => {
                let value = self.read_operand(bus, target)?;
                let result = self.alu_dec8(value);
                self.write_operand(bus, target, result)?;
            }
            Op::Inc16(reg) => {
                let value = self.regs.read16(reg)?;
                self.regs.write16(reg, value.wrapping_add(1))?;
            }
            Op::Dec16(reg) => {
                let value = self.regs.read16(reg)?;
                self.regs.write16(reg, value.wrapping_sub(1))?;
            }
            Op::AddHl(reg) => {
                let value = self.regs.read16(reg)?;
                self.alu_add16_hl(value);
            }
            Op::AddSpOffset => {
                let imm = self.fetch8(bus);
                self.regs.sp = self.alu_add16_signed(self.regs.sp, imm);
            }
            Op::RotateA(op) => {
                self.regs.a = self.alu_rotate(op, self.regs.a);
                self.set_flag(Flag::Z, false);
            }
            Op::Daa => self.alu_daa(),
            Op::Cpl => {
                self.regs.a = !self.regs.a;
                self.set_flag(Flag::N, true);
                self.set_flag(Flag::H, true);
            }
            Op::Scf => {
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, false);
                self.set_flag(Flag::C, true);
            }
            Op::Ccf => {
                let carry = self.get_flag(Flag::C);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, false);
                self.set_flag(Flag::C, !carry);
            }
            Op::Jp(cond) => {
                let addr = self.fetch16(bus);
                if self.condition(cond) {
                    self.regs.pc = addr;
                    return Ok(taken);
                }
            }
            Op::JpHl => self.regs.pc = self.regs.hl(),
            Op::Jr(cond) => {
                let offset = self.fetch8(bus) as i8;
                if self.condition(cond) {
                    self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
                    return Ok(taken);
                }
            }
            Op::Call(cond) => {
                let addr = self.fetch16(bus);
                if self.condition(cond) {
                    let ret = self.regs.pc;
                    self.push_u16(bus, ret);
                    self.regs.pc = addr;
                    return Ok(taken);
                }
            }
            Op::Ret(cond) => {
                if self.condition(cond) {
                    self.regs.pc = self.pop_u16(bus);
                    return Ok(taken);
                }
            }
            Op::Reti => {
                self.regs.pc = self.pop_u16(bus);
                self.ime = true;
            }
            Op::Rst(vector) => {
                let ret = self.regs.pc;
                self.push_u16(bus, ret);
                self.regs.pc = u16::from(vector);
            }
            Op::Di => {
                self.ime = false;
                self.ime_enable_pending = false;
            }
            Op::Ei => self.ime_enable_pending = true,
            Op::Halt => {
                let pending = Interrupt::pending(bus);
                if !self.ime && !pending.is_empty() {
                    // HALT bug: the CPU does not halt and the next fetch
                    // reads the same byte twice.
                    self.halt_bug = true;
                } else {
                    self.halted = true;
                }
            }
            Op::Stop => {
                // STOP is followed by a padding byte.
                let _ = self.fetch8(bus);
                if !bus.speed_switch() {
                    self.stopped = true;
                }
            }
            Op::Prefix => {
                let address = self.regs.pc;
                let code = self.fetch8(bus);
                let Some(extended) = EXTENDED[usize::from(code)] else {
                    return Err(EmulatorError::UnknownOpcode {
                        address,
                        opcode: code,
                        extended: true,
                    });
                };
                return self.execute(bus, extended);
            }
            Op::Rot(op, target) => {
                let value = self.read_operand(bus, target)?;
                let result = self.alu_rotate(op, value);
                self.write_operand(bus, target, result)?;
            }
            Op::Bit(bit, target) => {
                let value = self.read_operand(bus, target)?;
                self.set_flag(Flag::Z, !get_bit(value, bit));
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
            }
            Op::Res(bit, target) => {
                let value = self.read_operand(bus, target)?;
                self.write_operand(bus, target, clear_bit(value, bit))?;
            }
            Op::Set(bit, target) => {
                let value = self.read_operand(bus, target)?;
                self.write_operand(bus, target, set_bit(value, bit))?;
            }
        }

        Ok(base)
    }

    fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::NotZero => !self.get_flag(Flag::Z),
            Cond::Zero => self.get_flag(Flag::Z),
            Cond::NotCarry => !self.get_flag(Flag::C),
            Cond::Carry => self.get_flag(Flag::C),
        }
    }

    fn operand_address<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<Option<u16>> {
        let addr = match operand {
            Operand::Reg(_) | Operand::Imm8 => return Ok(None),
            Operand::Mem(reg) => self.regs.read16(reg)?,
            Operand::MemHlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Operand::MemHlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
            Operand::HighImm => 0xFF00 | u16::from(self.fetch8(bus)),
            Operand::HighC => 0xFF00 | u16::from(self.regs.c),
            Operand::Abs => self.fetch16(bus),
        };
        Ok(Some(addr))
    }

    fn read_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8> {
        match operand {
            Operand::Reg(reg) => self.regs.read8(reg),
            Operand::Imm8 => Ok(self.fetch8(bus)),
            _ => {
                let addr = self.operand_address(bus, operand)?.unwrap_or_default();
                Ok(bus.read8(addr))
            }
        }
    }

    /// Memory operands in read-modify-write instructions are only ever (HL),
    /// so resolving the address a second time is side-effect free.
    fn write_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand, value: u8) -> Result<()> {
        match operand {
            Operand::Reg(reg) => self.regs.write8(reg, value),
            Operand::Imm8 => {
                debug_assert!(false, "immediate operand used as a destination");
                Ok(())
            }
            _ => {
                if let Some(addr) = self.operand_address(bus, operand)? {
                    bus.write8(addr, value);
                }
                Ok(())
            }
        }
    }
}

