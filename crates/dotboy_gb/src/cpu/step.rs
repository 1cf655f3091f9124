use super::{Bus, Cpu, Interrupt, Op, PRIMARY};
use crate::{EmulatorError, Result};

impl Cpu {
    /// Execute one instruction (preceded by an interrupt dispatch when one is
    /// due) or one 4-cycle halted slice, and return the T-cycles the rest of
    /// the machine should advance by.
    ///
    /// The divider/timer is advanced inside the step with the undivided cost;
    /// in CGB double-speed mode the returned cost is halved for the PPU and
    /// APU. A fetched opcode with no table entry locks the CPU: this and
    /// every later call return the same error.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        if self.stopped {
            // STOP ends once a joypad line goes low or the joypad interrupt
            // is requested. Timers stay frozen meanwhile.
            let p1 = bus.read8(0xFF00);
            let iflags = Interrupt::from_bits_truncate(bus.read8(0xFF0F));
            if (p1 & 0x0F) != 0x0F || iflags.contains(Interrupt::JOYPAD) {
                self.stopped = false;
            }
            return Ok(4);
        }

        let dispatch = self.service_interrupts(bus).unwrap_or(0);

        if self.halted {
            bus.update_timers(4);
            return Ok(4);
        }

        let address = self.regs.pc;
        let code = self.fetch8(bus);
        let Some(opcode) = PRIMARY[usize::from(code)] else {
            return Err(self.lock(EmulatorError::UnknownOpcode {
                address,
                opcode: code,
                extended: false,
            }));
        };

        let enable_ime = std::mem::take(&mut self.ime_enable_pending);
        let cycles = match self.execute(bus, opcode) {
            Ok(cycles) => cycles,
            Err(err) => return Err(self.lock(err)),
        };
        if enable_ime && opcode.op != Op::Di {
            self.ime = true;
        }

        Ok(self.finish(bus, dispatch + cycles))
    }

    fn finish<B: Bus>(&mut self, bus: &mut B, cycles: u32) -> u32 {
        bus.update_timers(cycles);
        if bus.double_speed() {
            cycles / 2
        } else {
            cycles
        }
    }
}
