use crate::cpu::Bus;

use super::{MemoryBus, KEY1};

impl Bus for MemoryBus {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read_byte(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write_byte(addr, value)
    }

    fn update_timers(&mut self, cycles: u32) {
        self.step_timer(cycles);
    }

    fn double_speed(&self) -> bool {
        self.model.is_cgb() && (self.memory[KEY1 as usize] & 0x80) != 0
    }

    fn speed_switch(&mut self) -> bool {
        let key1 = self.memory[KEY1 as usize];
        if !self.model.is_cgb() || (key1 & 0x01) == 0 {
            return false;
        }
        let switched = (key1 ^ 0x80) & 0x80;
        self.memory[KEY1 as usize] = switched;
        log::debug!("speed switch: double speed {}", switched != 0);
        true
    }
}
