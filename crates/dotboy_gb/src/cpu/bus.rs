/// Abstraction over the Game Boy bus (memory and IO) as seen by the CPU.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Advance the divider/timer by the cycle cost of the instruction that
    /// just executed. Buses without a timer can ignore it.
    fn update_timers(&mut self, _cycles: u32) {}

    /// Whether the CGB double-speed mode is active (KEY1 bit 7).
    fn double_speed(&self) -> bool {
        false
    }

    /// Handle STOP with a prepared speed switch (KEY1 bit 0).
    ///
    /// Returns `true` if the speed was toggled, in which case the CPU does
    /// not enter the stopped state.
    fn speed_switch(&mut self) -> bool {
        false
    }
}
