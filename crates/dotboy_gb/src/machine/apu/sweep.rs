const MAX_FREQUENCY: u16 = 2047;

/// Frequency sweep (NR10), pulse 1 only.
#[derive(Clone, Debug, Default)]
pub(super) struct Sweep {
    pace: u8,
    negate: bool,
    shift: u8,
    shadow: u16,
    timer: u8,
    enabled: bool,
}

impl Sweep {
    pub(super) fn write(&mut self, value: u8) {
        self.pace = (value >> 4) & 0x07;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
    }

    fn reload_timer(&mut self) {
        self.timer = if self.pace == 0 { 8 } else { self.pace };
    }

    fn candidate(&self) -> u16 {
        let delta = self.shadow >> self.shift;
        if self.negate {
            self.shadow - delta
        } else {
            self.shadow + delta
        }
    }

    /// Reload from the channel frequency. Returns `false` if the immediate
    /// overflow check disables the channel.
    pub(super) fn trigger(&mut self, frequency: u16) -> bool {
        self.shadow = frequency;
        self.reload_timer();
        self.enabled = self.pace != 0 || self.shift != 0;
        !(self.shift != 0 && self.candidate() > MAX_FREQUENCY)
    }

    /// Frame-sequencer clock. Returns `false` when the channel must be
    /// disabled by an overflow.
    pub(super) fn clock(&mut self, frequency: &mut u16) -> bool {
        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return true;
        }
        self.reload_timer();
        if !self.enabled || self.pace == 0 {
            return true;
        }

        let next = self.candidate();
        if next > MAX_FREQUENCY {
            return false;
        }
        if self.shift != 0 {
            self.shadow = next;
            *frequency = next;
            if self.candidate() > MAX_FREQUENCY {
                return false;
            }
        }
        true
    }
}
