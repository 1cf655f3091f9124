use super::GameBoyModel;

/// Divider and timer counter unit.
///
/// A free-running 16-bit counter advances once per T-cycle and DIV is its
/// upper byte. While TAC enables the timer, elapsed cycles accumulate and
/// every full period of the selected clock yields one TIMA increment.
#[derive(Clone, Debug, Default)]
pub(super) struct Timer {
    internal_counter: u16,
    accumulator: u32,
}

impl Timer {
    pub(super) fn init(&mut self, model: GameBoyModel) {
        self.internal_counter = match model {
            GameBoyModel::Dmg => 0xAB00,
            GameBoyModel::Cgb => 0x0000,
        };
        self.accumulator = 0;
    }

    #[inline]
    pub(super) fn div(&self) -> u8 {
        (self.internal_counter >> 8) as u8
    }

    /// T-cycles per TIMA increment for TAC bits 1-0.
    #[inline]
    fn period(tac: u8) -> u32 {
        match tac & 0x03 {
            0x00 => 1024,
            0x01 => 16,
            0x02 => 64,
            _ => 256,
        }
    }

    /// Advance by `cycles` and return how many times TIMA should increment.
    pub(super) fn advance(&mut self, cycles: u32, tac: u8) -> u32 {
        self.internal_counter = self.internal_counter.wrapping_add(cycles as u16);

        if (tac & 0x04) == 0 {
            return 0;
        }

        let period = Self::period(tac);
        self.accumulator += cycles;
        let increments = self.accumulator / period;
        self.accumulator %= period;
        increments
    }
}
