/// Serial port registers SB/SC.
///
/// No link partner is emulated. An internally clocked transfer completes
/// immediately: the outgoing byte is appended to `output`, SB receives 0xFF
/// (an idle line) and the start bit clears.
#[derive(Default)]
pub(crate) struct Serial {
    pub(crate) sb: u8,
    pub(crate) sc: u8,
    pub(crate) output: Vec<u8>,
}

impl Serial {
    pub(super) fn write_sb(&mut self, value: u8) {
        self.sb = value;
    }

    /// Returns `true` when a transfer completed and the serial interrupt
    /// should be requested.
    pub(super) fn write_sc(&mut self, value: u8) -> bool {
        self.sc = value;
        if (self.sc & 0x81) != 0x81 {
            return false;
        }
        self.output.push(self.sb);
        self.sb = 0xFF;
        self.sc &= !0x80;
        true
    }
}
