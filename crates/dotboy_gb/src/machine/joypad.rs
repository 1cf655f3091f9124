use bitflags::bitflags;

bitflags! {
    /// Live button state supplied by the input collaborator; a set bit means
    /// pressed. The low nibble is the d-pad, the high nibble the buttons,
    /// each in P1 line order.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const RIGHT = 0b0000_0001;
        const LEFT = 0b0000_0010;
        const UP = 0b0000_0100;
        const DOWN = 0b0000_1000;
        const A = 0b0001_0000;
        const B = 0b0010_0000;
        const SELECT = 0b0100_0000;
        const START = 0b1000_0000;
    }
}

impl Buttons {
    #[inline]
    pub(crate) fn dpad_lines(self) -> u8 {
        self.bits() & 0x0F
    }

    #[inline]
    pub(crate) fn button_lines(self) -> u8 {
        self.bits() >> 4
    }
}
