//! Single-bit helpers shared by the register-heavy parts of the core.

#[inline]
pub const fn get_bit(value: u8, bit: u8) -> bool {
    (value >> bit) & 0x01 != 0
}

#[inline]
pub const fn set_bit(value: u8, bit: u8) -> u8 {
    value | (1 << bit)
}

#[inline]
pub const fn clear_bit(value: u8, bit: u8) -> u8 {
    value & !(1 << bit)
}

/// Set or clear `bit` depending on `on`.
#[inline]
pub const fn with_bit(value: u8, bit: u8, on: bool) -> u8 {
    if on {
        set_bit(value, bit)
    } else {
        clear_bit(value, bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_helpers_touch_only_the_requested_bit() {
        assert!(get_bit(0b1000_0000, 7));
        assert!(!get_bit(0b1000_0000, 6));
        assert_eq!(set_bit(0x00, 3), 0x08);
        assert_eq!(clear_bit(0xFF, 0), 0xFE);
        assert_eq!(with_bit(0x0F, 7, true), 0x8F);
        assert_eq!(with_bit(0x8F, 7, false), 0x0F);
    }
}
