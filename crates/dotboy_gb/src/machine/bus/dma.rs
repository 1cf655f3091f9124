use super::{MemoryBus, DMA};

impl MemoryBus {
    /// OAM DMA: copy 160 bytes from XX00..XX9F to FE00..FE9F.
    ///
    /// The transfer is synchronous and goes through the normal read/write
    /// paths, so cartridge-backed sources resolve through the active bank.
    pub(super) fn do_oam_dma(&mut self, value: u8) {
        let base = u16::from(value) << 8;
        for i in 0u16..0xA0 {
            let byte = self.read_byte(base.wrapping_add(i));
            self.write_byte(0xFE00 + i, byte);
        }
        self.memory[DMA as usize] = value;
    }
}
