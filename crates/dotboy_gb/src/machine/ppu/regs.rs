use bitflags::bitflags;

bitflags! {
    /// LCDC (0xFF40).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LcdControl: u8 {
        const LCD_ENABLE = 0b1000_0000;
        const WINDOW_MAP_HIGH = 0b0100_0000;
        const WINDOW_ENABLE = 0b0010_0000;
        /// Tile data at 0x8000 with unsigned indices; otherwise 0x8800 signed.
        const TILE_DATA_LOW = 0b0001_0000;
        const BG_MAP_HIGH = 0b0000_1000;
        const TALL_SPRITES = 0b0000_0100;
        const SPRITES_ENABLE = 0b0000_0010;
        const BG_ENABLE = 0b0000_0001;
    }
}

bitflags! {
    /// STAT (0xFF41).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LcdStatus: u8 {
        const LYC_INTERRUPT = 0b0100_0000;
        const OAM_INTERRUPT = 0b0010_0000;
        const VBLANK_INTERRUPT = 0b0001_0000;
        const HBLANK_INTERRUPT = 0b0000_1000;
        const COINCIDENCE = 0b0000_0100;
        const MODE = 0b0000_0011;
    }
}

bitflags! {
    /// Attribute byte of an OAM entry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SpriteFlags: u8 {
        const BEHIND_BG = 0b1000_0000;
        const Y_FLIP = 0b0100_0000;
        const X_FLIP = 0b0010_0000;
        const PALETTE_1 = 0b0001_0000;
    }
}

/// PPU mode as reported in STAT bits 1-0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

impl PpuMode {
    /// T-cycles spent in the mode for one scanline. VBlank is entered once
    /// per line, ten times per frame.
    pub const fn budget(self) -> u32 {
        match self {
            PpuMode::OamSearch => 80,
            PpuMode::PixelTransfer => 172,
            PpuMode::HBlank => 204,
            PpuMode::VBlank => 456,
        }
    }
}
