//! Scanline-based picture unit.
//!
//! The PPU reads VRAM, OAM and its registers straight from the bus backing
//! store and publishes LY/STAT through [`MemoryBus::write_override`], since
//! software cannot write those bits itself.

mod regs;
mod render;

#[cfg(test)]
mod tests;

pub use regs::{LcdControl, LcdStatus, PpuMode, SpriteFlags};

use super::bus::{MemoryBus, LCDC, LY, LYC, STAT};
use crate::cpu::Interrupt;
use crate::{Color, BYTES_PER_PIXEL, SCREEN_HEIGHT, SCREEN_WIDTH};

const VISIBLE_LINES: u8 = SCREEN_HEIGHT as u8;
const TOTAL_LINES: u8 = 154;

pub(crate) struct Ppu {
    mode: PpuMode,
    /// Cycles accumulated in the current mode.
    mode_clock: u32,
    lcd_on: bool,
    /// Internal window line counter; only advances on lines that drew it.
    window_line: u8,
    palette: [Color; 4],
    frame: Vec<u8>,
    /// Columns of the current line with a non-zero BG/window colour index.
    bg_opaque: [bool; SCREEN_WIDTH],
}

impl Ppu {
    pub(crate) fn new(palette: [Color; 4]) -> Self {
        let mut frame = vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL];
        for pixel in frame.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&palette[0].rgba());
        }
        Self {
            mode: PpuMode::OamSearch,
            mode_clock: 0,
            lcd_on: false,
            window_line: 0,
            palette,
            frame,
            bg_opaque: [false; SCREEN_WIDTH],
        }
    }

    pub(crate) fn mode(&self) -> PpuMode {
        self.mode
    }

    /// RGBA8 frame, `SCREEN_WIDTH * SCREEN_HEIGHT * 4` bytes.
    pub(crate) fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Advance by `cycles` T-cycles, carrying any remainder into the next
    /// call.
    pub(crate) fn step(&mut self, cycles: u32, bus: &mut MemoryBus) {
        let lcdc = LcdControl::from_bits_retain(bus.peek(LCDC));
        if !lcdc.contains(LcdControl::LCD_ENABLE) {
            if self.lcd_on {
                self.lcd_on = false;
                self.mode_clock = 0;
                self.set_mode(PpuMode::HBlank, bus);
                // No LYC compare while the screen is off.
                bus.write_override(LY, 0);
            }
            return;
        }

        if !self.lcd_on {
            self.lcd_on = true;
            self.mode_clock = 0;
            self.window_line = 0;
            self.set_ly(0, bus);
            self.set_mode(PpuMode::OamSearch, bus);
        }

        self.mode_clock += cycles;
        while self.mode_clock >= self.mode.budget() {
            self.mode_clock -= self.mode.budget();
            self.advance_mode(bus);
        }
    }

    fn advance_mode(&mut self, bus: &mut MemoryBus) {
        match self.mode {
            PpuMode::OamSearch => self.set_mode(PpuMode::PixelTransfer, bus),
            PpuMode::PixelTransfer => {
                self.render_line(bus);
                self.set_mode(PpuMode::HBlank, bus);

                let stat = LcdStatus::from_bits_retain(bus.peek(STAT));
                if stat.intersects(
                    LcdStatus::HBLANK_INTERRUPT
                        | LcdStatus::VBLANK_INTERRUPT
                        | LcdStatus::OAM_INTERRUPT,
                ) {
                    bus.request_interrupt(Interrupt::LCD_STAT);
                }
            }
            PpuMode::HBlank => {
                let ly = bus.peek(LY).wrapping_add(1);
                self.set_ly(ly, bus);
                if ly == VISIBLE_LINES {
                    self.set_mode(PpuMode::VBlank, bus);
                    bus.request_interrupt(Interrupt::VBLANK);
                } else {
                    self.set_mode(PpuMode::OamSearch, bus);
                }
            }
            PpuMode::VBlank => {
                let ly = bus.peek(LY).wrapping_add(1);
                if ly >= TOTAL_LINES {
                    self.window_line = 0;
                    self.set_ly(0, bus);
                    self.set_mode(PpuMode::OamSearch, bus);
                } else {
                    self.set_ly(ly, bus);
                }
            }
        }
    }

    fn set_mode(&mut self, mode: PpuMode, bus: &mut MemoryBus) {
        self.mode = mode;
        let stat = bus.peek(STAT) & !LcdStatus::MODE.bits();
        bus.write_override(STAT, stat | mode as u8);
    }

    /// Publish LY and run the LY == LYC comparison.
    fn set_ly(&mut self, ly: u8, bus: &mut MemoryBus) {
        bus.write_override(LY, ly);

        let mut stat = LcdStatus::from_bits_retain(bus.peek(STAT));
        let matched = ly == bus.peek(LYC);
        stat.set(LcdStatus::COINCIDENCE, matched);
        bus.write_override(STAT, stat.bits());

        if matched && stat.contains(LcdStatus::LYC_INTERRUPT) {
            bus.request_interrupt(Interrupt::LCD_STAT);
        }
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        let offset = (y * SCREEN_WIDTH + x) * BYTES_PER_PIXEL;
        self.frame[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color.rgba());
    }
}
