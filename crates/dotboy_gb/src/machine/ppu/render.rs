use super::{LcdControl, Ppu, SpriteFlags};
use crate::machine::bus::{MemoryBus, BGP, LCDC, LY, OBP0, OBP1, SCX, SCY, WX, WY};
use crate::SCREEN_WIDTH;

const OAM_BASE: u16 = 0xFE00;
const OAM_ENTRIES: u16 = 40;
const SPRITES_PER_LINE: usize = 10;

#[derive(Clone, Copy, Debug)]
struct Sprite {
    y: u8,
    x: u8,
    tile: u8,
    flags: SpriteFlags,
}

/// Map a 2-bit colour index through a DMG palette register.
#[inline]
fn shade(palette: u8, index: u8) -> usize {
    usize::from((palette >> (index * 2)) & 0x03)
}

/// 2-bit colour index of pixel `bit` (7 = leftmost) in a tile row.
#[inline]
fn tile_pixel(bus: &MemoryBus, row_addr: u16, bit: u8) -> u8 {
    let lo = bus.peek(row_addr);
    let hi = bus.peek(row_addr.wrapping_add(1));
    (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01)
}

/// Start of a BG/window tile's data for the LCDC addressing mode.
#[inline]
fn tile_data_addr(lcdc: LcdControl, tile: u8) -> u16 {
    if lcdc.contains(LcdControl::TILE_DATA_LOW) {
        0x8000 + u16::from(tile) * 16
    } else {
        0x9000u16.wrapping_add_signed(i16::from(tile as i8) * 16)
    }
}

impl Ppu {
    pub(super) fn render_line(&mut self, bus: &MemoryBus) {
        let ly = bus.peek(LY);
        if usize::from(ly) >= crate::SCREEN_HEIGHT {
            return;
        }
        let lcdc = LcdControl::from_bits_retain(bus.peek(LCDC));

        self.bg_opaque = [false; SCREEN_WIDTH];
        if lcdc.contains(LcdControl::BG_ENABLE) {
            self.render_background(bus, lcdc, ly);
        } else {
            let blank = self.palette[0];
            for x in 0..SCREEN_WIDTH {
                self.put_pixel(x, usize::from(ly), blank);
            }
        }
        if lcdc.contains(LcdControl::WINDOW_ENABLE) {
            self.render_window(bus, lcdc, ly);
        }

        if lcdc.contains(LcdControl::SPRITES_ENABLE) {
            self.render_sprites(bus, lcdc, ly);
        }
    }

    fn render_background(&mut self, bus: &MemoryBus, lcdc: LcdControl, ly: u8) {
        let scy = bus.peek(SCY);
        let scx = bus.peek(SCX);
        let bgp = bus.peek(BGP);
        let map_base: u16 = if lcdc.contains(LcdControl::BG_MAP_HIGH) {
            0x9C00
        } else {
            0x9800
        };

        let bg_y = ly.wrapping_add(scy);
        for x in 0..SCREEN_WIDTH {
            let bg_x = (x as u8).wrapping_add(scx);
            let index = self.map_pixel(bus, lcdc, map_base, bg_x, bg_y);
            self.bg_opaque[x] = index != 0;
            let color = self.palette[shade(bgp, index)];
            self.put_pixel(x, usize::from(ly), color);
        }
    }

    fn render_window(&mut self, bus: &MemoryBus, lcdc: LcdControl, ly: u8) {
        let wy = bus.peek(WY);
        let wx = bus.peek(WX);
        if ly < wy || wx > 166 {
            return;
        }
        let bgp = bus.peek(BGP);
        let map_base: u16 = if lcdc.contains(LcdControl::WINDOW_MAP_HIGH) {
            0x9C00
        } else {
            0x9800
        };

        let start = usize::from(wx.saturating_sub(7));
        let skip = 7u8.saturating_sub(wx);
        let win_y = self.window_line;
        for x in start..SCREEN_WIDTH {
            let win_x = (x - start) as u8 + skip;
            let index = self.map_pixel(bus, lcdc, map_base, win_x, win_y);
            self.bg_opaque[x] = index != 0;
            let color = self.palette[shade(bgp, index)];
            self.put_pixel(x, usize::from(ly), color);
        }
        self.window_line = self.window_line.wrapping_add(1);
    }

    /// Colour index at (`x`, `y`) of the 256x256 plane described by the tile
    /// map at `map_base`.
    fn map_pixel(&self, bus: &MemoryBus, lcdc: LcdControl, map_base: u16, x: u8, y: u8) -> u8 {
        let map_addr = map_base + u16::from(y / 8) * 32 + u16::from(x / 8);
        let tile = bus.peek(map_addr);
        let row_addr = tile_data_addr(lcdc, tile) + u16::from(y % 8) * 2;
        tile_pixel(bus, row_addr, 7 - (x % 8))
    }

    fn render_sprites(&mut self, bus: &MemoryBus, lcdc: LcdControl, ly: u8) {
        let height: u8 = if lcdc.contains(LcdControl::TALL_SPRITES) {
            16
        } else {
            8
        };
        let line = u16::from(ly) + 16;

        let mut sprites: Vec<Sprite> = (0..OAM_ENTRIES)
            .map(|i| {
                let addr = OAM_BASE + i * 4;
                Sprite {
                    y: bus.peek(addr),
                    x: bus.peek(addr + 1),
                    tile: bus.peek(addr + 2),
                    flags: SpriteFlags::from_bits_retain(bus.peek(addr + 3)),
                }
            })
            .filter(|s| {
                let top = u16::from(s.y);
                line >= top && line < top + u16::from(height)
            })
            .take(SPRITES_PER_LINE)
            .collect();
        // Stable: equal X keeps OAM order.
        sprites.sort_by_key(|s| s.x);

        let obp0 = bus.peek(OBP0);
        let obp1 = bus.peek(OBP1);
        let mut claimed = [false; SCREEN_WIDTH];

        for sprite in &sprites {
            let mut row = (line - u16::from(sprite.y)) as u8;
            if sprite.flags.contains(SpriteFlags::Y_FLIP) {
                row = height - 1 - row;
            }
            let tile = if height == 16 {
                sprite.tile & 0xFE
            } else {
                sprite.tile
            };
            let row_addr = 0x8000 + u16::from(tile) * 16 + u16::from(row) * 2;
            let palette = if sprite.flags.contains(SpriteFlags::PALETTE_1) {
                obp1
            } else {
                obp0
            };

            for col in 0..8u8 {
                let screen_x = i16::from(sprite.x) - 8 + i16::from(col);
                if !(0..SCREEN_WIDTH as i16).contains(&screen_x) {
                    continue;
                }
                let x = screen_x as usize;
                if claimed[x] {
                    continue;
                }
                let bit = if sprite.flags.contains(SpriteFlags::X_FLIP) {
                    col
                } else {
                    7 - col
                };
                let index = tile_pixel(bus, row_addr, bit);
                if index == 0 {
                    continue;
                }
                claimed[x] = true;
                if sprite.flags.contains(SpriteFlags::BEHIND_BG) && self.bg_opaque[x] {
                    continue;
                }
                let color = self.palette[shade(palette, index)];
                self.put_pixel(x, usize::from(ly), color);
            }
        }
    }
}
