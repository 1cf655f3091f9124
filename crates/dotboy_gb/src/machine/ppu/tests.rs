use super::*;
use crate::color::DMG_PALETTE;
use crate::machine::bus::{BGP, IF, LYC, OBP0, SCX, WX, WY};
use crate::machine::GameBoyModel;

const LINE: u32 = 456;

fn setup() -> (Ppu, MemoryBus) {
    let mut bus = MemoryBus::new(GameBoyModel::Dmg, 44_100);
    bus.write_byte(IF, 0x00);
    (Ppu::new(DMG_PALETTE), bus)
}

fn take_interrupts(bus: &mut MemoryBus) -> Interrupt {
    let pending = Interrupt::from_bits_truncate(bus.read_byte(IF));
    bus.write_byte(IF, 0x00);
    pending
}

fn pixel(ppu: &Ppu, x: usize, y: usize) -> [u8; 4] {
    let offset = (y * SCREEN_WIDTH + x) * BYTES_PER_PIXEL;
    let mut rgba = [0; 4];
    rgba.copy_from_slice(&ppu.frame()[offset..offset + 4]);
    rgba
}

fn stat_mode(bus: &MemoryBus) -> u8 {
    bus.read_byte(STAT) & 0x03
}

#[test]
fn scanline_walks_oam_transfer_hblank() {
    let (mut ppu, mut bus) = setup();

    ppu.step(80, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::PixelTransfer);
    assert_eq!(stat_mode(&bus), 3);

    ppu.step(172, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::HBlank);
    assert_eq!(stat_mode(&bus), 0);

    ppu.step(204, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::OamSearch);
    assert_eq!(stat_mode(&bus), 2);
    assert_eq!(bus.read_byte(LY), 1);
}

#[test]
fn overshoot_carries_into_the_next_mode() {
    let (mut ppu, mut bus) = setup();

    ppu.step(100, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::PixelTransfer);

    ppu.step(170, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::HBlank);

    ppu.step(185, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::HBlank);
    ppu.step(1, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::OamSearch);
    assert_eq!(bus.read_byte(LY), 1);
}

#[test]
fn visible_lines_end_in_vblank_with_a_single_request() {
    let (mut ppu, mut bus) = setup();
    let mut vblank_requests = 0;

    for line in 0..144 {
        ppu.step(LINE, &mut bus);
        if take_interrupts(&mut bus).contains(Interrupt::VBLANK) {
            vblank_requests += 1;
            assert_eq!(line, 143);
        }
    }

    assert_eq!(vblank_requests, 1);
    assert_eq!(ppu.mode(), PpuMode::VBlank);
    assert_eq!(bus.read_byte(LY), 144);
}

#[test]
fn vblank_spans_ten_lines_then_wraps() {
    let (mut ppu, mut bus) = setup();
    for _ in 0..144 {
        ppu.step(LINE, &mut bus);
    }

    for expected in 145..154 {
        ppu.step(LINE, &mut bus);
        assert_eq!(bus.read_byte(LY), expected);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
    }

    ppu.step(LINE, &mut bus);
    assert_eq!(bus.read_byte(LY), 0);
    assert_eq!(ppu.mode(), PpuMode::OamSearch);
}

#[test]
fn lyc_match_sets_coincidence_and_requests_stat() {
    let (mut ppu, mut bus) = setup();
    bus.write_byte(LYC, 2);
    bus.write_byte(STAT, LcdStatus::LYC_INTERRUPT.bits());

    ppu.step(LINE, &mut bus);
    assert!(!take_interrupts(&mut bus).contains(Interrupt::LCD_STAT));
    assert_eq!(bus.read_byte(STAT) & 0x04, 0);

    ppu.step(LINE, &mut bus);
    assert!(take_interrupts(&mut bus).contains(Interrupt::LCD_STAT));
    assert_eq!(bus.read_byte(STAT) & 0x04, 0x04);
}

#[test]
fn hblank_select_requests_stat_after_transfer() {
    let (mut ppu, mut bus) = setup();
    bus.write_byte(STAT, LcdStatus::HBLANK_INTERRUPT.bits());

    ppu.step(80, &mut bus);
    assert!(take_interrupts(&mut bus).is_empty());
    ppu.step(172, &mut bus);
    assert!(take_interrupts(&mut bus).contains(Interrupt::LCD_STAT));
}

#[test]
fn software_cannot_write_ly_or_stat_mode() {
    let (mut ppu, mut bus) = setup();
    ppu.step(80, &mut bus);

    bus.write_byte(LY, 0x42);
    bus.write_byte(STAT, 0x00);

    assert_eq!(bus.read_byte(LY), 0);
    assert_eq!(stat_mode(&bus), 3);
    assert_eq!(bus.read_byte(STAT) & 0x80, 0x80);
}

#[test]
fn lcd_off_holds_line_zero_in_hblank() {
    let (mut ppu, mut bus) = setup();
    for _ in 0..10 {
        ppu.step(LINE, &mut bus);
    }

    bus.write_byte(LCDC, 0x11);
    ppu.step(LINE, &mut bus);
    ppu.step(LINE, &mut bus);
    assert_eq!(bus.read_byte(LY), 0);
    assert_eq!(ppu.mode(), PpuMode::HBlank);

    bus.write_byte(LCDC, 0x91);
    ppu.step(4, &mut bus);
    assert_eq!(ppu.mode(), PpuMode::OamSearch);
}

#[test]
fn lcd_off_does_not_compare_lyc() {
    let (mut ppu, mut bus) = setup();
    for _ in 0..10 {
        ppu.step(LINE, &mut bus);
    }
    bus.write_byte(LYC, 0);
    bus.write_byte(STAT, LcdStatus::LYC_INTERRUPT.bits());
    take_interrupts(&mut bus);

    bus.write_byte(LCDC, 0x11);
    ppu.step(LINE, &mut bus);

    assert_eq!(bus.read_byte(LY), 0);
    assert!(!take_interrupts(&mut bus).contains(Interrupt::LCD_STAT));
}

#[test]
fn window_draws_with_the_background_disabled() {
    let (mut ppu, mut bus) = setup();
    // Tile 0, row 0: colour 3.
    bus.write_byte(0x8000, 0xFF);
    bus.write_byte(0x8001, 0xFF);
    bus.write_byte(BGP, 0xE4);
    bus.write_byte(WY, 0);
    bus.write_byte(WX, 7 + 80);
    // LCD on, window on with the 0x9C00 map, unsigned tile data, BG off.
    bus.write_byte(LCDC, 0xF0);

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 79, 0), Color::WHITE.rgba());
    assert_eq!(pixel(&ppu, 80, 0), Color::BLACK.rgba());
    assert_eq!(pixel(&ppu, 159, 0), Color::BLACK.rgba());
}

#[test]
fn background_rows_are_rendered_through_bgp() {
    let (mut ppu, mut bus) = setup();
    // Tile 0, row 0: colour 3 everywhere; other rows colour 0.
    bus.write_byte(0x8000, 0xFF);
    bus.write_byte(0x8001, 0xFF);
    bus.write_byte(BGP, 0xE4);

    ppu.step(80 + 172, &mut bus);
    assert_eq!(pixel(&ppu, 0, 0), Color::BLACK.rgba());
    assert_eq!(pixel(&ppu, 159, 0), Color::BLACK.rgba());

    ppu.step(204 + 80 + 172, &mut bus);
    assert_eq!(pixel(&ppu, 0, 1), Color::WHITE.rgba());
}

#[test]
fn scroll_offsets_the_background() {
    let (mut ppu, mut bus) = setup();
    bus.write_byte(BGP, 0xE4);
    // Map entry (1, 0) uses tile 1, whose row 0 is colour 1.
    bus.write_byte(0x9801, 0x01);
    bus.write_byte(0x8010, 0xFF);
    bus.write_byte(SCX, 8);

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 0, 0), Color::LIGHT_GRAY.rgba());
    assert_eq!(pixel(&ppu, 8, 0), Color::WHITE.rgba());
}

/// Tile 1: row 0 colour 1. Tile 2: row 0 colour 2.
fn sprite_tiles(bus: &mut MemoryBus) {
    bus.write_byte(0x8010, 0xFF);
    bus.write_byte(0x8021, 0xFF);
    bus.write_byte(OBP0, 0xE4);
    bus.write_byte(LCDC, 0x93);
}

fn put_sprite(bus: &mut MemoryBus, index: u16, y: u8, x: u8, tile: u8, flags: u8) {
    let addr = 0xFE00 + index * 4;
    bus.write_byte(addr, y);
    bus.write_byte(addr + 1, x);
    bus.write_byte(addr + 2, tile);
    bus.write_byte(addr + 3, flags);
}

#[test]
fn sprites_with_equal_x_keep_oam_order() {
    let (mut ppu, mut bus) = setup();
    sprite_tiles(&mut bus);
    put_sprite(&mut bus, 0, 16, 8, 2, 0);
    put_sprite(&mut bus, 1, 16, 8, 1, 0);

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 0, 0), Color::DARK_GRAY.rgba());
}

#[test]
fn lower_x_sprite_wins_overlaps() {
    let (mut ppu, mut bus) = setup();
    sprite_tiles(&mut bus);
    put_sprite(&mut bus, 0, 16, 10, 2, 0);
    put_sprite(&mut bus, 1, 16, 8, 1, 0);

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 2, 0), Color::LIGHT_GRAY.rgba());
    assert_eq!(pixel(&ppu, 8, 0), Color::DARK_GRAY.rgba());
}

#[test]
fn only_ten_sprites_per_line() {
    let (mut ppu, mut bus) = setup();
    sprite_tiles(&mut bus);
    for i in 0..11u16 {
        put_sprite(&mut bus, i, 16, 8 + (i as u8) * 8, 1, 0);
    }

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 72, 0), Color::LIGHT_GRAY.rgba());
    assert_eq!(pixel(&ppu, 80, 0), Color::WHITE.rgba());
}

#[test]
fn behind_bg_sprites_only_show_over_colour_zero() {
    let (mut ppu, mut bus) = setup();
    sprite_tiles(&mut bus);
    bus.write_byte(BGP, 0xE4);
    // Map entry (0, 0) uses tile 3: row 0 colour 1 on the left half only.
    bus.write_byte(0x9800, 0x03);
    bus.write_byte(0x8030, 0xF0);
    put_sprite(&mut bus, 0, 16, 8, 2, SpriteFlags::BEHIND_BG.bits());

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 0, 0), Color::LIGHT_GRAY.rgba());
    assert_eq!(pixel(&ppu, 4, 0), Color::DARK_GRAY.rgba());
}

#[test]
fn x_flip_mirrors_the_sprite_row() {
    let (mut ppu, mut bus) = setup();
    sprite_tiles(&mut bus);
    // Tile 4, row 0: only the leftmost pixel set (colour 1).
    bus.write_byte(0x8040, 0x80);
    put_sprite(&mut bus, 0, 16, 8, 4, SpriteFlags::X_FLIP.bits());

    ppu.step(80 + 172, &mut bus);

    assert_eq!(pixel(&ppu, 0, 0), Color::WHITE.rgba());
    assert_eq!(pixel(&ppu, 7, 0), Color::LIGHT_GRAY.rgba());
}
