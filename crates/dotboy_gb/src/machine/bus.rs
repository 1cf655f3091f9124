use super::{apu::Apu, cartridge::Cartridge, serial::Serial, timer::Timer, Buttons, GameBoyModel};
use super::MEMORY_SIZE;
use crate::cpu::Interrupt;

mod dma;
mod init;
mod joypad;
mod mmio;
mod traits;

pub(crate) const JOYP: u16 = 0xFF00;
pub(crate) const DIV: u16 = 0xFF04;
pub(crate) const TIMA: u16 = 0xFF05;
pub(crate) const TMA: u16 = 0xFF06;
pub(crate) const TAC: u16 = 0xFF07;
pub(crate) const IF: u16 = 0xFF0F;
pub(crate) const LCDC: u16 = 0xFF40;
pub(crate) const STAT: u16 = 0xFF41;
pub(crate) const SCY: u16 = 0xFF42;
pub(crate) const SCX: u16 = 0xFF43;
pub(crate) const LY: u16 = 0xFF44;
pub(crate) const LYC: u16 = 0xFF45;
pub(crate) const DMA: u16 = 0xFF46;
pub(crate) const BGP: u16 = 0xFF47;
pub(crate) const OBP0: u16 = 0xFF48;
pub(crate) const OBP1: u16 = 0xFF49;
pub(crate) const WY: u16 = 0xFF4A;
pub(crate) const WX: u16 = 0xFF4B;
pub(crate) const KEY1: u16 = 0xFF4D;
pub(crate) const IE: u16 = 0xFFFF;

/// The unified 64 KiB address space.
///
/// Cartridge ranges (0x0000–0x7FFF, 0xA000–0xBFFF) go to the inserted
/// [`Cartridge`]; sound registers go to the APU; everything else is backed
/// by `memory`, with a handful of side-effecting addresses handled in
/// `mmio`.
pub struct MemoryBus {
    memory: [u8; MEMORY_SIZE],
    cartridge: Option<Cartridge>,
    pub(crate) apu: Apu,
    pub(crate) serial: Serial,
    timer: Timer,
    model: GameBoyModel,
    /// P1 bits 5 (buttons) and 4 (d-pad); 0 selects a group.
    joyp_select: u8,
    buttons: Buttons,
}

impl MemoryBus {
    pub fn new(model: GameBoyModel, sample_rate: u32) -> Self {
        let mut bus = Self {
            memory: [0; MEMORY_SIZE],
            cartridge: None,
            apu: Apu::new(sample_rate),
            serial: Serial::default(),
            timer: Timer::default(),
            model,
            joyp_select: 0x30,
            buttons: Buttons::empty(),
        };
        bus.apply_initial_io_state();
        bus
    }

    pub fn model(&self) -> GameBoyModel {
        self.model
    }

    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn take_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    #[inline]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.read_mmio(addr)
    }

    #[inline]
    pub fn read_signed_byte(&self, addr: u16) -> i8 {
        self.read_byte(addr) as i8
    }

    /// Little-endian word at `addr`, `addr + 1`.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.write_mmio(addr, value)
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    /// Store into the backing array, bypassing register side effects.
    ///
    /// Used by the timer for DIV and by the PPU for LY/STAT, which software
    /// cannot write directly.
    #[inline]
    pub fn write_override(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// Raw backing byte, as the PPU sees VRAM, OAM and its registers.
    #[inline]
    pub(crate) fn peek(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.memory[IF as usize] |= interrupt.bits();
    }

    pub(crate) fn set_buttons(&mut self, buttons: Buttons) {
        let pressed = buttons & !self.buttons;
        self.buttons = buttons;
        if !pressed.is_empty() {
            self.request_interrupt(Interrupt::JOYPAD);
        }
    }

    /// Advance DIV/TIMA by `cycles` T-cycles.
    pub(crate) fn step_timer(&mut self, cycles: u32) {
        let tac = self.memory[TAC as usize];
        let increments = self.timer.advance(cycles, tac);
        self.write_override(DIV, self.timer.div());

        for _ in 0..increments {
            let (tima, overflow) = self.memory[TIMA as usize].overflowing_add(1);
            if overflow {
                self.memory[TIMA as usize] = self.memory[TMA as usize];
                self.request_interrupt(Interrupt::TIMER);
            } else {
                self.memory[TIMA as usize] = tima;
            }
        }
    }
}
