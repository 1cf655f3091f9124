use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::bus::{DIV, IF, JOYP, KEY1, LCDC, STAT, TAC, TIMA, TMA};
use super::host::SaveScheduler;
use super::*;
use crate::cpu::Interrupt;
use crate::{EmulatorError, GameBoyConfig, CYCLES_PER_FRAME};

const TITLE: &str = "DOTBOY TEST";

/// 32 KiB image with `program` at the entry point.
fn rom_with_program(cartridge_type: u8, ram_code: u8, program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x134..0x134 + TITLE.len()].copy_from_slice(TITLE.as_bytes());
    rom[0x147] = cartridge_type;
    rom[0x149] = ram_code;
    rom[0x100..0x100 + program.len()].copy_from_slice(program);
    rom
}

/// JR -2: spin forever.
const SPIN: [u8; 2] = [0x18, 0xFE];

fn dmg_bus() -> MemoryBus {
    MemoryBus::new(GameBoyModel::Dmg, 44_100)
}

fn pending(bus: &MemoryBus) -> Interrupt {
    Interrupt::from_bits_truncate(bus.read_byte(IF))
}

#[derive(Clone, Default)]
struct MemoryStore {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    saves: Rc<Cell<usize>>,
}

impl RamStore for MemoryStore {
    fn save(&mut self, name: &str, data: &[u8]) -> anyhow::Result<()> {
        self.saves.set(self.saves.get() + 1);
        self.files.borrow_mut().insert(name.to_owned(), data.to_vec());
        Ok(())
    }

    fn load(&mut self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.files.borrow().get(name).cloned())
    }
}

/// Fails the first `failures` saves, then behaves like [`MemoryStore`].
struct FlakyStore {
    failures: usize,
    inner: MemoryStore,
}

impl RamStore for FlakyStore {
    fn save(&mut self, name: &str, data: &[u8]) -> anyhow::Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            anyhow::bail!("device busy");
        }
        self.inner.save(name, data)
    }

    fn load(&mut self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.inner.load(name)
    }
}

struct BrokenStore;

impl RamStore for BrokenStore {
    fn save(&mut self, _name: &str, _data: &[u8]) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    fn load(&mut self, _name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        anyhow::bail!("permission denied")
    }
}

#[derive(Clone, Default)]
struct CountingSinks {
    frames: Rc<Cell<usize>>,
    samples: Rc<RefCell<Vec<usize>>>,
}

impl FrameSink for CountingSinks {
    fn present(&mut self, frame: &[u8]) {
        assert_eq!(frame.len(), crate::SCREEN_WIDTH * crate::SCREEN_HEIGHT * 4);
        self.frames.set(self.frames.get() + 1);
    }
}

impl AudioSink for CountingSinks {
    fn push_samples(&mut self, samples: &[f32]) {
        self.samples.borrow_mut().push(samples.len());
    }
}

#[test]
fn oam_dma_copies_160_bytes() {
    let mut bus = dmg_bus();
    for i in 0..0xA0u16 {
        bus.write_byte(0x8000 + i, i as u8);
    }

    bus.write_byte(0xFF46, 0x80);

    for i in 0..0xA0u16 {
        assert_eq!(bus.read_byte(0xFE00 + i), i as u8);
    }
    assert_eq!(bus.read_byte(0xFF46), 0x80);
}

#[test]
fn div_ignores_software_writes() {
    let mut bus = dmg_bus();
    assert_eq!(bus.read_byte(DIV), 0xAB);

    bus.step_timer(256);
    assert_eq!(bus.read_byte(DIV), 0xAC);

    bus.write_byte(DIV, 0x00);
    assert_eq!(bus.read_byte(DIV), 0xAC);
}

#[test]
fn tima_overflow_reloads_tma_and_requests_timer() {
    let mut bus = dmg_bus();
    bus.write_byte(IF, 0x00);
    bus.write_byte(TMA, 0x42);
    bus.write_byte(TIMA, 0xFE);
    bus.write_byte(TAC, 0x05);

    bus.step_timer(16);
    assert_eq!(bus.read_byte(TIMA), 0xFF);
    assert!(pending(&bus).is_empty());

    bus.step_timer(16);
    assert_eq!(bus.read_byte(TIMA), 0x42);
    assert!(pending(&bus).contains(Interrupt::TIMER));
}

#[test]
fn timer_stopped_when_tac_disabled() {
    let mut bus = dmg_bus();
    bus.write_byte(TIMA, 0x10);
    bus.write_byte(TAC, 0x01);
    bus.step_timer(1024);
    assert_eq!(bus.read_byte(TIMA), 0x10);
    assert_eq!(bus.read_byte(TAC), 0xF9);
}

#[test]
fn joypad_reads_selected_group_and_interrupts_on_press() {
    let mut bus = dmg_bus();
    bus.write_byte(IF, 0x00);

    bus.set_buttons(Buttons::A | Buttons::RIGHT);
    assert!(pending(&bus).contains(Interrupt::JOYPAD));

    bus.write_byte(JOYP, 0x20);
    assert_eq!(bus.read_byte(JOYP), 0xEE);
    bus.write_byte(JOYP, 0x10);
    assert_eq!(bus.read_byte(JOYP), 0xDE);
    bus.write_byte(JOYP, 0x30);
    assert_eq!(bus.read_byte(JOYP), 0xFF);

    // Holding the same buttons is not a new press.
    bus.write_byte(IF, 0x00);
    bus.set_buttons(Buttons::A | Buttons::RIGHT);
    assert!(pending(&bus).is_empty());
    bus.set_buttons(Buttons::A);
    assert!(pending(&bus).is_empty());
}

#[test]
fn echo_ram_mirrors_work_ram() {
    let mut bus = dmg_bus();
    bus.write_byte(0xC123, 0x5A);
    assert_eq!(bus.read_byte(0xE123), 0x5A);

    bus.write_byte(0xFDFF, 0x77);
    assert_eq!(bus.read_byte(0xDDFF), 0x77);

    assert_eq!(bus.read_byte(0xFEA0), 0xFF);
    bus.write_byte(0xFEA0, 0x12);
    assert_eq!(bus.read_byte(0xFEA0), 0xFF);
}

#[test]
fn words_are_little_endian() {
    let mut bus = dmg_bus();
    bus.write_word(0xC000, 0xBEEF);
    assert_eq!(bus.read_byte(0xC000), 0xEF);
    assert_eq!(bus.read_byte(0xC001), 0xBE);
    assert_eq!(bus.read_word(0xC000), 0xBEEF);
    assert_eq!(bus.read_signed_byte(0xC001), 0xBEu8 as i8);
}

#[test]
fn power_on_io_registers() {
    let bus = dmg_bus();
    assert_eq!(bus.read_byte(IF), 0xE1);
    assert_eq!(bus.read_byte(LCDC), 0x91);
    assert_eq!(bus.read_byte(STAT), 0x85);
    assert_eq!(bus.read_byte(KEY1), 0xFF);
    assert_eq!(bus.read_byte(0xFF02), 0x7E);

    let cgb = MemoryBus::new(GameBoyModel::Cgb, 44_100);
    assert_eq!(cgb.read_byte(KEY1), 0x7E);
    assert_eq!(cgb.read_byte(DIV), 0x00);
}

#[test]
fn register_unused_bits_read_high() {
    let mut bus = dmg_bus();
    bus.write_byte(IF, 0xFF);
    assert_eq!(bus.read_byte(IF), 0xFF);
    bus.write_byte(IF, 0x00);
    assert_eq!(bus.read_byte(IF), 0xE0);

    bus.write_byte(STAT, 0x00);
    assert_eq!(bus.read_byte(STAT), 0x85);
}

#[test]
fn internal_serial_transfer_completes_at_once() {
    let mut bus = dmg_bus();
    bus.write_byte(IF, 0x00);
    bus.write_byte(0xFF01, b'A');
    bus.write_byte(0xFF02, 0x81);

    assert!(pending(&bus).contains(Interrupt::SERIAL));
    assert_eq!(bus.serial.output, b"A");
    assert_eq!(bus.read_byte(0xFF01), 0xFF);
    assert_eq!(bus.read_byte(0xFF02), 0x7F);
}

#[test]
fn serial_output_is_drained_by_take() {
    let program = [
        0x3E, b'A', // LD A,'A'
        0xE0, 0x01, // LDH (0x01),A
        0x3E, 0x81, // LD A,0x81
        0xE0, 0x02, // LDH (0x02),A
        0x18, 0xFE, // JR -2
    ];
    let mut gb = GameBoy::default();
    gb.load_rom(&rom_with_program(0x00, 0x00, &program)).unwrap();
    gb.run_frame().unwrap();

    assert_eq!(gb.take_serial_output(), b"A");
    assert!(gb.serial_output().is_empty());
    gb.run_frame().unwrap();
    assert!(gb.take_serial_output().is_empty());
}

#[test]
fn external_clock_serial_never_completes() {
    let mut bus = dmg_bus();
    bus.write_byte(IF, 0x00);
    bus.write_byte(0xFF01, b'A');
    bus.write_byte(0xFF02, 0x80);

    assert!(pending(&bus).is_empty());
    assert!(bus.serial.output.is_empty());
}

#[test]
fn bus_without_cartridge_reads_open_bus() {
    let mut bus = dmg_bus();
    assert_eq!(bus.read_byte(0x0150), 0xFF);
    assert_eq!(bus.read_byte(0xA000), 0xFF);
    bus.write_byte(0x2000, 0x01);
}

#[test]
fn save_scheduler_waits_for_idle_frames() {
    let mut saves = SaveScheduler::new(2);
    assert!(!saves.frame_finished(false));
    assert!(!saves.frame_finished(true));
    assert!(!saves.frame_finished(false));
    assert!(!saves.frame_finished(true));
    assert!(!saves.frame_finished(false));
    assert!(saves.frame_finished(false));
    saves.saved();
    assert!(!saves.frame_finished(false));

    let mut immediate = SaveScheduler::new(0);
    assert!(immediate.frame_finished(true));
    assert!(immediate.is_pending());
    immediate.saved();
    assert!(!immediate.is_pending());
}

#[test]
fn save_scheduler_retries_until_saved() {
    let mut saves = SaveScheduler::new(2);
    assert!(!saves.frame_finished(true));
    assert!(!saves.frame_finished(false));
    assert!(saves.frame_finished(false));

    // The save failed: due again after another idle period.
    assert!(!saves.frame_finished(false));
    assert!(saves.frame_finished(false));
    assert!(saves.is_pending());
}

#[test]
fn run_frame_requires_a_cartridge() {
    let mut gb = GameBoy::default();
    assert_eq!(gb.run_frame(), Err(EmulatorError::NoCartridge));
    assert_eq!(gb.step(), Err(EmulatorError::NoCartridge));
}

#[test]
fn load_rom_rejects_bad_images() {
    let mut gb = GameBoy::default();
    assert!(matches!(
        gb.load_rom(&[0u8; 0x100]),
        Err(EmulatorError::InvalidRom(_))
    ));
    assert_eq!(
        gb.load_rom(&rom_with_program(0xFC, 0, &SPIN)),
        Err(EmulatorError::UnsupportedCartridge(0xFC))
    );
    assert!(gb.cartridge().is_none());
}

#[test]
fn model_follows_the_cgb_flag_unless_overridden() {
    let mut rom = rom_with_program(0x00, 0, &SPIN);
    rom[0x143] = 0x80;

    let mut gb = GameBoy::default();
    gb.load_rom(&rom).unwrap();
    assert_eq!(gb.model(), GameBoyModel::Cgb);
    assert_eq!(gb.cpu.regs.a, 0x11);

    let config = GameBoyConfig::builder().model(GameBoyModel::Dmg).build();
    let mut gb = GameBoy::new(config);
    gb.load_rom(&rom).unwrap();
    assert_eq!(gb.model(), GameBoyModel::Dmg);
    assert_eq!(gb.cpu.regs.a, 0x01);
}

#[test]
fn frame_runs_to_vblank_and_reaches_the_sinks() {
    let sinks = CountingSinks::default();
    let mut gb = GameBoy::default();
    gb.set_frame_sink(Box::new(sinks.clone()));
    gb.set_audio_sink(Box::new(sinks.clone()));
    gb.load_rom(&rom_with_program(0x00, 0, &SPIN)).unwrap();
    gb.bus.write_byte(IF, 0x00);

    gb.run_frame().unwrap();

    assert!(pending(&gb.bus).contains(Interrupt::VBLANK));
    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(sinks.frames.get(), 1);

    gb.run_frame().unwrap();
    assert_eq!(sinks.frames.get(), 2);
    let samples = sinks.samples.borrow();
    assert_eq!(samples.len(), 2);
    for &count in samples.iter() {
        assert_eq!(count % 2, 0);
        assert!((1470..=1482).contains(&count), "{count} samples");
    }
    assert!(gb.audio_samples().is_empty());
}

#[test]
fn samples_stay_available_without_a_sink() {
    let mut gb = GameBoy::default();
    gb.load_rom(&rom_with_program(0x00, 0, &SPIN)).unwrap();
    gb.run_frame().unwrap();

    assert!(!gb.audio_samples().is_empty());
    let taken = gb.take_samples();
    assert_eq!(taken.len() % 2, 0);
    assert!(gb.audio_samples().is_empty());
    assert_eq!(gb.frame_buffer().len(), crate::SCREEN_WIDTH * crate::SCREEN_HEIGHT * 4);
}

#[test]
fn step_feeds_ppu_with_the_cpu_cost() {
    let mut gb = GameBoy::default();
    gb.load_rom(&rom_with_program(0x00, 0, &SPIN)).unwrap();

    let mut elapsed = 0;
    while elapsed < 456 {
        elapsed += gb.step().unwrap();
    }
    assert_eq!(gb.bus.read_byte(0xFF44), 1);
    assert!(elapsed < CYCLES_PER_FRAME);
}

#[test]
fn unknown_opcode_locks_the_session() {
    let mut gb = GameBoy::default();
    gb.load_rom(&rom_with_program(0x00, 0, &[0x00, 0xD3])).unwrap();

    let expected = EmulatorError::UnknownOpcode {
        address: 0x0101,
        opcode: 0xD3,
        extended: false,
    };
    assert_eq!(gb.run_frame(), Err(expected.clone()));
    assert_eq!(gb.run_frame(), Err(expected.clone()));
    assert_eq!(gb.cpu.fault(), Some(&expected));
}

/// Enable RAM, write 0x42 to 0xA000, then spin.
const WRITE_RAM_ONCE: [u8; 12] = [
    0x3E, 0x0A, // LD A,0x0A
    0xEA, 0x00, 0x00, // LD (0x0000),A
    0x3E, 0x42, // LD A,0x42
    0xEA, 0x00, 0xA0, // LD (0xA000),A
    0x18, 0xFE, // JR -2
];

fn battery_machine(store: &MemoryStore, debounce: u32) -> GameBoy {
    let config = GameBoyConfig::builder()
        .save_debounce_frames(debounce)
        .build();
    let mut gb = GameBoy::new(config);
    gb.set_ram_store(Box::new(store.clone()));
    gb.load_rom(&rom_with_program(0x03, 0x02, &WRITE_RAM_ONCE))
        .unwrap();
    gb
}

#[test]
fn battery_ram_is_saved_after_idle_frames() {
    let store = MemoryStore::default();
    let mut gb = battery_machine(&store, 2);

    gb.run_frame().unwrap();
    gb.run_frame().unwrap();
    assert_eq!(store.saves.get(), 0);

    gb.run_frame().unwrap();
    assert_eq!(store.saves.get(), 1);
    let files = store.files.borrow();
    let saved = &files[TITLE];
    assert_eq!(saved.len(), 0x2000);
    assert_eq!(saved[0], 0x42);
    drop(files);

    gb.run_frame().unwrap();
    gb.run_frame().unwrap();
    assert_eq!(store.saves.get(), 1);
}

#[test]
fn flush_save_writes_pending_ram_once() {
    let store = MemoryStore::default();
    let mut gb = battery_machine(&store, 60);

    gb.flush_save().unwrap();
    assert_eq!(store.saves.get(), 0);

    gb.run_frame().unwrap();
    gb.flush_save().unwrap();
    assert_eq!(store.saves.get(), 1);
    gb.flush_save().unwrap();
    assert_eq!(store.saves.get(), 1);
}

#[test]
fn saved_ram_is_restored_on_load() {
    let store = MemoryStore::default();
    store
        .files
        .borrow_mut()
        .insert(TITLE.to_owned(), vec![0x99; 0x2000]);

    let config = GameBoyConfig::builder().build();
    let mut gb = GameBoy::new(config);
    gb.set_ram_store(Box::new(store.clone()));
    gb.load_rom(&rom_with_program(0x03, 0x02, &SPIN)).unwrap();

    let ram = gb.cartridge().map(|cart| cart.ram().to_vec()).unwrap();
    assert!(ram.iter().all(|&b| b == 0x99));
}

#[test]
fn failing_store_does_not_stop_emulation() {
    let config = GameBoyConfig::builder().save_debounce_frames(0).build();
    let mut gb = GameBoy::new(config);
    gb.set_ram_store(Box::new(BrokenStore));
    gb.load_rom(&rom_with_program(0x03, 0x02, &WRITE_RAM_ONCE))
        .unwrap();

    gb.run_frame().unwrap();
    gb.run_frame().unwrap();
}

#[test]
fn failed_save_is_retried_by_the_scheduler() {
    let store = MemoryStore::default();
    let config = GameBoyConfig::builder().save_debounce_frames(1).build();
    let mut gb = GameBoy::new(config);
    gb.set_ram_store(Box::new(FlakyStore {
        failures: 1,
        inner: store.clone(),
    }));
    gb.load_rom(&rom_with_program(0x03, 0x02, &WRITE_RAM_ONCE))
        .unwrap();

    for _ in 0..10 {
        gb.run_frame().unwrap();
    }
    assert_eq!(store.saves.get(), 1);
    assert_eq!(store.files.borrow()[TITLE][0], 0x42);

    // Nothing left to flush.
    gb.flush_save().unwrap();
    assert_eq!(store.saves.get(), 1);
}

#[test]
fn failed_flush_keeps_ram_pending() {
    let store = MemoryStore::default();
    let config = GameBoyConfig::builder().save_debounce_frames(60).build();
    let mut gb = GameBoy::new(config);
    gb.set_ram_store(Box::new(FlakyStore {
        failures: 1,
        inner: store.clone(),
    }));
    gb.load_rom(&rom_with_program(0x03, 0x02, &WRITE_RAM_ONCE))
        .unwrap();
    gb.run_frame().unwrap();

    assert!(gb.flush_save().is_err());
    assert_eq!(store.saves.get(), 0);

    gb.flush_save().unwrap();
    assert_eq!(store.saves.get(), 1);
    assert_eq!(store.files.borrow()[TITLE][0], 0x42);
}

#[test]
fn reset_keeps_cartridge_ram() {
    let mut gb = GameBoy::default();
    gb.load_rom(&rom_with_program(0x03, 0x02, &WRITE_RAM_ONCE))
        .unwrap();
    gb.run_frame().unwrap();

    gb.reset();

    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.cartridge().map(|cart| cart.ram()[0]), Some(0x42));
    // The controller is back to RAM-disabled.
    assert_eq!(gb.bus.read_byte(0xA000), 0xFF);
}

#[test]
fn stop_switches_speed_on_cgb() {
    let program = [
        0x3E, 0x01, // LD A,0x01
        0xE0, 0x4D, // LDH (0x4D),A
        0x10, 0x00, // STOP
        0x18, 0xFE, // JR -2
    ];
    let config = GameBoyConfig::builder().model(GameBoyModel::Cgb).build();
    let mut gb = GameBoy::new(config);
    gb.load_rom(&rom_with_program(0x00, 0, &program)).unwrap();

    gb.run_frame().unwrap();

    assert_eq!(gb.bus.read_byte(KEY1), 0xFE);
    assert!(!gb.cpu.stopped);
}
