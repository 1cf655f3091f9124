use anyhow::Context;

use super::bus::MemoryBus;
use super::cartridge::Cartridge;
use super::host::{AudioSink, FrameSink, RamStore, SaveScheduler};
use super::ppu::Ppu;
use super::{Buttons, GameBoyModel};
use crate::cpu::Cpu;
use crate::{EmulatorError, GameBoyConfig, Result, CYCLES_PER_FRAME};

/// High-level Game Boy machine.
///
/// Owns the CPU, the bus (and through it the cartridge, timer and APU), the
/// PPU and the host collaborators. Hosts drive it one frame at a time with
/// [`GameBoy::run_frame`].
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) bus: MemoryBus,
    ppu: Ppu,
    config: GameBoyConfig,
    ram_store: Option<Box<dyn RamStore>>,
    audio_sink: Option<Box<dyn AudioSink>>,
    frame_sink: Option<Box<dyn FrameSink>>,
    saves: SaveScheduler,
    /// Cycles the previous frame ran past [`CYCLES_PER_FRAME`].
    cycle_carry: u32,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new(GameBoyConfig::default())
    }
}

impl GameBoy {
    pub fn new(config: GameBoyConfig) -> Self {
        let model = config.model.unwrap_or_default();
        let mut cpu = Cpu::new();
        cpu.initialize(model);
        Self {
            cpu,
            bus: MemoryBus::new(model, config.sample_rate),
            ppu: Ppu::new(config.palette),
            saves: SaveScheduler::new(config.save_debounce_frames),
            config,
            ram_store: None,
            audio_sink: None,
            frame_sink: None,
            cycle_carry: 0,
        }
    }

    pub fn set_ram_store(&mut self, store: Box<dyn RamStore>) {
        self.ram_store = Some(store);
    }

    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.audio_sink = Some(sink);
    }

    pub fn set_frame_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.frame_sink = Some(sink);
    }

    pub fn config(&self) -> &GameBoyConfig {
        &self.config
    }

    /// Insert a cartridge image and power the machine up with it.
    ///
    /// Without a model override the CGB flag in the header picks the model.
    /// Battery RAM saved by an earlier session is restored from the
    /// [`RamStore`]; a failing store is logged and the game starts with
    /// blank RAM.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        let mut cartridge = Cartridge::from_rom(rom.to_vec())?;

        if let Err(err) = self.flush_save() {
            log::warn!("could not save the previous cartridge: {err:#}");
        }

        let model = self.config.model.unwrap_or(if cartridge.header().supports_cgb() {
            GameBoyModel::Cgb
        } else {
            GameBoyModel::Dmg
        });
        log::info!(
            "loaded \"{}\": {:?} (type 0x{:02X}), {} KiB ROM, {} KiB RAM, battery: {}, model: {:?}",
            cartridge.title(),
            cartridge.kind(),
            cartridge.cartridge_type(),
            cartridge.rom_size() / 1024,
            cartridge.ram_size() / 1024,
            cartridge.has_battery(),
            model,
        );

        if cartridge.has_battery() {
            self.restore_ram(&mut cartridge);
        }

        self.bus = MemoryBus::new(model, self.config.sample_rate);
        self.bus.insert_cartridge(cartridge);
        self.ppu = Ppu::new(self.config.palette);
        self.cpu.initialize(model);
        self.saves = SaveScheduler::new(self.config.save_debounce_frames);
        self.cycle_carry = 0;
        Ok(())
    }

    fn restore_ram(&mut self, cartridge: &mut Cartridge) {
        let Some(store) = self.ram_store.as_mut() else {
            return;
        };
        match store.load(cartridge.title()) {
            Ok(Some(data)) => {
                log::info!("restored {} bytes of cartridge RAM", data.len());
                cartridge.load_ram(&data);
            }
            Ok(None) => {}
            Err(err) => log::warn!(
                "could not load saved RAM for \"{}\": {err:#}",
                cartridge.title()
            ),
        }
    }

    /// Power-cycle with the inserted cartridge. Cartridge RAM survives.
    pub fn reset(&mut self) {
        let model = self.bus.model();
        let cartridge = self.bus.take_cartridge();

        self.bus = MemoryBus::new(model, self.config.sample_rate);
        if let Some(mut cartridge) = cartridge {
            cartridge.reset();
            self.bus.insert_cartridge(cartridge);
        }
        self.ppu = Ppu::new(self.config.palette);
        self.cpu.initialize(model);
        self.cycle_carry = 0;
    }

    /// Replace the pressed-button state; call once per frame.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.bus.set_buttons(buttons);
    }

    /// Execute one CPU step and advance the PPU and APU by its cost.
    pub fn step(&mut self) -> Result<u32> {
        if self.bus.cartridge().is_none() {
            return Err(EmulatorError::NoCartridge);
        }
        let cycles = self.cpu.step(&mut self.bus)?;
        self.ppu.step(cycles, &mut self.bus);
        self.bus.apu.tick(cycles);
        Ok(cycles)
    }

    /// Run one video frame (70224 cycles; any overshoot is taken off the
    /// next frame), then hand video and audio to the installed sinks.
    ///
    /// A fatal CPU error stops the frame and is returned by this and every
    /// later call.
    pub fn run_frame(&mut self) -> Result<()> {
        if self.bus.cartridge().is_none() {
            return Err(EmulatorError::NoCartridge);
        }
        self.bus.apu.clear_samples();

        let mut elapsed = self.cycle_carry;
        while elapsed < CYCLES_PER_FRAME {
            elapsed += self.step()?;
        }
        self.cycle_carry = elapsed - CYCLES_PER_FRAME;

        if let Some(sink) = self.frame_sink.as_mut() {
            sink.present(self.ppu.frame());
        }
        if let Some(sink) = self.audio_sink.as_mut() {
            let samples = self.bus.apu.take_samples();
            sink.push_samples(&samples);
        }
        self.schedule_save();
        Ok(())
    }

    fn schedule_save(&mut self) {
        let Some(cartridge) = self.bus.cartridge_mut() else {
            return;
        };
        if !cartridge.has_battery() {
            return;
        }
        let written = cartridge.take_dirty();
        if self.saves.frame_finished(written) {
            match self.persist_ram() {
                Ok(()) => self.saves.saved(),
                Err(err) => log::warn!("{err:#}; retrying later"),
            }
        }
    }

    fn persist_ram(&mut self) -> anyhow::Result<()> {
        let (Some(store), Some(cartridge)) = (self.ram_store.as_mut(), self.bus.cartridge()) else {
            return Ok(());
        };
        store
            .save(cartridge.title(), cartridge.ram())
            .with_context(|| format!("saving cartridge RAM for \"{}\"", cartridge.title()))?;
        log::debug!("saved {} bytes of cartridge RAM", cartridge.ram().len());
        Ok(())
    }

    /// Write battery RAM now if it changed since the last save. Hosts call
    /// this before shutting down.
    pub fn flush_save(&mut self) -> anyhow::Result<()> {
        let Some(cartridge) = self.bus.cartridge_mut() else {
            return Ok(());
        };
        if !cartridge.has_battery() {
            return Ok(());
        }
        if cartridge.take_dirty() {
            self.saves.mark_pending();
        }
        if !self.saves.is_pending() {
            return Ok(());
        }
        self.persist_ram()?;
        self.saves.saved();
        Ok(())
    }

    /// RGBA8 frame, [`crate::SCREEN_WIDTH`] x [`crate::SCREEN_HEIGHT`].
    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame()
    }

    /// Interleaved left/right samples of the last frame. Empty when an
    /// [`AudioSink`] is installed, since the sink already received them.
    pub fn audio_samples(&self) -> &[f32] {
        self.bus.apu.samples()
    }

    pub fn take_samples(&mut self) -> Vec<f32> {
        self.bus.apu.take_samples()
    }

    /// Bytes sent over the serial port since the last
    /// [`GameBoy::take_serial_output`].
    pub fn serial_output(&self) -> &[u8] {
        &self.bus.serial.output
    }

    pub fn take_serial_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bus.serial.output)
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cartridge()
    }

    pub fn model(&self) -> GameBoyModel {
        self.bus.model()
    }
}
