use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use dotboy_gb::{AudioSink, GameBoy, GameBoyConfig, RamStore, SCREEN_HEIGHT, SCREEN_WIDTH};

#[cfg(test)]
mod tests;

pub const DEFAULT_FRAMES: u32 = 600;

pub const USAGE: &str = "usage: dotboy <rom> [frames] [--dump <path>] [--save-dir <dir>]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub rom: PathBuf,
    pub frames: u32,
    /// Write the last frame as a binary PPM.
    pub dump: Option<PathBuf>,
    /// Directory for `.sav` files; defaults to the ROM's directory.
    pub save_dir: Option<PathBuf>,
}

pub fn parse_args<I>(args: I) -> Result<RunOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut rom = None;
    let mut frames = None;
    let mut dump = None;
    let mut save_dir = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump" => {
                let path = args.next().context("--dump needs a path")?;
                dump = Some(PathBuf::from(path));
            }
            "--save-dir" => {
                let dir = args.next().context("--save-dir needs a directory")?;
                save_dir = Some(PathBuf::from(dir));
            }
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
            _ if rom.is_none() => rom = Some(PathBuf::from(&arg)),
            _ if frames.is_none() => {
                let count = arg
                    .parse::<u32>()
                    .with_context(|| format!("invalid frame count '{arg}'"))?;
                frames = Some(count);
            }
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }

    let Some(rom) = rom else {
        bail!("no ROM path given\n{USAGE}");
    };
    Ok(RunOptions {
        rom,
        frames: frames.unwrap_or(DEFAULT_FRAMES),
        dump,
        save_dir,
    })
}

/// Battery RAM kept as `<dir>/<title>.sav`.
pub struct FileRamStore {
    dir: PathBuf,
}

impl FileRamStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let stem = if stem.is_empty() { "untitled" } else { &stem };
        self.dir.join(format!("{stem}.sav"))
    }
}

impl RamStore for FileRamStore {
    fn save(&mut self, name: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(name);
        fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn load(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }
}

/// Counts samples instead of playing them.
#[derive(Clone, Default)]
pub struct SampleCounter(Rc<Cell<u64>>);

impl SampleCounter {
    pub fn total(&self) -> u64 {
        self.0.get()
    }
}

impl AudioSink for SampleCounter {
    fn push_samples(&mut self, samples: &[f32]) {
        self.0.set(self.0.get() + samples.len() as u64);
    }
}

/// Write an RGBA frame as a binary PPM, dropping alpha.
pub fn write_ppm<W: Write>(mut out: W, rgba: &[u8]) -> io::Result<()> {
    write!(out, "P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n")?;
    for pixel in rgba.chunks_exact(4) {
        out.write_all(&pixel[..3])?;
    }
    out.flush()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u32,
    pub samples: u64,
    pub serial: Vec<u8>,
}

pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let rom = fs::read(&options.rom)
        .with_context(|| format!("reading ROM {}", options.rom.display()))?;

    let save_dir = match &options.save_dir {
        Some(dir) => dir.clone(),
        None => options
            .rom
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let samples = SampleCounter::default();
    let mut gb = GameBoy::new(GameBoyConfig::default());
    gb.set_ram_store(Box::new(FileRamStore::new(save_dir)));
    gb.set_audio_sink(Box::new(samples.clone()));
    gb.load_rom(&rom)
        .with_context(|| format!("loading {}", options.rom.display()))?;

    let mut serial = Vec::new();
    for frame in 0..options.frames {
        gb.run_frame()
            .with_context(|| format!("emulation stopped in frame {frame}"))?;
        serial.append(&mut gb.take_serial_output());
    }
    gb.flush_save().context("saving cartridge RAM")?;

    if let Some(path) = &options.dump {
        let file =
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_ppm(io::BufWriter::new(file), gb.frame_buffer())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote last frame to {}", path.display());
    }

    Ok(RunSummary {
        frames: options.frames,
        samples: samples.total(),
        serial,
    })
}
