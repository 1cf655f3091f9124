//! Collaborators supplied by the host application.

/// Persistent storage for battery-backed cartridge RAM, keyed by the
/// cartridge title.
pub trait RamStore {
    fn save(&mut self, name: &str, data: &[u8]) -> anyhow::Result<()>;

    /// `Ok(None)` when nothing has been saved under `name` yet.
    fn load(&mut self, name: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Receives interleaved left/right samples once per frame.
pub trait AudioSink {
    fn push_samples(&mut self, samples: &[f32]);
}

/// Receives the finished RGBA frame once per frame.
pub trait FrameSink {
    fn present(&mut self, frame: &[u8]);
}

/// Decides when dirty cartridge RAM is handed to the [`RamStore`]: after
/// `debounce_frames` frames without a new write. The RAM stays pending until
/// a save succeeds, so a failed save is retried after another idle period.
#[derive(Clone, Debug)]
pub(super) struct SaveScheduler {
    debounce_frames: u32,
    idle_frames: u32,
    pending: bool,
}

impl SaveScheduler {
    pub(super) fn new(debounce_frames: u32) -> Self {
        Self {
            debounce_frames,
            idle_frames: 0,
            pending: false,
        }
    }

    /// Record the end of a frame; returns `true` when the RAM should be
    /// saved now.
    pub(super) fn frame_finished(&mut self, written: bool) -> bool {
        if written {
            self.mark_pending();
        } else if self.pending {
            self.idle_frames += 1;
        }

        if self.pending && self.idle_frames >= self.debounce_frames {
            self.idle_frames = 0;
            return true;
        }
        false
    }

    pub(super) fn mark_pending(&mut self) {
        self.pending = true;
        self.idle_frames = 0;
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending
    }

    /// The store accepted the RAM.
    pub(super) fn saved(&mut self) {
        self.pending = false;
        self.idle_frames = 0;
    }
}
