use typed_builder::TypedBuilder;

use crate::color::DMG_PALETTE;
use crate::machine::GameBoyModel;
use crate::Color;

/// Output rate of the audio sample stream.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Idle frames after the last cartridge RAM write before it is persisted.
pub const DEFAULT_SAVE_DEBOUNCE_FRAMES: u32 = 60;

/// Session configuration for a [`crate::GameBoy`].
///
/// ```
/// use dotboy_gb::{GameBoyConfig, GameBoyModel};
///
/// let config = GameBoyConfig::builder()
///     .model(GameBoyModel::Dmg)
///     .sample_rate(48_000)
///     .build();
/// assert_eq!(config.sample_rate, 48_000);
/// ```
#[derive(Clone, Debug, TypedBuilder)]
pub struct GameBoyConfig {
    /// Hardware model. When unset the model follows the cartridge's CGB flag.
    #[builder(default, setter(strip_option))]
    pub model: Option<GameBoyModel>,
    #[builder(default = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
    #[builder(default = DEFAULT_SAVE_DEBOUNCE_FRAMES)]
    pub save_debounce_frames: u32,
    /// RGB shades for DMG colour indices 0..=3.
    #[builder(default = DMG_PALETTE)]
    pub palette: [Color; 4],
}

impl Default for GameBoyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
