//! Console configuration.

use dm_engine::{DEFAULT_CROSSFADE, DEFAULT_MASTER_VOLUME};
use dm_synth::LoopKind;

use crate::error::ConsoleError;

/// Everything needed to bring up a console.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleConfig {
    /// Output rate for offline rendering. Live playback uses the device rate.
    pub sample_rate: u32,
    pub deck_a: LoopKind,
    pub deck_b: LoopKind,
    pub crossfade: f32,
    pub master_volume: f32,
    /// Seed for the hat loop's noise. `None` draws from the thread RNG.
    pub seed: Option<u64>,
    /// Device ring buffer length in live mode.
    pub buffer_ms: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            deck_a: LoopKind::Pulse,
            deck_b: LoopKind::Bass,
            crossfade: DEFAULT_CROSSFADE,
            master_volume: DEFAULT_MASTER_VOLUME,
            seed: None,
            buffer_ms: 100,
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.sample_rate == 0 {
            return Err(ConsoleError::InvalidConfig("sample rate must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.crossfade) {
            return Err(ConsoleError::InvalidConfig(format!(
                "crossfade {} outside [0, 1]",
                self.crossfade
            )));
        }
        if self.master_volume.is_nan() || self.master_volume < 0.0 {
            return Err(ConsoleError::InvalidConfig(format!(
                "master volume {} must be non-negative",
                self.master_volume
            )));
        }
        if self.buffer_ms == 0 {
            return Err(ConsoleError::InvalidConfig("buffer length must be non-zero".into()));
        }
        Ok(())
    }
}
