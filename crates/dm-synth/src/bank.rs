//! Pre-rendered loop cache.

use dm_core::AudioBuffer;

use crate::generators::synthesize_with;
use crate::loop_kind::LoopKind;
use crate::noise::NoiseSource;

/// All four loops rendered once at the output sample rate.
///
/// Decks borrow from the bank by cloning the buffer handle, which shares the
/// sample data rather than copying it.
#[derive(Clone, Debug)]
pub struct LoopBank {
    sample_rate: u32,
    loops: [AudioBuffer; 4],
}

impl LoopBank {
    /// Render every loop at its default duration.
    pub fn generate<N: NoiseSource + ?Sized>(sample_rate: u32, noise: &mut N) -> Self {
        let loops = LoopKind::ALL
            .map(|kind| synthesize_with(kind, sample_rate, kind.default_duration(), &mut *noise));
        Self { sample_rate, loops }
    }

    /// Render every loop, drawing hat noise from the thread-local generator.
    #[cfg(feature = "std")]
    pub fn new(sample_rate: u32) -> Self {
        Self::generate(sample_rate, &mut crate::noise::RngNoise(rand::thread_rng()))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The buffer for `kind`.
    pub fn get(&self, kind: LoopKind) -> &AudioBuffer {
        &self.loops[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoopKind, &AudioBuffer)> {
        LoopKind::ALL.into_iter().zip(self.loops.iter())
    }
}
