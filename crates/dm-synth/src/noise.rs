//! Noise sources for the hat loop.

/// Uniform noise generator used by [`noise_hits`](crate::noise_hits).
pub trait NoiseSource {
    /// Next sample, uniformly distributed in `[-1, 1)`.
    fn next_sample(&mut self) -> f32;
}

/// Adapts any `rand` generator.
pub struct RngNoise<R>(pub R);

impl<R: rand::Rng> NoiseSource for RngNoise<R> {
    fn next_sample(&mut self) -> f32 {
        self.0.gen_range(-1.0f32..1.0)
    }
}

/// Always returns the same value. Makes the hat loop reproducible.
#[derive(Clone, Copy, Debug)]
pub struct FixedNoise(pub f32);

impl NoiseSource for FixedNoise {
    fn next_sample(&mut self) -> f32 {
        self.0
    }
}
