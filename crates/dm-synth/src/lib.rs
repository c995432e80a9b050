//! Procedural loop synthesizer for the deckmix console.
//!
//! Every loop is rendered from closed-form envelope and oscillator math into
//! an immutable mono [`AudioBuffer`](dm_core::AudioBuffer). The only source of
//! randomness is the noise hat, which draws from an injectable
//! [`NoiseSource`] so tests can substitute a seeded or fixed generator.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bank;
mod generators;
mod loop_kind;
mod noise;

pub use bank::LoopBank;
#[cfg(feature = "std")]
pub use generators::synthesize;
pub use generators::{
    bass_line, frame_count, harmonic_pad, noise_hits, pulse, synthesize_with, BASS_NOTES,
    PAD_NOTES,
};
pub use loop_kind::{LoopKind, ParseLoopKindError};
pub use noise::{FixedNoise, NoiseSource, RngNoise};
