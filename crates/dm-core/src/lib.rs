//! Core value types for the deckmix console.
//!
//! This crate defines the types shared by the synthesizer, the engine and
//! the controller: immutable sample buffers, deck identities and the
//! three-band equalizer layout.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_buffer;
mod deck_id;
mod eq;

pub use audio_buffer::AudioBuffer;
pub use deck_id::DeckId;
pub use eq::{
    EqBand, FilterShape, ParseEqBandError, EQ_HIGH_HZ, EQ_LOW_HZ, EQ_MID_HZ, EQ_MID_Q,
};
