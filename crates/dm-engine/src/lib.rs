//! Signal-chain engine for the deckmix console.
//!
//! The control side ([`Deck`], [`MixBus`], [`Analyser`]) writes parameters
//! to shared atomics and queues transport commands; the render side
//! ([`Mixer`]) owns the audio graph and produces samples. [`build_graph`]
//! wires the two together.

mod analyser;
mod biquad;
mod bus;
mod clock;
mod command;
mod deck;
mod frame;
mod graph;
mod mixer;
mod params;
mod strip;

pub use analyser::{Analyser, Snapshot, BIN_COUNT, FFT_SIZE, MAX_DB, MIN_DB, SMOOTHING};
pub use biquad::{Biquad, BiquadCoeffs, Equalizer};
pub use bus::{equal_power_sends, MixBus, DEFAULT_CROSSFADE, DEFAULT_MASTER_VOLUME};
pub use clock::{AudioClock, FrameClock, ManualClock};
pub use command::{CommandSink, DeckCommand};
pub use deck::{Deck, MIN_RATE};
pub use frame::Frame;
pub use graph::{build_graph, DeckEndpoint, GraphEndpoints, COMMAND_QUEUE_CAPACITY};
pub use mixer::{Mixer, RENDER_QUANTUM};
pub use params::{BusParams, DeckParams};
pub use strip::{ChannelStrip, DEFAULT_CHANNEL_GAIN, RELEASE_FRAMES};
