//! Transport commands from a deck to its channel strip.
//!
//! Each deck owns one single-producer/single-consumer queue into the
//! [`Mixer`](crate::Mixer), drained at the start of every render quantum.
//! Only transport travels here; gain, rate and EQ are latest-value state in
//! [`DeckParams`](crate::DeckParams) and never occupy queue slots.

use std::fmt;

use basedrop::Shared;
use dm_core::AudioBuffer;
use ringbuf::traits::Producer;
use ringbuf::HeapProd;

/// Commands addressed to one channel strip.
pub enum DeckCommand {
    /// Start a fresh looping voice `offset` seconds into `buffer`.
    ///
    /// `at` is the clock time the deck recorded when it sent the command.
    /// The voice is advanced by the time between `at` and the block where
    /// it starts, so render and control positions agree.
    Start {
        buffer: Shared<AudioBuffer>,
        offset: f64,
        at: f64,
    },
    /// Fade out and release the current voice.
    Stop,
}

impl fmt::Debug for DeckCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckCommand::Start { buffer, offset, at } => f
                .debug_struct("Start")
                .field("frames", &buffer.frames())
                .field("offset", offset)
                .field("at", at)
                .finish(),
            DeckCommand::Stop => f.write_str("Stop"),
        }
    }
}

/// Destination for commands of type `C`.
pub trait CommandSink<C> {
    /// Queue a command without blocking. A full queue hands the command
    /// back.
    fn send(&mut self, command: C) -> Result<(), C>;
}

impl<C> CommandSink<C> for HeapProd<C> {
    fn send(&mut self, command: C) -> Result<(), C> {
        self.try_push(command)
    }
}
