//! Graph construction.
//!
//! The topology is fixed when the graph is built. Afterwards the control
//! side changes parameters through the shared atomics and drives transport
//! through the command queues returned here.

use std::sync::Arc;

use basedrop::Collector;
use ringbuf::traits::Split;
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::analyser::FFT_SIZE;
use crate::clock::FrameClock;
use crate::command::DeckCommand;
use crate::mixer::Mixer;
use crate::params::{BusParams, DeckParams};
use crate::strip::ChannelStrip;

/// Capacity of each deck's transport queue.
pub const COMMAND_QUEUE_CAPACITY: usize = 1024;

/// Control-side connection to one channel strip.
pub struct DeckEndpoint {
    pub commands: HeapProd<DeckCommand>,
    pub params: Arc<DeckParams>,
}

/// Control-side ends of a freshly built graph.
pub struct GraphEndpoints {
    /// Deck A and deck B.
    pub decks: [DeckEndpoint; 2],
    pub bus: Arc<BusParams>,
    /// Pre-master mix samples for the analyser.
    pub tap: HeapCons<f32>,
    /// Frames rendered by the mixer.
    pub clock: FrameClock,
    /// Frees buffers the mixer has let go of. Must outlive the mixer's
    /// voices; call [`Collector::collect`] from a non-audio thread.
    pub gc: Collector,
}

/// Build the mix graph for output at `sample_rate` Hz.
pub fn build_graph(sample_rate: u32) -> (GraphEndpoints, Mixer) {
    let (deck_a_tx, deck_a_rx) = HeapRb::<DeckCommand>::new(COMMAND_QUEUE_CAPACITY).split();
    let (deck_b_tx, deck_b_rx) = HeapRb::<DeckCommand>::new(COMMAND_QUEUE_CAPACITY).split();
    let params_a = Arc::new(DeckParams::new());
    let params_b = Arc::new(DeckParams::new());
    let bus = Arc::new(BusParams::new());

    // About 100 ms of tap history, never less than one analysis window.
    let tap_capacity = (sample_rate as usize / 10).max(FFT_SIZE);
    let (tap_tx, tap_rx) = HeapRb::<f32>::new(tap_capacity).split();

    let clock = FrameClock::new(sample_rate);
    let mixer = Mixer::new(
        sample_rate,
        [
            ChannelStrip::new(sample_rate, params_a.clone()),
            ChannelStrip::new(sample_rate, params_b.clone()),
        ],
        bus.clone(),
        [deck_a_rx, deck_b_rx],
        tap_tx,
        clock.clone(),
    );

    let endpoints = GraphEndpoints {
        decks: [
            DeckEndpoint {
                commands: deck_a_tx,
                params: params_a,
            },
            DeckEndpoint {
                commands: deck_b_tx,
                params: params_b,
            },
        ],
        bus,
        tap: tap_rx,
        clock,
        gc: Collector::new(),
    };
    (endpoints, mixer)
}
