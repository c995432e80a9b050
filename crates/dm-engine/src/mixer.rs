//! Render-side mix graph.

use std::sync::Arc;

use dm_core::DeckId;
use ringbuf::traits::{Consumer, Producer};
use ringbuf::{HeapCons, HeapProd};

use crate::clock::{AudioClock, FrameClock};
use crate::command::DeckCommand;
use crate::frame::Frame;
use crate::params::BusParams;
use crate::strip::ChannelStrip;

/// Frames per processing block. Commands and parameter changes are applied
/// between blocks.
pub const RENDER_QUANTUM: usize = 128;

/// The audio graph: two channel strips, crossfade sends, master gain and
/// the analysis tap.
///
/// Owned by whichever thread produces audio. It only reads its queues and
/// atomics and never blocks.
pub struct Mixer {
    sample_rate: u32,
    strips: [ChannelStrip; 2],
    bus: Arc<BusParams>,
    sends: [f32; 2],
    master_gain: f32,
    deck_rx: [HeapCons<DeckCommand>; 2],
    tap: HeapProd<f32>,
    clock: FrameClock,
    /// Frames rendered in the current block.
    block_pos: usize,
    /// Frames rendered but not yet added to `clock`.
    unpublished: u64,
}

impl Mixer {
    pub(crate) fn new(
        sample_rate: u32,
        strips: [ChannelStrip; 2],
        bus: Arc<BusParams>,
        deck_rx: [HeapCons<DeckCommand>; 2],
        tap: HeapProd<f32>,
        clock: FrameClock,
    ) -> Self {
        let (a, b) = bus.sends();
        let master_gain = bus.master();
        Self {
            sample_rate,
            strips,
            bus,
            sends: [a, b],
            master_gain,
            deck_rx,
            tap,
            clock,
            block_pos: 0,
            unpublished: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The clock this mixer advances.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn strip(&self, deck: DeckId) -> &ChannelStrip {
        &self.strips[deck.index()]
    }

    /// Current `(send A, send B)`.
    pub fn sends(&self) -> (f32, f32) {
        (self.sends[0], self.sends[1])
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Render mono master samples into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.render_into(out));
        #[cfg(not(feature = "alloc_check"))]
        self.render_into(out);
    }

    fn render_into(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
        self.publish();
    }

    /// Generate one frame of audio.
    pub fn render_frame(&mut self) -> Frame {
        let frame = Frame::from_sample(self.next_sample());
        self.publish();
        frame
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        if self.block_pos == 0 {
            self.publish();
            self.begin_block();
        }

        let a = self.strips[0].next_sample();
        let b = self.strips[1].next_sample();
        let mix = a * self.sends[0] + b * self.sends[1];
        // Tap drops samples while the analyser is not reading.
        let _ = self.tap.try_push(mix);

        self.unpublished += 1;
        self.block_pos += 1;
        if self.block_pos == RENDER_QUANTUM {
            self.block_pos = 0;
        }
        mix * self.master_gain
    }

    /// Make every rendered frame visible on the clock.
    fn publish(&mut self) {
        if self.unpublished > 0 {
            self.clock.advance(self.unpublished);
            self.unpublished = 0;
        }
    }

    fn begin_block(&mut self) {
        let now = self.clock.now();
        for (strip, rx) in self.strips.iter_mut().zip(self.deck_rx.iter_mut()) {
            // Rate first, so a Start in this block leads at the new rate.
            strip.sync();
            while let Some(command) = rx.try_pop() {
                strip.apply(command, now);
            }
        }
        let (a, b) = self.bus.sends();
        self.sends = [a, b];
        self.master_gain = self.bus.master();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MixBus;
    use crate::graph::build_graph;
    use basedrop::Shared;
    use dm_core::AudioBuffer;
    use ringbuf::traits::Observer;

    fn dc(level: f32, sample_rate: u32) -> AudioBuffer {
        AudioBuffer::from_samples(sample_rate, vec![level; sample_rate as usize])
    }

    #[test]
    fn silent_graph_renders_zeros_and_advances_clock() {
        let (endpoints, mut mixer) = build_graph(1000);
        let mut out = [1.0f32; 300];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(endpoints.clock.frames(), 300);
        assert_eq!(mixer.clock().frames(), 300);

        mixer.render_frame();
        assert_eq!(endpoints.clock.frames(), 301);
    }

    #[test]
    fn parameters_land_on_block_boundaries() {
        let (endpoints, mut mixer) = build_graph(1000);
        mixer.render(&mut [0.0; 10]);

        endpoints.decks[0].params.set_gain(0.5);
        mixer.render(&mut [0.0; 100]);
        assert_eq!(mixer.strip(DeckId::A).gain(), crate::strip::DEFAULT_CHANNEL_GAIN);

        mixer.render(&mut [0.0; 18]);
        mixer.render(&mut [0.0; 1]);
        assert_eq!(mixer.strip(DeckId::A).gain(), 0.5);
    }

    #[test]
    fn start_mid_block_is_advanced_to_the_clock() {
        let (mut endpoints, mut mixer) = build_graph(1000);
        mixer.render(&mut [0.0; 100]);
        let buffer = Shared::new(&endpoints.gc.handle(), dc(0.5, 1000));
        let at = endpoints.clock.now();
        assert!(endpoints.decks[0]
            .commands
            .try_push(DeckCommand::Start { buffer, offset: 0.0, at })
            .is_ok());

        // The voice starts on frame 128 but is 28 frames in.
        mixer.render(&mut [0.0; 29]);
        let position = mixer.strip(DeckId::A).voice_position().unwrap();
        assert!((position - 0.029).abs() < 1e-9, "got {}", position);
    }

    #[test]
    fn crossfade_and_master_scale_the_mix() {
        let (mut endpoints, mut mixer) = build_graph(1000);
        endpoints.decks[0].params.set_gain(1.0);
        let buffer = Shared::new(&endpoints.gc.handle(), dc(0.5, 1000));
        assert!(endpoints.decks[0]
            .commands
            .try_push(DeckCommand::Start { buffer, offset: 0.0, at: 0.0 })
            .is_ok());
        let mut bus = MixBus::new(endpoints.bus.clone());
        bus.set_crossfade(0.0);
        bus.set_master_volume(0.5);

        let mut out = [0.0f32; 256];
        mixer.render(&mut out);
        assert_eq!(mixer.sends().0, 1.0);
        assert_eq!(mixer.master_gain(), 0.5);
        assert!((out[200] - 0.25).abs() < 1e-3, "got {}", out[200]);
    }

    #[test]
    fn deck_b_is_muted_at_full_a() {
        let (mut endpoints, mut mixer) = build_graph(1000);
        let buffer = Shared::new(&endpoints.gc.handle(), dc(0.5, 1000));
        assert!(endpoints.decks[1]
            .commands
            .try_push(DeckCommand::Start { buffer, offset: 0.0, at: 0.0 })
            .is_ok());
        endpoints.bus.set_sends(1.0, 0.0);
        let mut out = [0.0f32; 256];
        mixer.render(&mut out);
        assert!(out.iter().all(|s| s.abs() < 1e-6));
        assert!(mixer.strip(DeckId::B).has_voice());
    }

    #[test]
    fn tap_sees_pre_master_mix() {
        let (mut endpoints, mut mixer) = build_graph(1000);
        endpoints.decks[0].params.set_gain(1.0);
        let buffer = Shared::new(&endpoints.gc.handle(), dc(0.5, 1000));
        assert!(endpoints.decks[0]
            .commands
            .try_push(DeckCommand::Start { buffer, offset: 0.0, at: 0.0 })
            .is_ok());
        endpoints.bus.set_sends(1.0, 0.0);
        endpoints.bus.set_master(0.0);

        let mut out = [0.0f32; 256];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(endpoints.tap.occupied_len(), 256);
        let tapped: Vec<f32> = endpoints.tap.pop_iter().collect();
        assert!((tapped[200] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn render_frame_converts_to_stereo_pcm() {
        let (mut endpoints, mut mixer) = build_graph(1000);
        endpoints.decks[0].params.set_gain(1.0);
        let buffer = Shared::new(&endpoints.gc.handle(), dc(1.0, 1000));
        assert!(endpoints.decks[0]
            .commands
            .try_push(DeckCommand::Start { buffer, offset: 0.0, at: 0.0 })
            .is_ok());
        endpoints.bus.set_sends(1.0, 0.0);
        endpoints.bus.set_master(1.0);

        let frames: Vec<Frame> = (0..200).map(|_| mixer.render_frame()).collect();
        let last = frames[199];
        assert_eq!(last.left, last.right);
        assert!(last.left > 32000, "got {}", last.left);
    }
}
