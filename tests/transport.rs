//! Transport behaviour of a deck driven by a scripted clock, and by the
//! mixer's own frame clock.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use basedrop::Collector;
use dm_core::{AudioBuffer, DeckId, EqBand};
use dm_engine::{
    build_graph, Deck, DeckCommand, DeckParams, GraphEndpoints, ManualClock, Mixer, RENDER_QUANTUM,
};
use dm_synth::pulse;
use ringbuf::traits::Split;
use ringbuf::HeapRb;

fn scripted_deck() -> (Deck, ManualClock, Collector) {
    let clock = ManualClock::new();
    let gc = Collector::new();
    let (tx, _rx) = HeapRb::<DeckCommand>::new(64).split();
    let deck = Deck::with_link(
        DeckId::A,
        Arc::new(clock.clone()),
        Arc::new(DeckParams::new()),
        tx,
        gc.handle(),
    );
    (deck, clock, gc)
}

/// A deck wired to a real mixer at 1 kHz.
struct Live {
    deck: Deck,
    mixer: Mixer,
    _gc: Collector,
}

impl Live {
    fn new(id: DeckId) -> Self {
        let (endpoints, mixer) = build_graph(1000);
        let GraphEndpoints {
            decks: [a, b],
            clock,
            gc,
            ..
        } = endpoints;
        let endpoint = match id {
            DeckId::A => a,
            DeckId::B => b,
        };
        let deck = Deck::new(id, Arc::new(clock), endpoint, gc.handle());
        Self {
            deck,
            mixer,
            _gc: gc,
        }
    }

    fn render(&mut self, frames: usize) {
        let mut block = [0.0f32; RENDER_QUANTUM];
        let mut remaining = frames;
        while remaining > 0 {
            let n = remaining.min(RENDER_QUANTUM);
            self.mixer.render(&mut block[..n]);
            remaining -= n;
        }
    }

    fn has_voice(&self) -> bool {
        self.mixer.strip(self.deck.id()).has_voice()
    }

    fn voice_position(&self) -> f64 {
        self.mixer.strip(self.deck.id()).voice_position().unwrap()
    }
}

#[test]
fn pulse_loop_pause_resume_scenario() {
    let buffer = pulse(44100, 1.0);
    assert_eq!(buffer.frames(), 44100);

    let (mut deck, clock, _gc) = scripted_deck();
    deck.load_buffer(buffer);
    deck.play();

    clock.advance(0.5);
    assert_abs_diff_eq!(deck.position(), 0.5, epsilon = 1e-9);

    deck.pause();
    assert_abs_diff_eq!(deck.pause_offset(), 0.5, epsilon = 1e-9);

    deck.play();
    clock.advance(0.7);
    assert_abs_diff_eq!(deck.position(), 0.2, epsilon = 1e-9);
}

#[test]
fn position_never_reaches_duration() {
    let (mut deck, clock, _gc) = scripted_deck();
    deck.load_buffer(AudioBuffer::from_samples(100, vec![0.0; 150]));
    deck.play();
    for _ in 0..1000 {
        clock.advance(0.0137);
        let pos = deck.position();
        assert!(pos >= 0.0 && pos < 1.5, "position {}", pos);
    }
}

#[test]
fn frame_clock_drives_position() {
    let mut live = Live::new(DeckId::A);
    live.deck.load_buffer(AudioBuffer::from_samples(1000, vec![0.1; 1000]));
    live.deck.play();

    live.render(512);
    // 512 frames at 1 kHz.
    assert_abs_diff_eq!(live.deck.position(), 0.512, epsilon = 1e-9);
    assert!(live.has_voice());

    // The render-side voice agrees with the control-side position.
    assert_abs_diff_eq!(live.voice_position(), 0.512, epsilon = 1e-6);

    live.deck.pause();
    live.render(512);
    assert!(!live.has_voice());
    assert_abs_diff_eq!(live.deck.position(), 0.512, epsilon = 1e-9);
}

#[test]
fn play_between_block_boundaries_stays_in_step() {
    let mut live = Live::new(DeckId::A);
    live.deck.load_buffer(AudioBuffer::from_samples(1000, vec![0.1; 1000]));

    live.render(100);
    live.deck.play();
    live.render(412);

    assert_abs_diff_eq!(live.deck.position(), 0.412, epsilon = 1e-9);
    assert_abs_diff_eq!(live.voice_position(), 0.412, epsilon = 1e-6);
}

#[test]
fn pitch_change_keeps_render_and_control_in_step() {
    let mut live = Live::new(DeckId::B);
    live.deck.load_buffer(AudioBuffer::from_samples(1000, vec![0.1; 4000]));
    live.deck.play();

    live.render(RENDER_QUANTUM);
    live.deck.set_pitch(1200.0);
    live.render(3 * RENDER_QUANTUM);

    let expected = 0.128 + 3.0 * 0.128 * 2.0;
    assert_abs_diff_eq!(live.deck.position(), expected, epsilon = 1e-9);
    assert_abs_diff_eq!(live.voice_position(), expected, epsilon = 1e-6);
}

#[test]
fn stop_lands_after_a_burst_of_parameter_changes() {
    let mut live = Live::new(DeckId::A);
    live.deck.load_buffer(AudioBuffer::from_samples(1000, vec![0.1; 1000]));
    live.deck.play();
    live.render(RENDER_QUANTUM);

    for i in 0..80 {
        live.deck.set_eq(EqBand::Low, -(i as f32) * 0.1);
        live.deck.set_volume(i as f32 / 80.0);
        live.deck.set_pitch_percent(i as f64 / 10.0);
    }
    live.deck.stop();
    assert!(!live.deck.is_playing());

    live.render(20 * RENDER_QUANTUM);
    assert!(!live.has_voice());
    // The latest parameter values still arrive.
    let strip = live.mixer.strip(DeckId::A);
    assert_eq!(strip.eq_gain(EqBand::Low), live.deck.eq(EqBand::Low));
    assert_eq!(strip.gain(), live.deck.volume());
}

#[test]
fn transport_state_survives_a_full_queue() {
    let mut live = Live::new(DeckId::A);
    live.deck.load_buffer(AudioBuffer::from_samples(1000, vec![0.1; 1000]));

    // Far more toggles than the queue holds, with nothing draining it.
    for _ in 0..2000 {
        live.deck.toggle();
    }
    live.render(RENDER_QUANTUM);
    assert_eq!(live.deck.is_playing(), live.has_voice());

    live.deck.toggle();
    live.render(RENDER_QUANTUM);
    assert_eq!(live.deck.is_playing(), live.has_voice());
}
