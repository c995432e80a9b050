//! Closed-form loop generators.
//!
//! Each loop splits its length into equal slots. A slot starts at
//! `floor(slot * slot_len)`; writes that run past the end of the buffer are
//! dropped and later slots overwrite any overlap with earlier ones.

use alloc::vec;
use alloc::vec::Vec;
use core::f64::consts::{PI, TAU};

use dm_core::AudioBuffer;

use crate::loop_kind::LoopKind;
use crate::noise::NoiseSource;

const PULSE_BEATS: usize = 4;
const PULSE_HIT_SECONDS: f64 = 0.15;
const PULSE_START_HZ: f64 = 150.0;
const PULSE_SWEEP_RATE: f64 = 30.0;
const PULSE_DECAY_RATE: f64 = 15.0;
const PULSE_LEVEL: f64 = 0.8;

/// A1, A1, D2, E2.
pub const BASS_NOTES: [f64; 4] = [55.0, 55.0, 73.42, 82.41];
const BASS_DECAY_RATE: f64 = 2.0;
const BASS_ATTACK_RATE: f64 = 50.0;
const BASS_LEVEL: f64 = 0.4;

const HAT_HITS: usize = 8;
const HAT_HIT_SECONDS: f64 = 0.05;
const HAT_DECAY_RATE: f64 = 80.0;
const HAT_LEVEL: f64 = 0.3;

/// C4, E4, G4, E4.
pub const PAD_NOTES: [f64; 4] = [261.63, 329.63, 392.00, 329.63];
const PAD_PARTIALS: u32 = 8;
const PAD_LEVEL: f64 = 0.2;

/// Buffer length for a loop: `floor(sample_rate * duration)`.
pub fn frame_count(sample_rate: u32, duration: f64) -> usize {
    (sample_rate as f64 * duration).max(0.0) as usize
}

fn slot_start(slot: usize, slot_len: f64) -> usize {
    libm::floor(slot as f64 * slot_len) as usize
}

fn write(data: &mut [f32], index: usize, value: f64) {
    if let Some(s) = data.get_mut(index) {
        *s = value as f32;
    }
}

/// Render one loop, drawing hat noise from `noise`.
pub fn synthesize_with<N: NoiseSource + ?Sized>(
    kind: LoopKind,
    sample_rate: u32,
    duration: f64,
    noise: &mut N,
) -> AudioBuffer {
    match kind {
        LoopKind::Pulse => pulse(sample_rate, duration),
        LoopKind::Bass => bass_line(sample_rate, duration),
        LoopKind::Hat => noise_hits(sample_rate, duration, noise),
        LoopKind::Pad => harmonic_pad(sample_rate, duration),
    }
}

/// Render one loop using the thread-local random generator for hat noise.
#[cfg(feature = "std")]
pub fn synthesize(kind: LoopKind, sample_rate: u32, duration: f64) -> AudioBuffer {
    let mut noise = crate::noise::RngNoise(rand::thread_rng());
    synthesize_with(kind, sample_rate, duration, &mut noise)
}

/// Four kick pulses: a sine whose pitch falls exponentially from 150 Hz,
/// under a fast exponential decay, for the first 150 ms of each beat.
pub fn pulse(sample_rate: u32, duration: f64) -> AudioBuffer {
    let sr = sample_rate as f64;
    let len = frame_count(sample_rate, duration);
    let mut data = vec![0.0f32; len];

    let beat_len = len as f64 / PULSE_BEATS as f64;
    let hit_len = libm::floor(sr * PULSE_HIT_SECONDS) as usize;

    for beat in 0..PULSE_BEATS {
        let start = slot_start(beat, beat_len);
        for i in 0..hit_len {
            let t = i as f64 / sr;
            let freq = PULSE_START_HZ * libm::exp(-t * PULSE_SWEEP_RATE);
            let amp = libm::exp(-t * PULSE_DECAY_RATE);
            write(&mut data, start + i, libm::sin(TAU * freq * t) * amp * PULSE_LEVEL);
        }
    }
    AudioBuffer::from_samples(sample_rate, data)
}

/// Four bass notes, each a fundamental plus half-level second harmonic
/// under an attack/decay envelope.
pub fn bass_line(sample_rate: u32, duration: f64) -> AudioBuffer {
    let sr = sample_rate as f64;
    let len = frame_count(sample_rate, duration);
    let mut data = vec![0.0f32; len];

    let note_len = len as f64 / BASS_NOTES.len() as f64;
    let note_frames = libm::ceil(note_len) as usize;

    for (n, &freq) in BASS_NOTES.iter().enumerate() {
        let start = slot_start(n, note_len);
        for i in 0..note_frames {
            let t = i as f64 / sr;
            let env = libm::exp(-t * BASS_DECAY_RATE) * (1.0 - libm::exp(-t * BASS_ATTACK_RATE));
            let wave = libm::sin(TAU * freq * t) + 0.5 * libm::sin(2.0 * TAU * freq * t);
            write(&mut data, start + i, wave * env * BASS_LEVEL);
        }
    }
    AudioBuffer::from_samples(sample_rate, data)
}

/// Eight 50 ms bursts of white noise with a steep exponential decay.
pub fn noise_hits<N: NoiseSource + ?Sized>(
    sample_rate: u32,
    duration: f64,
    noise: &mut N,
) -> AudioBuffer {
    let sr = sample_rate as f64;
    let len = frame_count(sample_rate, duration);
    let mut data = vec![0.0f32; len];

    let hit_slot = len as f64 / HAT_HITS as f64;
    let hit_len = libm::floor(sr * HAT_HIT_SECONDS) as usize;

    for hit in 0..HAT_HITS {
        let start = slot_start(hit, hit_slot);
        for i in 0..hit_len {
            let t = i as f64 / sr;
            let env = libm::exp(-t * HAT_DECAY_RATE);
            write(&mut data, start + i, noise.next_sample() as f64 * env * HAT_LEVEL);
        }
    }
    AudioBuffer::from_samples(sample_rate, data)
}

/// Four pad notes, each eight harmonics at 1/h level under a half-sine
/// swell across the note.
pub fn harmonic_pad(sample_rate: u32, duration: f64) -> AudioBuffer {
    let sr = sample_rate as f64;
    let len = frame_count(sample_rate, duration);
    let mut data: Vec<f32> = vec![0.0; len];

    let note_len = len as f64 / PAD_NOTES.len() as f64;
    let note_frames = libm::ceil(note_len) as usize;

    for (n, &freq) in PAD_NOTES.iter().enumerate() {
        let start = slot_start(n, note_len);
        for i in 0..note_frames {
            let t = i as f64 / sr;
            let env = libm::sin(i as f64 / note_len * PI);
            let wave: f64 = (1..=PAD_PARTIALS)
                .map(|h| libm::sin(TAU * freq * h as f64 * t) / h as f64)
                .sum();
            write(&mut data, start + i, wave * env * PAD_LEVEL);
        }
    }
    AudioBuffer::from_samples(sample_rate, data)
}
