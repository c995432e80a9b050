//! Frequency analysis of the pre-master mix for spectrum displays.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

/// Analysis window length in samples.
pub const FFT_SIZE: usize = 256;
/// Magnitude bins per snapshot.
pub const BIN_COUNT: usize = FFT_SIZE / 2;
/// Weight of the previous magnitude when smoothing over time.
pub const SMOOTHING: f32 = 0.8;
/// Level mapped to byte 0.
pub const MIN_DB: f32 = -100.0;
/// Level mapped to byte 255.
pub const MAX_DB: f32 = -30.0;

/// One frame of spectrum data, lowest frequency first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    bins: [u8; BIN_COUNT],
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            bins: [0; BIN_COUNT],
        }
    }
}

impl Snapshot {
    pub fn bins(&self) -> &[u8; BIN_COUNT] {
        &self.bins
    }

    /// Average consecutive bins down to `count` bars.
    ///
    /// Each bar covers `BIN_COUNT / count` bins (at least one). Bars past
    /// the last bin read as 0.
    pub fn bars(&self, count: usize) -> Vec<u8> {
        let step = (BIN_COUNT / count.max(1)).max(1);
        (0..count)
            .map(|i| {
                let start = (i * step).min(BIN_COUNT);
                let end = (start + step).min(BIN_COUNT);
                let slice = &self.bins[start..end];
                if slice.is_empty() {
                    0
                } else {
                    let sum: u32 = slice.iter().map(|&b| b as u32).sum();
                    (sum / slice.len() as u32) as u8
                }
            })
            .collect()
    }

    /// Highest bin value.
    pub fn peak(&self) -> u8 {
        self.bins.iter().copied().max().unwrap_or(0)
    }
}

/// Pulls mix samples from the analysis tap and turns them into snapshots.
pub struct Analyser {
    tap: HeapCons<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
    /// Most recent `FFT_SIZE` samples, oldest at `write_pos`.
    history: Vec<f32>,
    write_pos: usize,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: [f32; BIN_COUNT],
    snapshot: Snapshot,
}

impl Analyser {
    pub fn new(tap: HeapCons<f32>) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Self {
            tap,
            fft,
            history: vec![0.0; FFT_SIZE],
            write_pos: 0,
            window: blackman(FFT_SIZE),
            input: vec![0.0; FFT_SIZE],
            spectrum,
            scratch,
            smoothed: [0.0; BIN_COUNT],
            snapshot: Snapshot::default(),
        }
    }

    /// Analyse the latest window of audio and return the new snapshot.
    pub fn snapshot(&mut self) -> &Snapshot {
        for sample in self.tap.pop_iter() {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        }

        for (i, (out, &w)) in self.input.iter_mut().zip(&self.window).enumerate() {
            *out = self.history[(self.write_pos + i) % FFT_SIZE] * w;
        }

        if let Err(err) = self
            .fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
        {
            log::warn!("spectrum analysis failed: {}", err);
            return &self.snapshot;
        }

        let scale = 1.0 / FFT_SIZE as f32;
        let range = MAX_DB - MIN_DB;
        for (i, bin) in self.spectrum.iter().take(BIN_COUNT).enumerate() {
            let magnitude = bin.norm_sqr().sqrt() * scale;
            let smoothed = SMOOTHING * self.smoothed[i] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[i] = if smoothed.is_finite() { smoothed } else { 0.0 };

            let db = 20.0 * self.smoothed[i].log10();
            let scaled = 255.0 * (db - MIN_DB) / range;
            // -inf dB from silence lands on 0 here.
            self.snapshot.bins[i] = scaled.clamp(0.0, 255.0) as u8;
        }
        &self.snapshot
    }

    /// The last snapshot produced, without pulling new audio.
    pub fn latest(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn blackman(len: usize) -> Vec<f32> {
    const ALPHA: f64 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..len)
        .map(|i| {
            let x = i as f64 / len as f64;
            let tau = std::f64::consts::TAU;
            (a0 - a1 * (tau * x).cos() + a2 * (2.0 * tau * x).cos()) as f32
        })
        .collect()
}
