//! Immutable mono sample buffer shared between the loop bank and the decks.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

/// An immutable, reference-counted mono audio buffer.
///
/// Cloning is cheap: clones share the same sample data, so the same loop can
/// sit on both decks (and in the bank) without copying.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    data: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap mono sample data recorded at `sample_rate` Hz.
    ///
    /// Panics if `sample_rate` is zero.
    pub fn from_samples(sample_rate: u32, samples: Vec<f32>) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            data: samples.into(),
            sample_rate,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels. Always 1.
    pub fn channels(&self) -> u16 {
        1
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate as f64
    }

    /// Read-only access to the sample data.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// True if both handles point at the same sample data.
    pub fn ptr_eq(&self, other: &AudioBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Per-column `(min, max)` overview for waveform drawing.
    ///
    /// Each column covers `ceil(frames / columns)` samples. Columns past the
    /// end of the data keep the empty sentinel `(1.0, -1.0)`.
    pub fn peaks(&self, columns: usize) -> Vec<(f32, f32)> {
        if columns == 0 {
            return Vec::new();
        }
        let mut peaks = vec![(1.0f32, -1.0f32); columns];
        let step = self.data.len().div_ceil(columns);
        for (col, peak) in peaks.iter_mut().enumerate() {
            let start = (col * step).min(self.data.len());
            let end = (start + step).min(self.data.len());
            for &s in &self.data[start..end] {
                peak.0 = peak.0.min(s);
                peak.1 = peak.1.max(s);
            }
        }
        peaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_frames_and_rate() {
        let buf = AudioBuffer::from_samples(100, vec![0.0; 250]);
        assert_eq!(buf.frames(), 250);
        assert_eq!(buf.channels(), 1);
        assert!((buf.duration() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn clones_share_data() {
        let a = AudioBuffer::from_samples(8000, vec![0.5; 4]);
        let b = a.clone();
        let c = AudioBuffer::from_samples(8000, vec![0.5; 4]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn peaks_track_min_and_max_per_column() {
        let buf = AudioBuffer::from_samples(10, vec![0.1, -0.4, 0.9, 0.2, -0.2, 0.3]);
        let peaks = buf.peaks(3);
        assert_eq!(peaks, vec![(-0.4, 0.1), (0.2, 0.9), (-0.2, 0.3)]);
    }

    #[test]
    fn peaks_step_rounds_up() {
        // 5 samples over 2 columns: step 3, second column gets the last 2.
        let buf = AudioBuffer::from_samples(10, vec![0.0, 0.1, 0.2, 0.3, 0.4]);
        let peaks = buf.peaks(2);
        assert_eq!(peaks[0], (0.0, 0.2));
        assert_eq!(peaks[1], (0.3, 0.4));
    }

    #[test]
    fn peaks_past_end_keep_sentinel() {
        let buf = AudioBuffer::from_samples(10, vec![0.5, 0.5]);
        let peaks = buf.peaks(4);
        assert_eq!(peaks[0], (0.5, 0.5));
        assert_eq!(peaks[3], (1.0, -1.0));
    }

    #[test]
    fn peaks_zero_columns_is_empty() {
        let buf = AudioBuffer::from_samples(10, vec![0.5; 8]);
        assert!(buf.peaks(0).is_empty());
    }

    #[test]
    #[should_panic]
    fn zero_sample_rate_panics() {
        let _ = AudioBuffer::from_samples(0, Vec::new());
    }
}
