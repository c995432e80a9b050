//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Quantize a mono float sample, clamping to [-1, 1].
    pub fn from_sample(sample: f32) -> Self {
        Self::mono((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
    }

    /// Left channel as a float in [-1, 1].
    pub fn left_f32(self) -> f32 {
        self.left as f32 / 32768.0
    }

    /// Right channel as a float in [-1, 1].
    pub fn right_f32(self) -> f32 {
        self.right as f32 / 32768.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sample_duplicates_mono() {
        let f = Frame::from_sample(0.5);
        assert_eq!(f.left, f.right);
        assert_eq!(f.left, 16383);
    }

    #[test]
    fn from_sample_clamps() {
        assert_eq!(Frame::from_sample(4.0), Frame::mono(32767));
        assert_eq!(Frame::from_sample(-4.0), Frame::mono(-32767));
        assert_eq!(Frame::from_sample(0.0), Frame::silence());
    }
}
