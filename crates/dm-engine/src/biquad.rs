//! Biquad filters for the three-band channel EQ.
//!
//! Coefficients follow the RBJ audio EQ cookbook with shelf slope 1.

use std::f32::consts::{PI, SQRT_2};

use dm_core::{EqBand, FilterShape};

/// Normalized biquad coefficients (`a0` divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Low shelf: boost/cut below `freq`.
    pub fn low_shelf(freq: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = 10.0_f32.powf(gain_db / 40.0);
        let (cos_w0, sin_w0) = angular(freq, sample_rate);
        let alpha = sin_w0 / 2.0 * SQRT_2;
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let a0 = (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
        Self {
            b0: (a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha)) / a0,
            b1: (2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0)) / a0,
            b2: (a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha)) / a0,
            a1: (-2.0 * ((a - 1.0) + (a + 1.0) * cos_w0)) / a0,
            a2: ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha) / a0,
        }
    }

    /// Peaking: boost/cut a band around `freq`.
    pub fn peaking(freq: f32, gain_db: f32, q: f32, sample_rate: f32) -> Self {
        let a = 10.0_f32.powf(gain_db / 40.0);
        let (cos_w0, sin_w0) = angular(freq, sample_rate);
        let alpha = sin_w0 / (2.0 * q.max(1e-4));

        let a0 = 1.0 + alpha / a;
        Self {
            b0: (1.0 + alpha * a) / a0,
            b1: (-2.0 * cos_w0) / a0,
            b2: (1.0 - alpha * a) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha / a) / a0,
        }
    }

    /// High shelf: boost/cut above `freq`.
    pub fn high_shelf(freq: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = 10.0_f32.powf(gain_db / 40.0);
        let (cos_w0, sin_w0) = angular(freq, sample_rate);
        let alpha = sin_w0 / 2.0 * SQRT_2;
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let a0 = (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
        Self {
            b0: (a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha)) / a0,
            b1: (-2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0)) / a0,
            b2: (a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha)) / a0,
            a1: (2.0 * ((a - 1.0) - (a + 1.0) * cos_w0)) / a0,
            a2: ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha) / a0,
        }
    }

    /// Coefficients for one EQ band at `gain_db`.
    pub fn for_band(band: EqBand, gain_db: f32, sample_rate: f32) -> Self {
        let freq = band.frequency();
        match band.shape() {
            FilterShape::LowShelf => Self::low_shelf(freq, gain_db, sample_rate),
            FilterShape::Peaking { q } => Self::peaking(freq, gain_db, q, sample_rate),
            FilterShape::HighShelf => Self::high_shelf(freq, gain_db, sample_rate),
        }
    }
}

/// `(cos w0, sin w0)`, with the frequency held below Nyquist.
fn angular(freq: f32, sample_rate: f32) -> (f32, f32) {
    let freq = freq.clamp(1.0, sample_rate * 0.49);
    let w0 = 2.0 * PI * freq / sample_rate;
    (w0.cos(), w0.sin())
}

/// Direct form I biquad with mono state.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, x1: 0.0, x2: 0.0, y1: 0.0, y2: 0.0 }
    }

    /// Swap coefficients, keeping the filter history.
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Low shelf → mid peak → high shelf.
#[derive(Debug, Clone)]
pub struct Equalizer {
    bands: [Biquad; 3],
    gains_db: [f32; 3],
    sample_rate: f32,
}

impl Equalizer {
    /// A flat equalizer (all bands at 0 dB).
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            bands: EqBand::ALL.map(|band| Biquad::new(BiquadCoeffs::for_band(band, 0.0, sample_rate))),
            gains_db: [0.0; 3],
            sample_rate,
        }
    }

    pub fn set_gain(&mut self, band: EqBand, gain_db: f32) {
        self.gains_db[band.index()] = gain_db;
        self.bands[band.index()].set_coeffs(BiquadCoeffs::for_band(band, gain_db, self.sample_rate));
    }

    pub fn gain(&self, band: EqBand) -> f32 {
        self.gains_db[band.index()]
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let low = self.bands[0].process(x);
        let mid = self.bands[1].process(low);
        self.bands[2].process(mid)
    }
}
