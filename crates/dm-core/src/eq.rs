//! Three-band equalizer layout.
//!
//! Band order is fixed: low shelf, mid peak, high shelf. The signal runs
//! through the bands in that order after the channel gain.

use core::str::FromStr;

/// Low shelf corner frequency in Hz.
pub const EQ_LOW_HZ: f32 = 320.0;

/// Mid peak center frequency in Hz.
pub const EQ_MID_HZ: f32 = 1000.0;

/// Mid peak quality factor.
pub const EQ_MID_Q: f32 = 0.5;

/// High shelf corner frequency in Hz.
pub const EQ_HIGH_HZ: f32 = 3200.0;

/// One band of a deck's equalizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EqBand {
    Low,
    Mid,
    High,
}

/// Biquad response used by a band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterShape {
    LowShelf,
    Peaking { q: f32 },
    HighShelf,
}

impl EqBand {
    /// All bands in signal order.
    pub const ALL: [EqBand; 3] = [EqBand::Low, EqBand::Mid, EqBand::High];

    /// Position in the signal chain.
    pub const fn index(self) -> usize {
        match self {
            EqBand::Low => 0,
            EqBand::Mid => 1,
            EqBand::High => 2,
        }
    }

    /// Corner or center frequency in Hz.
    pub const fn frequency(self) -> f32 {
        match self {
            EqBand::Low => EQ_LOW_HZ,
            EqBand::Mid => EQ_MID_HZ,
            EqBand::High => EQ_HIGH_HZ,
        }
    }

    pub const fn shape(self) -> FilterShape {
        match self {
            EqBand::Low => FilterShape::LowShelf,
            EqBand::Mid => FilterShape::Peaking { q: EQ_MID_Q },
            EqBand::High => FilterShape::HighShelf,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EqBand::Low => "low",
            EqBand::Mid => "mid",
            EqBand::High => "high",
        }
    }
}

/// Returned when a band name is not `low`, `mid` or `high`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown EQ band")]
pub struct ParseEqBandError;

impl FromStr for EqBand {
    type Err = ParseEqBandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(EqBand::Low),
            "mid" => Ok(EqBand::Mid),
            "high" => Ok(EqBand::High),
            _ => Err(ParseEqBandError),
        }
    }
}
