//! The four built-in loops.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

/// Which procedural loop to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Four-on-the-floor kick: pitch-swept sine pulses.
    Pulse,
    /// A1-A1-D2-E2 bass line.
    Bass,
    /// Eight noise hats.
    Hat,
    /// C-E-G-E harmonic pad.
    Pad,
}

impl LoopKind {
    /// All loops in bank order.
    pub const ALL: [LoopKind; 4] = [LoopKind::Pulse, LoopKind::Bass, LoopKind::Hat, LoopKind::Pad];

    /// Bank slot index.
    pub const fn index(self) -> usize {
        match self {
            LoopKind::Pulse => 0,
            LoopKind::Bass => 1,
            LoopKind::Hat => 2,
            LoopKind::Pad => 3,
        }
    }

    /// Name used on the command line and in track selectors.
    pub const fn name(self) -> &'static str {
        match self {
            LoopKind::Pulse => "kick",
            LoopKind::Bass => "bass",
            LoopKind::Hat => "hihat",
            LoopKind::Pad => "synth",
        }
    }

    /// Loop length in seconds used by the bank.
    pub const fn default_duration(self) -> f64 {
        match self {
            LoopKind::Pulse | LoopKind::Hat => 1.0,
            LoopKind::Bass | LoopKind::Pad => 2.0,
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Returned when a loop name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown loop `{0}` (expected kick, bass, hihat or synth)")]
pub struct ParseLoopKindError(pub String);

impl FromStr for LoopKind {
    type Err = ParseLoopKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick" | "pulse" => Ok(LoopKind::Pulse),
            "bass" => Ok(LoopKind::Bass),
            "hihat" | "hat" => Ok(LoopKind::Hat),
            "synth" | "pad" => Ok(LoopKind::Pad),
            other => Err(ParseLoopKindError(other.to_string())),
        }
    }
}
