//! Crossfade and master volume.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::params::BusParams;

/// Crossfader position a new bus starts at (centre).
pub const DEFAULT_CROSSFADE: f32 = 0.5;
/// Master gain a new bus starts at.
pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;

/// Equal-power crossfade law.
///
/// `position` 0 is all deck A, 1 is all deck B. Out-of-range input is
/// clamped. The squared sends always sum to 1.
pub fn equal_power_sends(position: f32) -> (f32, f32) {
    let p = if position.is_nan() {
        DEFAULT_CROSSFADE
    } else {
        position.clamp(0.0, 1.0)
    };
    let angle = p as f64 * FRAC_PI_2;
    (angle.cos() as f32, angle.sin() as f32)
}

/// Control side of the mix bus.
pub struct MixBus {
    crossfade: f32,
    sends: (f32, f32),
    master: f32,
    params: Arc<BusParams>,
}

impl MixBus {
    pub fn new(params: Arc<BusParams>) -> Self {
        Self {
            crossfade: DEFAULT_CROSSFADE,
            sends: params.sends(),
            master: params.master(),
            params,
        }
    }

    /// Move the crossfader. Values outside `[0, 1]` are clamped.
    pub fn set_crossfade(&mut self, position: f32) {
        let (a, b) = equal_power_sends(position);
        self.crossfade = if position.is_nan() {
            DEFAULT_CROSSFADE
        } else {
            position.clamp(0.0, 1.0)
        };
        self.sends = (a, b);
        self.params.set_sends(a, b);
    }

    pub fn crossfade(&self) -> f32 {
        self.crossfade
    }

    /// Current `(send A, send B)`.
    pub fn sends(&self) -> (f32, f32) {
        self.sends
    }

    /// Linear master gain, applied after the crossfade.
    pub fn set_master_volume(&mut self, gain: f32) {
        self.master = gain.max(0.0);
        self.params.set_master(self.master);
    }

    pub fn master_volume(&self) -> f32 {
        self.master
    }
}
