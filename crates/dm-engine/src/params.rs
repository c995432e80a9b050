//! Latest-value parameter state shared between a control handle and the
//! mixer.
//!
//! Parameters are not queued: the control side overwrites the current value
//! and the mixer picks up whatever is current at the next block boundary.
//! Any number of changes between two blocks collapse into one.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use dm_core::EqBand;

use crate::bus::{equal_power_sends, DEFAULT_CROSSFADE, DEFAULT_MASTER_VOLUME};
use crate::strip::DEFAULT_CHANNEL_GAIN;

fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

/// Gain, rate and EQ for one channel strip.
#[derive(Debug)]
pub struct DeckParams {
    /// Bumped after every write so readers can skip unchanged blocks.
    version: AtomicU64,
    gain: AtomicU32,
    rate: AtomicU64,
    eq_db: [AtomicU32; 3],
}

impl DeckParams {
    pub fn new() -> Self {
        Self {
            version: AtomicU64::new(0),
            gain: AtomicU32::new(DEFAULT_CHANNEL_GAIN.to_bits()),
            rate: AtomicU64::new(1.0f64.to_bits()),
            eq_db: [
                AtomicU32::new(0.0f32.to_bits()),
                AtomicU32::new(0.0f32.to_bits()),
                AtomicU32::new(0.0f32.to_bits()),
            ],
        }
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::Release);
    }

    pub fn gain(&self) -> f32 {
        load_f32(&self.gain)
    }

    pub fn set_gain(&self, gain: f32) {
        store_f32(&self.gain, gain);
        self.bump();
    }

    pub fn rate(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    pub fn set_rate(&self, rate: f64) {
        self.rate.store(rate.to_bits(), Ordering::Relaxed);
        self.bump();
    }

    pub fn eq(&self, band: EqBand) -> f32 {
        load_f32(&self.eq_db[band.index()])
    }

    pub fn set_eq(&self, band: EqBand, gain_db: f32) {
        store_f32(&self.eq_db[band.index()], gain_db);
        self.bump();
    }
}

impl Default for DeckParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Crossfade sends and master gain.
#[derive(Debug)]
pub struct BusParams {
    /// Send A in the high half, send B in the low half, so a reader never
    /// sees one send without the other.
    sends: AtomicU64,
    master: AtomicU32,
}

impl BusParams {
    pub fn new() -> Self {
        let params = Self {
            sends: AtomicU64::new(0),
            master: AtomicU32::new(DEFAULT_MASTER_VOLUME.to_bits()),
        };
        let (a, b) = equal_power_sends(DEFAULT_CROSSFADE);
        params.set_sends(a, b);
        params
    }

    pub fn sends(&self) -> (f32, f32) {
        let packed = self.sends.load(Ordering::Relaxed);
        (
            f32::from_bits((packed >> 32) as u32),
            f32::from_bits(packed as u32),
        )
    }

    pub fn set_sends(&self, a: f32, b: f32) {
        let packed = ((a.to_bits() as u64) << 32) | b.to_bits() as u64;
        self.sends.store(packed, Ordering::Relaxed);
    }

    pub fn master(&self) -> f32 {
        load_f32(&self.master)
    }

    pub fn set_master(&self, gain: f32) {
        store_f32(&self.master, gain);
    }
}

impl Default for BusParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_defaults() {
        let params = DeckParams::new();
        assert_eq!(params.gain(), DEFAULT_CHANNEL_GAIN);
        assert_eq!(params.rate(), 1.0);
        for band in EqBand::ALL {
            assert_eq!(params.eq(band), 0.0);
        }
        assert_eq!(params.version(), 0);
    }

    #[test]
    fn every_write_bumps_version() {
        let params = DeckParams::new();
        params.set_gain(0.5);
        params.set_rate(1.5);
        params.set_eq(EqBand::Mid, -3.0);
        assert_eq!(params.version(), 3);
        assert_eq!(params.gain(), 0.5);
        assert_eq!(params.rate(), 1.5);
        assert_eq!(params.eq(EqBand::Mid), -3.0);
    }

    #[test]
    fn sends_round_trip_as_a_pair() {
        let params = BusParams::new();
        assert_eq!(params.sends(), equal_power_sends(DEFAULT_CROSSFADE));
        params.set_sends(1.0, -0.25);
        assert_eq!(params.sends(), (1.0, -0.25));
        params.set_master(0.3);
        assert_eq!(params.master(), 0.3);
    }
}
