//! Render-side channel strip: looping voice → gain → EQ.

use std::sync::Arc;

use basedrop::Shared;
use dm_core::{AudioBuffer, EqBand};

use crate::biquad::Equalizer;
use crate::command::DeckCommand;
use crate::params::DeckParams;

/// Channel gain before any command arrives.
pub const DEFAULT_CHANNEL_GAIN: f32 = 0.8;

/// Length of the declick fade applied when a voice is stopped.
pub const RELEASE_FRAMES: u32 = 64;

/// One playback node. Loops natively over its buffer; never restarted.
///
/// The buffer handle is a `basedrop` pointer, so dropping a voice on the
/// render thread defers the free to the collector.
struct Voice {
    buffer: Shared<AudioBuffer>,
    /// Read position in buffer frames.
    position: f64,
    /// Buffer frames per output frame at rate 1.
    step: f64,
}

impl Voice {
    fn new(buffer: Shared<AudioBuffer>, offset: f64, output_rate: u32) -> Self {
        let len = buffer.frames() as f64;
        let position = if len > 0.0 {
            (offset * buffer.sample_rate() as f64).rem_euclid(len)
        } else {
            0.0
        };
        let step = buffer.sample_rate() as f64 / output_rate as f64;
        Self { buffer, position, step }
    }

    /// Linearly interpolated read, then advance by `rate` and wrap.
    #[inline]
    fn next(&mut self, rate: f64) -> f32 {
        let data = self.buffer.samples();
        let len = data.len();
        if len == 0 {
            return 0.0;
        }
        let idx = self.position as usize % len;
        let frac = (self.position - self.position.floor()) as f32;
        let s0 = data[idx];
        let s1 = data[(idx + 1) % len];

        self.position += self.step * rate;
        if self.position >= len as f64 {
            self.position = self.position.rem_euclid(len as f64);
        }
        s0 + (s1 - s0) * frac
    }

    fn seconds(&self) -> f64 {
        self.position / self.buffer.sample_rate() as f64
    }
}

/// A stopped voice fading to silence before release.
struct Release {
    voice: Voice,
    remaining: u32,
}

/// Mixing state for one deck.
pub struct ChannelStrip {
    voice: Option<Voice>,
    release: Option<Release>,
    params: Arc<DeckParams>,
    /// Parameter version last copied from `params`.
    seen: u64,
    gain: f32,
    rate: f64,
    eq: Equalizer,
    output_rate: u32,
}

impl ChannelStrip {
    pub fn new(output_rate: u32, params: Arc<DeckParams>) -> Self {
        Self {
            voice: None,
            release: None,
            gain: params.gain(),
            rate: params.rate(),
            seen: u64::MAX,
            params,
            eq: Equalizer::new(output_rate),
            output_rate,
        }
    }

    /// Copy gain, rate and EQ from the shared parameters if they changed.
    pub fn sync(&mut self) {
        let version = self.params.version();
        if version == self.seen {
            return;
        }
        self.seen = version;
        self.gain = self.params.gain();
        self.rate = self.params.rate();
        for band in EqBand::ALL {
            let gain_db = self.params.eq(band);
            if gain_db != self.eq.gain(band) {
                self.eq.set_gain(band, gain_db);
            }
        }
    }

    /// Apply one transport command. `now` is the clock time of the block
    /// the command lands in.
    pub fn apply(&mut self, command: DeckCommand, now: f64) {
        match command {
            DeckCommand::Start { buffer, offset, at } => {
                self.release_voice();
                let lead = (now - at).max(0.0) * self.rate;
                self.voice = Some(Voice::new(buffer, offset + lead, self.output_rate));
            }
            DeckCommand::Stop => self.release_voice(),
        }
    }

    fn release_voice(&mut self) {
        if let Some(voice) = self.voice.take() {
            // A voice already fading is cut; the newer one takes its slot.
            self.release = Some(Release {
                voice,
                remaining: RELEASE_FRAMES,
            });
        }
    }

    /// Render one post-EQ sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let rate = self.rate;
        let mut source = match &mut self.voice {
            Some(voice) => voice.next(rate),
            None => 0.0,
        };

        if let Some(release) = &mut self.release {
            let level = release.remaining as f32 / RELEASE_FRAMES as f32;
            source += release.voice.next(rate) * level;
            release.remaining -= 1;
            if release.remaining == 0 {
                self.release = None;
            }
        }

        self.eq.process(source * self.gain)
    }

    /// True while a voice is playing (not counting a fading one).
    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }

    /// Read position of the playing voice in seconds.
    pub fn voice_position(&self) -> Option<f64> {
        self.voice.as_ref().map(Voice::seconds)
    }

    /// Playback rate in effect.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn eq_gain(&self, band: EqBand) -> f32 {
        self.eq.gain(band)
    }
}
