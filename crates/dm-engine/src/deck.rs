//! Control-side deck: transport state and channel parameters.
//!
//! A `Deck` never touches audio. It keeps the transport bookkeeping needed
//! to answer "where is the playhead" from the audio clock alone, writes
//! channel parameters to the strip's shared state and queues transport
//! commands to it.

use std::sync::Arc;

use basedrop::{Handle, Shared};
use dm_core::{AudioBuffer, DeckId, EqBand};

use crate::clock::AudioClock;
use crate::command::{CommandSink, DeckCommand};
use crate::graph::DeckEndpoint;
use crate::params::DeckParams;

/// Slowest playback rate the pitch controls will produce.
pub const MIN_RATE: f64 = 0.01;

/// One playback channel holding one loaded loop.
pub struct Deck {
    id: DeckId,
    buffer: Option<AudioBuffer>,
    playing: bool,
    /// Position (seconds) recorded at the last pause.
    pause_offset: f64,
    /// Clock time at which the current playback epoch began.
    start_time: f64,
    rate: f64,
    clock: Arc<dyn AudioClock>,
    params: Arc<DeckParams>,
    link: Box<dyn CommandSink<DeckCommand> + Send>,
    gc: Handle,
}

impl Deck {
    pub fn new(
        id: DeckId,
        clock: Arc<dyn AudioClock>,
        endpoint: DeckEndpoint,
        gc: Handle,
    ) -> Self {
        Self::with_link(id, clock, endpoint.params, endpoint.commands, gc)
    }

    /// Build a deck over any transport sink.
    pub fn with_link(
        id: DeckId,
        clock: Arc<dyn AudioClock>,
        params: Arc<DeckParams>,
        link: impl CommandSink<DeckCommand> + Send + 'static,
        gc: Handle,
    ) -> Self {
        Self {
            id,
            buffer: None,
            playing: false,
            pause_offset: 0.0,
            start_time: 0.0,
            rate: params.rate(),
            clock,
            params,
            link: Box::new(link),
            gc,
        }
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    pub fn buffer(&self) -> Option<&AudioBuffer> {
        self.buffer.as_ref()
    }

    /// Duration of the loaded loop, if it has any frames.
    pub fn duration(&self) -> Option<f64> {
        self.buffer
            .as_ref()
            .map(AudioBuffer::duration)
            .filter(|&d| d > 0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pause_offset(&self) -> f64 {
        self.pause_offset
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.params.gain()
    }

    pub fn eq(&self, band: EqBand) -> f32 {
        self.params.eq(band)
    }

    /// Replace the loaded loop. Playback stops and the offset resets.
    ///
    /// Refused while the old voice cannot be stopped.
    pub fn load_buffer(&mut self, buffer: AudioBuffer) {
        self.stop();
        if self.playing {
            log::warn!("deck {}: transport queue full, keeping the current loop", self.id);
            return;
        }
        log::info!(
            "deck {}: loaded {:.2}s loop at {} Hz",
            self.id,
            buffer.duration(),
            buffer.sample_rate()
        );
        self.buffer = Some(buffer);
        self.pause_offset = 0.0;
    }

    /// Queue a transport command. Transport state only changes when this
    /// succeeds.
    fn send(&mut self, command: DeckCommand) -> bool {
        match self.link.send(command) {
            Ok(()) => true,
            Err(command) => {
                log::warn!("deck {}: transport queue full, dropped {:?}", self.id, command);
                false
            }
        }
    }

    /// Start looping from the pause offset. No-op without a loop or while
    /// already playing.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        let (Some(buffer), Some(duration)) = (&self.buffer, self.duration()) else {
            return;
        };
        let offset = self.pause_offset.rem_euclid(duration);
        let now = self.clock.now();
        let command = DeckCommand::Start {
            buffer: Shared::new(&self.gc, buffer.clone()),
            offset,
            at: now,
        };
        if !self.send(command) {
            return;
        }
        self.start_time = now - offset / self.rate;
        self.playing = true;
        log::debug!("deck {}: play from {:.3}s", self.id, offset);
    }

    /// Stop the voice and keep the position. No-op unless playing.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        let position = self.elapsed();
        if !self.send(DeckCommand::Stop) {
            return;
        }
        self.pause_offset = position;
        self.playing = false;
        log::debug!("deck {}: paused at {:.3}s", self.id, self.pause_offset);
    }

    /// Stop the voice and rewind to the start of the loop.
    pub fn stop(&mut self) {
        if self.playing && !self.send(DeckCommand::Stop) {
            return;
        }
        self.playing = false;
        self.pause_offset = 0.0;
    }

    /// Pause if playing, otherwise play. Returns the resulting state.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    /// Linear channel gain.
    pub fn set_volume(&mut self, gain: f32) {
        self.params.set_gain(gain.max(0.0));
    }

    /// Pitch in cents: +1200 doubles the rate, -1200 halves it. Tempo
    /// follows pitch.
    ///
    /// A DJ-style pitch fader wants the linear law of
    /// [`set_pitch_percent`](Self::set_pitch_percent) instead.
    pub fn set_pitch(&mut self, cents: f64) {
        self.set_rate(2f64.powf(cents / 1200.0));
    }

    /// Linear pitch fader: +8 plays 8% faster.
    pub fn set_pitch_percent(&mut self, percent: f64) {
        self.set_rate(1.0 + percent / 100.0);
    }

    fn set_rate(&mut self, rate: f64) {
        let rate = rate.max(MIN_RATE);
        if self.playing {
            // Rebase so the playhead does not jump.
            let position = self.elapsed();
            self.start_time = self.clock.now() - position / rate;
        }
        self.rate = rate;
        self.params.set_rate(rate);
    }

    /// Band gain in dB.
    pub fn set_eq(&mut self, band: EqBand, gain_db: f32) {
        self.params.set_eq(band, gain_db);
    }

    /// Band gain by name (`low`, `mid`, `high`). Unknown names are ignored.
    pub fn set_eq_named(&mut self, band: &str, gain_db: f32) {
        match band.parse::<EqBand>() {
            Ok(band) => self.set_eq(band, gain_db),
            Err(_) => log::debug!("deck {}: ignoring unknown EQ band {:?}", self.id, band),
        }
    }

    /// Seconds into the loop, computed from the audio clock.
    pub fn position(&self) -> f64 {
        let Some(duration) = self.duration() else {
            return 0.0;
        };
        if self.playing {
            self.elapsed().rem_euclid(duration)
        } else {
            self.pause_offset.rem_euclid(duration)
        }
    }

    /// Position as a fraction of the loop, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        match self.duration() {
            Some(duration) => self.position() / duration,
            None => 0.0,
        }
    }

    fn elapsed(&self) -> f64 {
        (self.clock.now() - self.start_time) * self.rate
    }
}
