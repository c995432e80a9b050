//! Headless console controller for deckmix.
//!
//! A [`Console`] is the engine context: it owns the loop bank, both decks,
//! the mix bus and the spectrum analyser. It runs either live, with a
//! render thread feeding the default audio device, or offline, handing the
//! [`Mixer`] back to the caller.

mod config;
mod error;
mod wav;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use basedrop::Collector;
use dm_audio::{AudioError, CpalOutput};
use dm_core::DeckId;
use dm_engine::{
    build_graph, Analyser, AudioClock, Deck, FrameClock, GraphEndpoints, MixBus, RENDER_QUANTUM,
};
use dm_synth::{LoopBank, LoopKind, RngNoise};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use config::ConsoleConfig;
pub use dm_audio::{AudioOutput, MemoryOutput};
pub use dm_engine::{Frame, Mixer, Snapshot};
pub use error::ConsoleError;
pub use wav::{frames_to_wav, save_wav, write_wav};

/// Two decks, a crossfader and a spectrum, ready to be driven by a UI.
pub struct Console {
    bank: LoopBank,
    decks: [Deck; 2],
    loaded: [LoopKind; 2],
    bus: MixBus,
    analyser: Analyser,
    clock: FrameClock,
    playback: Option<PlaybackHandle>,
    /// Frees loops the mixer has released. Declared last so the decks'
    /// handles go first.
    gc: Collector,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Console {
    /// Build a console whose mixer the caller drives.
    pub fn offline(config: &ConsoleConfig) -> Result<(Self, Mixer), ConsoleError> {
        config.validate()?;
        let (endpoints, mixer) = build_graph(config.sample_rate);
        Ok((Self::assemble(config, endpoints), mixer))
    }

    /// Open the default audio device and start rendering to it.
    ///
    /// The device decides the sample rate; `config.sample_rate` is ignored.
    pub fn start(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        config.validate()?;

        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, AudioError>>();
        let (mixer_tx, mixer_rx) = mpsc::channel::<Mixer>();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let buffer_ms = config.buffer_ms;
        let stop = stop_signal.clone();
        let done = finished.clone();
        let thread = std::thread::Builder::new()
            .name("deckmix-audio".into())
            .spawn(move || audio_thread(buffer_ms, ready_tx, mixer_rx, stop, done))?;

        let handle = PlaybackHandle {
            stop_signal,
            finished,
            thread: Some(thread),
        };

        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(err)) => {
                handle.join();
                return Err(err.into());
            }
            Err(_) => {
                handle.join();
                return Err(ConsoleError::ThreadExited);
            }
        };

        let (endpoints, mixer) = build_graph(sample_rate);
        let mut console = Self::assemble(
            &ConsoleConfig {
                sample_rate,
                ..config.clone()
            },
            endpoints,
        );
        if mixer_tx.send(mixer).is_err() {
            handle.join();
            return Err(ConsoleError::ThreadExited);
        }
        console.playback = Some(handle);
        Ok(console)
    }

    fn assemble(config: &ConsoleConfig, endpoints: GraphEndpoints) -> Self {
        let GraphEndpoints {
            decks: [deck_a, deck_b],
            bus,
            tap,
            clock,
            gc,
        } = endpoints;

        let bank = match config.seed {
            Some(seed) => {
                let mut noise = RngNoise(StdRng::seed_from_u64(seed));
                LoopBank::generate(config.sample_rate, &mut noise)
            }
            None => LoopBank::new(config.sample_rate),
        };

        let shared: Arc<dyn AudioClock> = Arc::new(clock.clone());
        let decks = [
            Deck::new(DeckId::A, shared.clone(), deck_a, gc.handle()),
            Deck::new(DeckId::B, shared, deck_b, gc.handle()),
        ];

        let mut console = Self {
            bank,
            decks,
            loaded: [config.deck_a, config.deck_b],
            bus: MixBus::new(bus),
            analyser: Analyser::new(tap),
            clock,
            playback: None,
            gc,
        };
        console.load(DeckId::A, config.deck_a);
        console.load(DeckId::B, config.deck_b);
        console.bus.set_crossfade(config.crossfade);
        console.bus.set_master_volume(config.master_volume);

        log::info!(
            "console ready at {} Hz: deck A {}, deck B {}",
            config.sample_rate,
            config.deck_a,
            config.deck_b
        );
        console
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    /// Audio clock shared by both decks.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn bank(&self) -> &LoopBank {
        &self.bank
    }

    pub fn deck(&self, id: DeckId) -> &Deck {
        &self.decks[id.index()]
    }

    pub fn deck_mut(&mut self, id: DeckId) -> &mut Deck {
        &mut self.decks[id.index()]
    }

    /// Put a loop from the bank on a deck. The deck stops.
    pub fn load(&mut self, id: DeckId, kind: LoopKind) {
        let buffer = self.bank.get(kind).clone();
        self.decks[id.index()].load_buffer(buffer);
        self.loaded[id.index()] = kind;
        self.collect_garbage();
    }

    /// The loop most recently loaded on `id`.
    pub fn loaded(&self, id: DeckId) -> LoopKind {
        self.loaded[id.index()]
    }

    pub fn bus(&self) -> &MixBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MixBus {
        &mut self.bus
    }

    /// Pull a fresh spectrum of the mix.
    ///
    /// Also frees any loops the mixer has let go of, so a UI polling this
    /// every frame keeps memory in check.
    pub fn spectrum(&mut self) -> &Snapshot {
        self.collect_garbage();
        self.analyser.snapshot()
    }

    /// Free loop handles the mixer has dropped since the last call.
    pub fn collect_garbage(&mut self) {
        self.gc.collect();
    }

    /// True while either deck is playing.
    pub fn is_active(&self) -> bool {
        self.decks.iter().any(Deck::is_playing)
    }

    /// True while the live render thread is running.
    pub fn is_live(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    /// Stop the live render thread, if any.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.stop_signal.store(true, Ordering::Relaxed);
            handle.join();
            log::info!("audio thread stopped");
        }
        self.collect_garbage();
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl PlaybackHandle {
    fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("audio thread panicked");
            }
        }
    }
}

fn audio_thread(
    buffer_ms: u32,
    ready: mpsc::Sender<Result<u32, AudioError>>,
    graph: mpsc::Receiver<Mixer>,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
) {
    let opened = CpalOutput::new(buffer_ms).and_then(|(mut output, consumer)| {
        output.build_stream(consumer)?;
        Ok(output)
    });
    let mut output = match opened {
        Ok(output) => output,
        Err(err) => {
            let _ = ready.send(Err(err));
            finished.store(true, Ordering::Relaxed);
            return;
        }
    };
    if ready.send(Ok(output.sample_rate())).is_err() {
        finished.store(true, Ordering::Relaxed);
        return;
    }
    let Ok(mut mixer) = graph.recv() else {
        finished.store(true, Ordering::Relaxed);
        return;
    };

    let mut block = [0.0f32; RENDER_QUANTUM];
    'render: while !stop_signal.load(Ordering::Relaxed) {
        mixer.render(&mut block);
        for &sample in &block {
            if !output.write_blocking(Frame::from_sample(sample), &stop_signal) {
                break 'render;
            }
        }
    }

    if let Err(err) = output.stop() {
        log::warn!("{}", err);
    }
    finished.store(true, Ordering::Relaxed);
}

/// Render `frames` frames from `mixer` into `output`, one quantum at a time.
pub fn render_into(
    mixer: &mut Mixer,
    frames: usize,
    output: &mut impl AudioOutput,
) -> Result<(), ConsoleError> {
    let mut block = [0.0f32; RENDER_QUANTUM];
    let mut pcm = [Frame::silence(); RENDER_QUANTUM];
    let mut remaining = frames;

    output.start()?;
    while remaining > 0 {
        let n = remaining.min(RENDER_QUANTUM);
        mixer.render(&mut block[..n]);
        for (frame, &sample) in pcm.iter_mut().zip(&block[..n]) {
            *frame = Frame::from_sample(sample);
        }
        output.write(&pcm[..n])?;
        remaining -= n;
    }
    output.stop()?;
    Ok(())
}

/// Render `seconds` of both decks playing from the top, offline.
pub fn render_session(config: &ConsoleConfig, seconds: f64) -> Result<Vec<Frame>, ConsoleError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConsoleError::InvalidConfig(format!(
            "render length {} must be a finite, non-negative number of seconds",
            seconds
        )));
    }
    let (mut console, mut mixer) = Console::offline(config)?;
    for id in DeckId::ALL {
        console.deck_mut(id).play();
    }

    let frames = (seconds * config.sample_rate as f64).round() as usize;
    let mut output = MemoryOutput::with_capacity(config.sample_rate, frames);
    render_into(&mut mixer, frames, &mut output)?;
    log::info!("rendered {} frames at {} Hz", frames, config.sample_rate);
    Ok(output.into_frames())
}
