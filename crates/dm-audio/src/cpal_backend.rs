//! Default-device output through cpal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use dm_engine::Frame;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::traits::{AudioError, AudioOutput, AudioResult};

/// Stereo output on the host's default device.
///
/// Frames are handed to the device callback through a ring buffer sized
/// for `buffer_ms` of audio.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<Frame>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device.
    pub fn new(buffer_ms: u32) -> AudioResult<(Self, HeapCons<Frame>)> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = supported.into();
        // The callback interleaves two channels.
        config.channels = 2;

        let capacity = (config.sample_rate.0 as usize * buffer_ms.max(1) as usize / 1000).max(256);
        let (producer, consumer) = HeapRb::<Frame>::new(capacity).split();

        log::info!(
            "audio output: {} at {} Hz, {} frame buffer",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            config.sample_rate.0,
            capacity
        );

        let output = Self {
            device,
            config,
            stream: None,
            producer,
            running: Arc::new(AtomicBool::new(false)),
        };
        Ok((output, consumer))
    }

    /// Build the device stream around `consumer` and start it.
    pub fn build_stream(&mut self, mut consumer: HeapCons<Frame>) -> AudioResult<()> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    for chunk in data.chunks_mut(channels) {
                        let frame = consumer.try_pop().unwrap_or_default();
                        for (i, sample) in chunk.iter_mut().enumerate() {
                            *sample = match i {
                                0 => frame.left_f32(),
                                1 => frame.right_f32(),
                                _ => 0.0,
                            };
                        }
                    }
                },
                |err| log::warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        self.running.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Push one frame, waiting while the ring is full.
    ///
    /// Returns `false` without writing if `cancel` is raised while waiting.
    pub fn write_blocking(&mut self, frame: Frame, cancel: &AtomicBool) -> bool {
        while self.producer.is_full() {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        self.producer.try_push(frame).is_ok()
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write(&mut self, frames: &[Frame]) -> AudioResult<()> {
        // Overflow is dropped; the callback zero-fills underruns.
        self.producer.push_slice(frames);
        Ok(())
    }

    fn start(&mut self) -> AudioResult<()> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> AudioResult<()> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
