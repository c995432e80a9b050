//! Output trait and error types.

use dm_engine::Frame;
use thiserror::Error;

/// Errors from opening or driving an output device.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device available")]
    NoDevice,

    #[error("Failed to get device config: {0}")]
    DeviceInit(String),

    #[error("Failed to build audio stream: {0}")]
    StreamCreate(String),

    #[error("Failed to start or pause audio stream: {0}")]
    Playback(String),

    #[error("Output is not running")]
    NotRunning,
}

pub type AudioResult<T> = Result<T, AudioError>;

/// A sink for rendered frames.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Queue frames for output. Frames that do not fit may be dropped.
    fn write(&mut self, frames: &[Frame]) -> AudioResult<()>;

    fn start(&mut self) -> AudioResult<()>;

    fn stop(&mut self) -> AudioResult<()>;
}
