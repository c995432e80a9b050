use dm_audio::AudioError;
use thiserror::Error;

/// Errors from setting up or exporting a console.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("audio output failed: {0}")]
    Audio(#[from] AudioError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("audio thread exited before the console was ready")]
    ThreadExited,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
