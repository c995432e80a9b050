//! Output that collects frames in memory, for offline rendering.

use dm_engine::Frame;

use crate::traits::{AudioError, AudioOutput, AudioResult};

/// Collects every frame written while started.
#[derive(Debug)]
pub struct MemoryOutput {
    sample_rate: u32,
    frames: Vec<Frame>,
    running: bool,
}

impl MemoryOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frames: Vec::new(),
            running: false,
        }
    }

    pub fn with_capacity(sample_rate: u32, frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(frames),
            ..Self::new(sample_rate)
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl AudioOutput for MemoryOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, frames: &[Frame]) -> AudioResult<()> {
        if !self.running {
            return Err(AudioError::NotRunning);
        }
        self.frames.extend_from_slice(frames);
        Ok(())
    }

    fn start(&mut self) -> AudioResult<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> AudioResult<()> {
        self.running = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_only_while_running() {
        let mut out = MemoryOutput::new(44100);
        assert!(matches!(out.write(&[Frame::mono(1)]), Err(AudioError::NotRunning)));

        out.start().unwrap();
        out.write(&[Frame::mono(1), Frame::mono(2)]).unwrap();
        out.stop().unwrap();
        assert!(out.write(&[Frame::mono(3)]).is_err());

        assert_eq!(out.sample_rate(), 44100);
        assert_eq!(out.into_frames(), vec![Frame::mono(1), Frame::mono(2)]);
    }
}
