//! 16-bit stereo PCM WAV export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use dm_engine::Frame;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
/// Bytes between the RIFF size field and the sample data.
const HEADER_TAIL: u32 = 36;

/// Encode `frames` as a canonical 44-byte-header WAV stream.
pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    let data_len = frames.len() as u32 * BLOCK_ALIGN as u32;

    w.write_all(b"RIFF")?;
    w.write_all(&(HEADER_TAIL + data_len).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?; // PCM
    w.write_all(&CHANNELS.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * BLOCK_ALIGN as u32).to_le_bytes())?;
    w.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    w.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    w.write_all(b"data")?;
    w.write_all(&data_len.to_le_bytes())?;
    for frame in frames {
        w.write_all(&frame.left.to_le_bytes())?;
        w.write_all(&frame.right.to_le_bytes())?;
    }
    Ok(())
}

/// Encode `frames` into memory.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44 + frames.len() * BLOCK_ALIGN as usize);
    write_wav(&mut buf, frames, sample_rate).expect("writing to a Vec cannot fail");
    buf
}

/// Encode `frames` into a file at `path`.
pub fn save_wav(path: &Path, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_wav(&mut file, frames, sample_rate)?;
    file.flush()
}
