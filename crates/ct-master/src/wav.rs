//! WAV encoding for 16-bit stereo PCM.

use ct_engine::Frame;
use std::io::Write;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);

/// Size of the RIFF, fmt and data chunk headers.
pub const HEADER_LEN: usize = 44;

fn header(frame_count: usize, sample_rate: u32) -> [u8; HEADER_LEN] {
    let data_size = frame_count as u32 * BLOCK_ALIGN as u32;
    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes());
    h[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&(sample_rate * BLOCK_ALIGN as u32).to_le_bytes());
    h[32..34].copy_from_slice(&BLOCK_ALIGN.to_le_bytes());
    h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    h
}

fn frame_bytes(frame: &Frame) -> [u8; 4] {
    let [l0, l1] = frame.left.to_le_bytes();
    let [r0, r1] = frame.right.to_le_bytes();
    [l0, l1, r0, r1]
}

pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    w.write_all(&header(frames.len(), sample_rate))?;
    for frame in frames {
        w.write_all(&frame_bytes(frame))?;
    }
    Ok(())
}

pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + frames.len() * BLOCK_ALIGN as usize);
    buf.extend_from_slice(&header(frames.len(), sample_rate));
    for frame in frames {
        buf.extend_from_slice(&frame_bytes(frame));
    }
    buf
}
