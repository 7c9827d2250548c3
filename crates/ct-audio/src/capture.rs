//! In-memory sink that records every frame.

use ct_engine::Frame;

use crate::traits::{AudioError, AudioSink};

/// Collects frames into a `Vec`, optionally refusing writes past a limit.
#[derive(Clone, Debug)]
pub struct CaptureSink {
    sample_rate: u32,
    frames: Vec<Frame>,
    limit: Option<usize>,
}

impl CaptureSink {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, frames: Vec::new(), limit: None }
    }

    /// A sink that closes after `limit` frames.
    pub fn with_limit(sample_rate: u32, limit: usize) -> Self {
        Self { sample_rate, frames: Vec::with_capacity(limit), limit: Some(limit) }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl AudioSink for CaptureSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write_frame(&mut self, frame: Frame) -> Result<(), AudioError> {
        if self.limit.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(AudioError::Closed);
        }
        self.frames.push(frame);
        Ok(())
    }
}
