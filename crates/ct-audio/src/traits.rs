//! Audio sink trait and error types.

use ct_engine::Frame;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to create audio stream
    StreamCreate(String),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
    /// The sink was stopped or its reader went away
    Closed,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "Device init error: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "Stream create error: {}", msg),
            AudioError::Playback(msg) => write!(f, "Playback error: {}", msg),
            AudioError::NoDevice => write!(f, "No audio device available"),
            AudioError::Closed => write!(f, "Audio sink closed"),
        }
    }
}

impl std::error::Error for AudioError {}

/// A fixed-rate consumer of stereo frames.
pub trait AudioSink {
    /// Frames per second the sink plays at.
    fn sample_rate(&self) -> u32;

    /// Push exactly one frame, blocking while the sink is full.
    ///
    /// A full sink is flow control, not failure: this only errors once the
    /// sink can never accept the frame.
    fn write_frame(&mut self, frame: Frame) -> Result<(), AudioError>;

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    /// Stop playback.
    fn stop(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    /// Flag that, once cleared from another thread, makes a `write_frame`
    /// blocked on a full sink return [`AudioError::Closed`].
    ///
    /// `None` for sinks that never block.
    fn release_handle(&self) -> Option<Arc<AtomicBool>> {
        None
    }
}
