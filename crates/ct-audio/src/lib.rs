//! Audio sinks for chiptone.
//!
//! Everything that accepts frames implements [`AudioSink`]: the device output,
//! the ring buffer feeding it, and an in-memory capture used offline.

mod capture;
mod cpal_backend;
mod ring;
mod traits;

pub use capture::CaptureSink;
pub use cpal_backend::CpalOutput;
pub use ring::RingSink;
pub use traits::{AudioError, AudioSink};
