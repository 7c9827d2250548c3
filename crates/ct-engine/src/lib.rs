//! Synthesis engine for chiptone.
//!
//! A fixed pool of voices running duty-cycle pulse, stepped triangle and
//! LFSR noise oscillators, mixed into one 16-bit sample per output frame.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
mod controller;
mod event;
mod frame;
pub mod frequency;
mod mixer;
pub mod noise;
pub mod oscillator;
mod score;
mod voice;
mod voice_pool;

pub use config::{
    ConfigError, EngineConfig, Layout, MixStrategy, NoiseMode, NoiseRate, StealPolicy,
    TriangleMode,
};
pub use event::{EventReport, NoteEvent};
pub use frame::Frame;
pub use frequency::note_to_frequency;
pub use mixer::Engine;
pub use noise::{Lfsr, SharedNoise};
pub use oscillator::{Waveform, AMPLITUDE};
pub use score::{Score, TimedEvent};
pub use voice::{Trigger, Voice};
pub use voice_pool::{Allocation, SlotId, VoicePool};
