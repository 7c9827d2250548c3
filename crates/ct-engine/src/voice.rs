//! Voice: one oscillator slot in the pool.

use crate::config::{NoiseMode, NoiseRate, TriangleMode};
use crate::frequency::{advance_phase, phase_increment, A4_FREQUENCY};
use crate::noise::{Lfsr, SharedNoise};
use crate::oscillator::{self, Waveform};

/// Parameters seeded into a voice on note-on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trigger {
    pub note: u8,
    pub frequency: f32,
    pub volume: f32,
    pub waveform: Waveform,
}

/// Per-tick settings shared by every voice, plus the engine-wide noise registers.
pub(crate) struct RenderContext<'a> {
    pub triangle: TriangleMode,
    pub noise_mode: NoiseMode,
    pub noise_rate: NoiseRate,
    /// Already clocked by the engine for this tick.
    pub shared_noise: &'a SharedNoise,
}

/// A single synthesis slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    /// Whether the voice contributes to the mix.
    pub active: bool,
    /// Oscillator frequency in Hz.
    pub frequency: f32,
    /// Linear volume (0.0-1.0).
    pub volume: f32,
    /// Position within the current cycle, [0, 1).
    pub phase: f32,
    /// MIDI note that triggered this voice.
    pub note: u8,
    /// Waveform snapshot taken at trigger time.
    pub waveform: Waveform,
    /// Phase step per tick.
    pub increment: f32,
    /// Ticks rendered since the last trigger.
    pub ticks: u64,
    /// Engine-wide trigger counter at the last trigger; larger is newer.
    pub serial: u64,
    /// Private noise register (per-voice noise mode).
    pub noise: Lfsr,
}

impl Voice {
    /// An inactive voice at phase 0.
    pub fn new() -> Self {
        Self {
            active: false,
            frequency: A4_FREQUENCY,
            volume: 0.0,
            phase: 0.0,
            note: 0,
            waveform: Waveform::default(),
            increment: 0.0,
            ticks: 0,
            serial: 0,
            noise: Lfsr::default(),
        }
    }

    /// Seed every field for a new note and activate.
    pub fn trigger(&mut self, trigger: &Trigger, sample_rate: u32, serial: u64) {
        *self = Self {
            active: true,
            frequency: trigger.frequency,
            volume: trigger.volume,
            phase: 0.0,
            note: trigger.note,
            waveform: trigger.waveform,
            increment: phase_increment(trigger.frequency, sample_rate),
            ticks: 0,
            serial,
            noise: Lfsr::for_trigger(serial),
        };
    }

    /// Stop contributing to the mix. Other fields are kept until the next trigger.
    pub fn release(&mut self) {
        self.active = false;
    }

    /// Volume-scaled sample at the current (pre-advance) phase.
    ///
    /// Clocks the private noise register for noise waveforms; does not move the phase.
    pub(crate) fn render(&mut self, ctx: &RenderContext<'_>) -> f32 {
        let noise = match ctx.noise_mode {
            NoiseMode::PerVoice => {
                if self.waveform.is_noise() {
                    self.noise.clock(self.ticks, self.waveform.is_short_noise(), ctx.noise_rate);
                }
                &self.noise
            }
            NoiseMode::Shared => ctx.shared_noise.register(self.waveform.is_short_noise()),
        };
        oscillator::sample(self.waveform, self.phase, ctx.triangle, noise) * self.volume
    }

    /// Step the phase accumulator by one tick.
    pub fn advance(&mut self) {
        self.phase = advance_phase(self.phase, self.increment);
        self.ticks = self.ticks.wrapping_add(1);
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}
