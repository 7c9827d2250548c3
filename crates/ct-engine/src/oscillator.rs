//! Oscillator bank: the six waveform kinds and their per-phase sample values.
//!
//! Pulse and triangle values are pure functions of phase. Noise values come
//! from an [`Lfsr`] that the caller clocks; see [`crate::noise`].

use core::fmt;

use crate::config::TriangleMode;
use crate::noise::Lfsr;

/// Full-scale amplitude, the signed 16-bit maximum.
pub const AMPLITUDE: f32 = 32767.0;

/// Quantization steps in each half of the triangle.
pub const TRIANGLE_STEPS: u32 = 15;

/// Center of the step range (0..=14), used by [`TriangleMode::Centered`].
const TRIANGLE_MID: f32 = (TRIANGLE_STEPS - 1) as f32 / 2.0;

/// Oscillator algorithm selected for a voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// 50% duty square.
    #[default]
    Square,
    /// 25% duty pulse.
    Pulse25,
    /// 12.5% duty pulse.
    Pulse12_5,
    /// 15-step quantized triangle.
    Triangle,
    /// Long-period LFSR noise (taps 0 and 1).
    NoiseLong,
    /// Short-period LFSR noise (taps 0 and 6).
    NoiseShort,
}

impl Waveform {
    /// All kinds in program-number order.
    pub const ALL: [Waveform; 6] = [
        Waveform::Square,
        Waveform::Pulse25,
        Waveform::Pulse12_5,
        Waveform::Triangle,
        Waveform::NoiseLong,
        Waveform::NoiseShort,
    ];

    /// Map a program number (0-5) to a waveform.
    pub fn from_program(program: u8) -> Option<Self> {
        Self::ALL.get(program as usize).copied()
    }

    /// Program number selecting this waveform.
    pub fn program(self) -> u8 {
        self as u8
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Square => "Square 50%",
            Waveform::Pulse25 => "Pulse 25%",
            Waveform::Pulse12_5 => "Pulse 12.5%",
            Waveform::Triangle => "Triangle",
            Waveform::NoiseLong => "Noise (long)",
            Waveform::NoiseShort => "Noise (short)",
        }
    }

    /// High fraction of the cycle for the pulse family.
    pub fn duty(self) -> Option<f32> {
        match self {
            Waveform::Square => Some(0.5),
            Waveform::Pulse25 => Some(0.25),
            Waveform::Pulse12_5 => Some(0.125),
            _ => None,
        }
    }

    pub fn is_noise(self) -> bool {
        matches!(self, Waveform::NoiseLong | Waveform::NoiseShort)
    }

    /// Whether this kind uses the short-period feedback tap.
    pub fn is_short_noise(self) -> bool {
        self == Waveform::NoiseShort
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two-level pulse: `+A` while `phase < duty`, `-A` after.
pub fn pulse(phase: f32, duty: f32) -> f32 {
    if phase < duty {
        AMPLITUDE
    } else {
        -AMPLITUDE
    }
}

/// Quantized triangle step (0..=14) for a phase in [0, 1).
///
/// Rising half counts `floor(phase * 30)`, falling half `floor((1 - phase) * 30)`.
/// The falling formula reaches 15 only at exactly `phase == 0.5`; that value is
/// held at 14 so both halves cover the same 15 levels.
pub fn triangle_step(phase: f32) -> u32 {
    let scale = 2.0 * TRIANGLE_STEPS as f32;
    let raw = if phase < 0.5 {
        phase * scale
    } else {
        (1.0 - phase) * scale
    };
    (libm::floorf(raw).max(0.0) as u32).min(TRIANGLE_STEPS - 1)
}

/// Stepped triangle sample.
pub fn triangle(phase: f32, mode: TriangleMode) -> f32 {
    let step = triangle_step(phase) as f32;
    match mode {
        TriangleMode::Stepped => step * (AMPLITUDE / TRIANGLE_STEPS as f32),
        TriangleMode::Centered => (step - TRIANGLE_MID) * (AMPLITUDE / TRIANGLE_MID),
    }
}

/// Sample of `kind` at `phase`, full scale. Noise kinds read the register's
/// current output bit and ignore phase.
pub fn sample(kind: Waveform, phase: f32, triangle_mode: TriangleMode, noise: &Lfsr) -> f32 {
    match kind {
        Waveform::Square | Waveform::Pulse25 | Waveform::Pulse12_5 => {
            pulse(phase, kind.duty().unwrap_or(0.5))
        }
        Waveform::Triangle => triangle(phase, triangle_mode),
        Waveform::NoiseLong | Waveform::NoiseShort => noise.output(),
    }
}
