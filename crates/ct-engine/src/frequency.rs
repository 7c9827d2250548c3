//! Note-to-frequency conversion and phase accumulator arithmetic.
//!
//! Phases are fractions of one waveform cycle in [0, 1), stepped once per
//! output frame by `frequency / sample_rate`.

/// MIDI note number of A4.
pub const A4_NOTE: u8 = 69;

/// Concert pitch for A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// Highest valid MIDI note or velocity.
pub const MIDI_MAX: u8 = 127;

/// Equal-tempered frequency of a MIDI note: `440 * 2^((note - 69) / 12)`.
pub fn note_to_frequency(note: u8) -> f32 {
    let semitones = note as f32 - A4_NOTE as f32;
    A4_FREQUENCY * libm::powf(2.0, semitones / 12.0)
}

/// Linear volume in [0, 1] from a MIDI velocity.
pub fn velocity_to_volume(velocity: u8) -> f32 {
    velocity.min(MIDI_MAX) as f32 / MIDI_MAX as f32
}

/// Per-frame phase step.
pub fn phase_increment(frequency: f32, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    frequency / sample_rate as f32
}

/// `(phase + increment) mod 1`, kept strictly below 1.
pub fn advance_phase(phase: f32, increment: f32) -> f32 {
    let next = phase + increment;
    let wrapped = next - libm::floorf(next);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
