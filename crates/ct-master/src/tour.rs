//! Waveform tour: every waveform in program order at 440 Hz.

use ct_engine::{NoteEvent, Score, Waveform};

/// A4, 440 Hz.
pub const TOUR_NOTE: u8 = 69;

/// How long each waveform sounds.
pub const TONE_MS: u64 = 500;

/// Silence between waveforms.
pub const GAP_MS: u64 = 100;

const TOUR_CHANNEL: u8 = 0;
const TOUR_VELOCITY: u8 = 127;

/// Frames covering `ms` milliseconds.
pub fn ms_to_frames(ms: u64, sample_rate: u32) -> u64 {
    ms * sample_rate as u64 / 1000
}

/// Program change, note-on, and note-off for each waveform, one after another.
pub fn waveform_tour(sample_rate: u32) -> Score {
    let tone = ms_to_frames(TONE_MS, sample_rate);
    let step = ms_to_frames(TONE_MS + GAP_MS, sample_rate);
    let mut score = Score::new();
    for (i, waveform) in Waveform::ALL.iter().enumerate() {
        let at = i as u64 * step;
        score.push(at, NoteEvent::ProgramChange {
            channel: TOUR_CHANNEL,
            program: waveform.program(),
        });
        score.push(at, NoteEvent::NoteOn {
            channel: TOUR_CHANNEL,
            note: TOUR_NOTE,
            velocity: TOUR_VELOCITY,
        });
        score.push(at + tone, NoteEvent::NoteOff {
            channel: TOUR_CHANNEL,
            note: TOUR_NOTE,
            velocity: 0,
        });
    }
    score
}

/// Trailing silence rendered after the last note-off.
pub fn tour_tail(sample_rate: u32) -> u64 {
    ms_to_frames(GAP_MS, sample_rate)
}
