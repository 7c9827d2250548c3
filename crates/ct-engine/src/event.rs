//! Note events consumed by the engine and the reports it produces for them.

use core::fmt;

use crate::oscillator::Waveform;
use crate::voice_pool::SlotId;

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;
const STATUS_PROGRAM_CHANGE: u8 = 0xC0;

/// A decoded note event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl NoteEvent {
    /// Decode one complete MIDI channel message.
    ///
    /// Returns `None` for message kinds the engine does not consume, for
    /// truncated messages, and for data bytes with the high bit set.
    pub fn from_midi(message: &[u8]) -> Option<Self> {
        let (&status, data) = message.split_first()?;
        if data.iter().any(|b| b & 0x80 != 0) {
            return None;
        }
        let channel = status & 0x0F;
        match (status & 0xF0, data) {
            (STATUS_NOTE_ON, [note, velocity, ..]) => Some(NoteEvent::NoteOn {
                channel,
                note: *note,
                velocity: *velocity,
            }),
            (STATUS_NOTE_OFF, [note, velocity, ..]) => Some(NoteEvent::NoteOff {
                channel,
                note: *note,
                velocity: *velocity,
            }),
            (STATUS_PROGRAM_CHANGE, [program, ..]) => Some(NoteEvent::ProgramChange {
                channel,
                program: *program,
            }),
            _ => None,
        }
    }
}

/// What an applied event did to the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventReport {
    /// A voice was seated and activated.
    NoteStarted {
        channel: u8,
        lane: usize,
        slot: SlotId,
        note: u8,
        waveform: Waveform,
        frequency: f32,
        /// The slot was cut off from an older note.
        stolen: bool,
    },
    /// Matching voices were deactivated (possibly none).
    NoteReleased { channel: u8, note: u8, released: usize },
    /// The channel's waveform assignment changed.
    ProgramChanged { channel: u8, waveform: Waveform },
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventReport::NoteStarted { channel, slot, waveform, frequency, stolen, .. } => {
                write!(f, "{} {:.1}Hz ch{} v{}", waveform, frequency, channel, slot)?;
                if *stolen {
                    f.write_str(" (stolen)")?;
                }
                Ok(())
            }
            EventReport::NoteReleased { channel, note, released } => {
                write!(f, "off n{} ch{} x{}", note, channel, released)
            }
            EventReport::ProgramChanged { channel, waveform } => {
                write!(f, "{} ch{}", waveform, channel)
            }
        }
    }
}
