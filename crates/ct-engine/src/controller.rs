//! Event controller: applies note events to the voice pool.
//!
//! Handlers are total. Out-of-range channels, notes, velocities and programs
//! are dropped and produce no report.

use log::{debug, trace};

use crate::event::{EventReport, NoteEvent};
use crate::frequency::{note_to_frequency, velocity_to_volume, MIDI_MAX};
use crate::mixer::Engine;
use crate::oscillator::Waveform;
use crate::voice::Trigger;

impl Engine {
    /// Apply one event. Returns `None` when the event was ignored.
    pub fn handle(&mut self, event: NoteEvent) -> Option<EventReport> {
        match event {
            NoteEvent::NoteOn { channel, note, velocity } => self.note_on(channel, note, velocity),
            NoteEvent::NoteOff { channel, note, velocity } => self.note_off(channel, note, velocity),
            NoteEvent::ProgramChange { channel, program } => self.program_change(channel, program),
        }
    }

    /// Seat a new voice for `note`. Velocity 0 is a note-off.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Option<EventReport> {
        if velocity == 0 {
            return self.note_off(channel, note, 0);
        }
        if note > MIDI_MAX || velocity > MIDI_MAX {
            trace!("dropping note-on ch{} n{} vel{}", channel, note, velocity);
            return None;
        }
        let lane = self.config().layout.lane_for(channel)?;
        let trigger = Trigger {
            note,
            frequency: note_to_frequency(note),
            volume: velocity_to_volume(velocity),
            waveform: self.pool.waveform(lane)?,
        };
        let sample_rate = self.sample_rate();
        let allocation = self.pool.trigger(lane, &trigger, sample_rate)?;
        if allocation.stolen {
            debug!("lane {} full, stole slot {} for note {}", lane, allocation.slot, note);
        }
        Some(EventReport::NoteStarted {
            channel,
            lane,
            slot: allocation.slot,
            note,
            waveform: trigger.waveform,
            frequency: trigger.frequency,
            stolen: allocation.stolen,
        })
    }

    /// Release every voice in the channel's lane holding `note`.
    pub fn note_off(&mut self, channel: u8, note: u8, _velocity: u8) -> Option<EventReport> {
        if note > MIDI_MAX {
            trace!("dropping note-off ch{} n{}", channel, note);
            return None;
        }
        let lane = self.config().layout.lane_for(channel)?;
        let released = self.pool.release(lane, note);
        Some(EventReport::NoteReleased { channel, note, released })
    }

    /// Select the waveform future notes on `channel` will use.
    pub fn program_change(&mut self, channel: u8, program: u8) -> Option<EventReport> {
        let waveform = Waveform::from_program(program)?;
        let lane = self.config().layout.lane_for(channel)?;
        self.pool.reassign_waveform(lane, waveform);
        Some(EventReport::ProgramChanged { channel, waveform })
    }

    /// Deactivate every voice.
    pub fn all_notes_off(&mut self) {
        self.pool.release_all();
    }
}
