//! Score: events stamped with frame offsets, consumed in order.

use alloc::vec::Vec;

use crate::event::NoteEvent;
use crate::frame::Frame;
use crate::mixer::Engine;

/// An event scheduled at a frame offset from the start of playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedEvent {
    pub frame: u64,
    pub event: NoteEvent,
}

/// Events sorted by frame. Insertion order is kept between events on the same frame.
///
/// Playback reads through a cursor without removing elements, so a score can
/// be replayed after [`Score::rewind`].
#[derive(Clone, Debug, Default)]
pub struct Score {
    events: Vec<TimedEvent>,
    cursor: usize,
}

impl Score {
    pub fn new() -> Self {
        Self { events: Vec::new(), cursor: 0 }
    }

    /// Insert an event, after any already scheduled on the same frame.
    pub fn push(&mut self, frame: u64, event: NoteEvent) {
        let pos = self.events.partition_point(|e| e.frame <= frame);
        self.events.insert(pos, TimedEvent { frame, event });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Frame of the last event (0 for an empty score).
    pub fn end_frame(&self) -> u64 {
        self.events.last().map_or(0, |e| e.frame)
    }

    /// Whether every event has been consumed.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Consume and return the events due at or before `frame`.
    pub fn drain_until(&mut self, frame: u64) -> &[TimedEvent] {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].frame <= frame {
            self.cursor += 1;
        }
        &self.events[start..self.cursor]
    }

    /// Reset the cursor to the first event.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Render the score from the start through `end_frame() + tail` frames.
    ///
    /// Events due at frame `n` are applied before frame `n` is mixed.
    pub fn render(&mut self, engine: &mut Engine, tail: u64) -> Vec<Frame> {
        self.rewind();
        let total = self.end_frame() + tail;
        let mut frames = Vec::with_capacity(total as usize);
        for frame in 0..total {
            for timed in self.drain_until(frame) {
                engine.handle(timed.event);
            }
            frames.push(engine.render_frame());
        }
        frames
    }
}
