//! VoicePool: fixed lanes of voice slots, allocation, release and the
//! per-lane waveform assignment.

use alloc::vec;
use alloc::vec::Vec;

use crate::config::{Layout, StealPolicy};
use crate::oscillator::Waveform;
use crate::voice::{Trigger, Voice};

/// Index of a voice slot within its lane.
pub type SlotId = usize;

/// Result of seating a note in a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub slot: SlotId,
    /// The slot was still sounding and has been cut off.
    pub stolen: bool,
}

/// `lanes × voices_per_lane` voice slots, stored lane-major.
pub struct VoicePool {
    slots: Vec<Voice>,
    programs: Vec<Waveform>,
    voices_per_lane: usize,
    steal: StealPolicy,
    /// Trigger counter, handed to each new voice.
    serial: u64,
}

impl VoicePool {
    /// Create a pool with every voice inactive and every lane on `Square`.
    pub fn new(layout: Layout, steal: StealPolicy) -> Self {
        Self {
            slots: vec![Voice::new(); layout.capacity()],
            programs: vec![Waveform::default(); layout.lanes()],
            voices_per_lane: layout.voices_per_lane(),
            steal,
            serial: 0,
        }
    }

    pub fn lanes(&self) -> usize {
        self.programs.len()
    }

    pub fn voices_per_lane(&self) -> usize {
        self.voices_per_lane
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// All voices of one lane (empty for an unknown lane).
    pub fn lane(&self, lane: usize) -> &[Voice] {
        match self.lane_range(lane) {
            Some(r) => &self.slots[r],
            None => &[],
        }
    }

    pub(crate) fn lane_mut(&mut self, lane: usize) -> &mut [Voice] {
        match self.lane_range(lane) {
            Some(r) => &mut self.slots[r],
            None => &mut [],
        }
    }

    fn lane_range(&self, lane: usize) -> Option<core::ops::Range<usize>> {
        (lane < self.lanes()).then(|| {
            let start = lane * self.voices_per_lane;
            start..start + self.voices_per_lane
        })
    }

    /// Every slot in lane-major order.
    pub fn voices(&self) -> impl Iterator<Item = &Voice> + '_ {
        self.slots.iter()
    }

    pub fn get(&self, lane: usize, slot: SlotId) -> Option<&Voice> {
        self.lane(lane).get(slot)
    }

    /// Pick the slot a new note in `lane` goes to: the first inactive one,
    /// or the steal victim when the lane is full.
    pub fn allocate(&self, lane: usize) -> Option<Allocation> {
        let voices = self.lane(lane);
        if voices.is_empty() {
            return None;
        }
        if let Some(slot) = voices.iter().position(|v| !v.active) {
            return Some(Allocation { slot, stolen: false });
        }
        Some(Allocation { slot: self.steal_candidate(voices), stolen: true })
    }

    fn steal_candidate(&self, voices: &[Voice]) -> SlotId {
        match self.steal {
            StealPolicy::FirstSlot => 0,
            StealPolicy::LeastRecentlyTriggered => voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.serial)
                .map(|(i, _)| i)
                .unwrap_or(0),
        }
    }

    /// Allocate a slot in `lane` and seed it with `trigger`.
    pub fn trigger(&mut self, lane: usize, trigger: &Trigger, sample_rate: u32) -> Option<Allocation> {
        let allocation = self.allocate(lane)?;
        self.serial = self.serial.wrapping_add(1);
        let serial = self.serial;
        let voice = &mut self.lane_mut(lane)[allocation.slot];
        voice.trigger(trigger, sample_rate, serial);
        Some(allocation)
    }

    /// Deactivate every active voice in `lane` holding `note`. Returns how many.
    pub fn release(&mut self, lane: usize, note: u8) -> usize {
        let mut released = 0;
        for voice in self.lane_mut(lane).iter_mut().filter(|v| v.active && v.note == note) {
            voice.release();
            released += 1;
        }
        released
    }

    /// Waveform new notes in `lane` will snapshot.
    pub fn waveform(&self, lane: usize) -> Option<Waveform> {
        self.programs.get(lane).copied()
    }

    /// Change the lane's waveform assignment. Sounding voices keep theirs.
    pub fn reassign_waveform(&mut self, lane: usize, waveform: Waveform) -> bool {
        match self.programs.get_mut(lane) {
            Some(program) => {
                *program = waveform;
                true
            }
            None => false,
        }
    }

    /// Count of active voices across all lanes.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|v| v.active).count()
    }

    /// Deactivate every voice.
    pub fn release_all(&mut self) {
        for voice in &mut self.slots {
            voice.release();
        }
    }
}
