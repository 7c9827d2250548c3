//! Lock-free SPSC ring between the sample clock and a device callback.

use ct_engine::Frame;
use ringbuf::traits::{Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::traits::{AudioError, AudioSink};

/// Failed pushes to spin through before yielding the thread.
const SPINS_BEFORE_YIELD: u32 = 64;

/// Failed pushes after which the writer sleeps between retries.
const YIELDS_BEFORE_SLEEP: u32 = SPINS_BEFORE_YIELD + 64;

/// Sleep between retries on a ring that stays full.
const FULL_RING_SLEEP: Duration = Duration::from_micros(250);

/// Producer half of a frame ring. Writes block while the ring is full.
pub struct RingSink {
    producer: HeapProd<Frame>,
    sample_rate: u32,
    open: Arc<AtomicBool>,
}

impl RingSink {
    /// Create a ring holding `capacity` frames; the consumer half goes to the reader.
    pub fn new(sample_rate: u32, capacity: usize) -> (Self, HeapCons<Frame>) {
        let (producer, consumer) = HeapRb::<Frame>::new(capacity.max(1)).split();
        let sink = Self {
            producer,
            sample_rate,
            open: Arc::new(AtomicBool::new(true)),
        };
        (sink, consumer)
    }

    /// Flag the reader side clears to release a blocked writer.
    pub fn open_flag(&self) -> Arc<AtomicBool> {
        self.open.clone()
    }

    /// Frames currently queued.
    pub fn queued(&self) -> usize {
        self.producer.occupied_len()
    }

    pub fn capacity(&self) -> usize {
        self.producer.capacity().get()
    }
}

impl AudioSink for RingSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write_frame(&mut self, frame: Frame) -> Result<(), AudioError> {
        let mut spins = 0u32;
        while self.producer.try_push(frame).is_err() {
            if !self.open.load(Ordering::Acquire) {
                return Err(AudioError::Closed);
            }
            spins = spins.saturating_add(1);
            if spins < SPINS_BEFORE_YIELD {
                std::hint::spin_loop();
            } else if spins < YIELDS_BEFORE_SLEEP {
                thread::yield_now();
            } else {
                thread::sleep(FULL_RING_SLEEP);
            }
        }
        Ok(())
    }

    fn release_handle(&self) -> Option<Arc<AtomicBool>> {
        Some(self.open.clone())
    }
}
