//! Status board: the text line describing the most recent applied event.

use arrayvec::ArrayString;
use ct_engine::EventReport;
use parking_lot::Mutex;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Longest status line kept; longer text is cut.
pub const STATUS_CAPACITY: usize = 64;

const IDLE: &str = "idle";

/// Best-effort, observation-only status text. Nothing in the engine reads it.
pub struct StatusBoard {
    line: Mutex<ArrayString<STATUS_CAPACITY>>,
    updates: AtomicU64,
}

impl StatusBoard {
    pub fn new() -> Self {
        let mut line = ArrayString::new();
        line.push_str(IDLE);
        Self {
            line: Mutex::new(line),
            updates: AtomicU64::new(0),
        }
    }

    /// Replace the line with a report's text.
    pub fn publish(&self, report: &EventReport) {
        let mut line = self.line.lock();
        line.clear();
        // Overflow leaves the prefix that fit.
        let _ = write!(line, "{}", report);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Current line.
    pub fn line(&self) -> String {
        self.line.lock().as_str().to_owned()
    }

    /// How many reports have been published.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
