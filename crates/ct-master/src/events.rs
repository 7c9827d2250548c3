//! Event controller thread and the wall-clock score player feeding it.

use crossbeam_channel::{select, Receiver, Sender};
use ct_engine::{Engine, NoteEvent, Score};
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::status::StatusBoard;

/// Longest sleep between checks of the player's stop flag.
const PLAYER_POLL: Duration = Duration::from_millis(10);

/// Apply one event under the engine lock and publish its report.
pub fn apply_event(engine: &Mutex<Engine>, event: NoteEvent, status: &StatusBoard) {
    let report = engine.lock().handle(event);
    match report {
        Some(report) => {
            debug!("{:?}: {}", event, report);
            status.publish(&report);
        }
        None => debug!("ignored {:?}", event),
    }
}

/// Apply events one at a time until `shutdown` disconnects or every event
/// sender is gone.
pub fn run_events(
    engine: &Mutex<Engine>,
    events: Receiver<NoteEvent>,
    shutdown: Receiver<()>,
    status: &StatusBoard,
) {
    loop {
        select! {
            recv(events) -> msg => match msg {
                Ok(event) => apply_event(engine, event, status),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }
    debug!("event controller exited");
}

/// Convert a frame offset to wall-clock time at `sample_rate`.
pub fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(frames as f64 / sample_rate.max(1) as f64)
}

/// Send each score event when its frame offset comes due, measured from now.
///
/// Returns early when `stop` is raised or the receiver is gone.
pub fn play_score(score: &Score, sample_rate: u32, events: &Sender<NoteEvent>, stop: &AtomicBool) {
    let start = Instant::now();
    for timed in score.events() {
        let due = start + frames_to_duration(timed.frame, sample_rate);
        loop {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let now = Instant::now();
            if now >= due {
                break;
            }
            thread::sleep((due - now).min(PLAYER_POLL));
        }
        if events.send(timed.event).is_err() {
            return;
        }
    }
}
