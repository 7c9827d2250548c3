//! Headless controller for the chiptone synth.
//!
//! Owns the shared engine and the two loops around it: the event controller
//! thread, always running, and the sample clock thread, started by one of the
//! `play_*` methods. The CLI drives everything through [`Controller`].

mod events;
mod midi;
mod status;
mod stream;
mod tour;
mod wav;

use crossbeam_channel::{unbounded, SendError, Sender};
use ct_audio::{AudioError, AudioSink, CpalOutput};
use ct_engine::{ConfigError, Engine};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// Re-export common types so callers don't need ct-engine directly.
pub use ct_engine::{
    EngineConfig, EventReport, Frame, Layout, MixStrategy, NoiseMode, NoiseRate, NoteEvent, Score,
    StealPolicy, TriangleMode, Waveform,
};

pub use events::{apply_event, frames_to_duration, play_score, run_events};
pub use midi::{connect, list_ports, MidiConnection, MidiError};
pub use status::{StatusBoard, STATUS_CAPACITY};
pub use stream::run_stream;
pub use tour::{tour_tail, waveform_tour, GAP_MS, TONE_MS, TOUR_NOTE};
pub use wav::{frames_to_wav, write_wav};

pub struct Controller {
    config: EngineConfig,
    engine: Arc<Mutex<Engine>>,
    status: Arc<StatusBoard>,
    events: Sender<NoteEvent>,
    shutdown: Option<Sender<()>>,
    event_thread: Option<JoinHandle<()>>,
    playback: Option<PlaybackHandle>,
    player: Option<PlayerHandle>,
}

struct PlaybackHandle {
    control: Arc<StreamControl>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// State shared between the controller and its streaming thread.
#[derive(Default)]
struct StreamControl {
    stop: AtomicBool,
    frames: AtomicU64,
    /// The running sink's release flag, once it has started.
    release: Mutex<Option<Arc<AtomicBool>>>,
}

struct PlayerHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    /// Build the engine and start the event controller thread.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let engine = Arc::new(Mutex::new(Engine::new(config)?));
        let status = Arc::new(StatusBoard::new());
        let (events, rx) = unbounded();
        let (shutdown, shutdown_rx) = unbounded();

        let event_thread = {
            let engine = engine.clone();
            let status = status.clone();
            thread::spawn(move || run_events(&engine, rx, shutdown_rx, &status))
        };

        Ok(Self {
            config,
            engine,
            status,
            events,
            shutdown: Some(shutdown),
            event_thread: Some(event_thread),
            playback: None,
            player: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    // --- Events ---

    /// A sender into the event controller. Note sources (MIDI input, score
    /// players) each hold a clone.
    pub fn sender(&self) -> Sender<NoteEvent> {
        self.events.clone()
    }

    pub fn send(&self, event: NoteEvent) -> Result<(), SendError<NoteEvent>> {
        self.events.send(event)
    }

    /// Text of the most recently applied event.
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn engine(&self) -> &Mutex<Engine> {
        &self.engine
    }

    /// Silence every voice immediately.
    pub fn all_notes_off(&self) {
        self.engine.lock().all_notes_off();
    }

    // --- Real-time playback ---

    /// Stream to the default output device.
    pub fn play_device(&mut self) {
        let sample_rate = self.config.sample_rate;
        self.spawn_playback(move |engine, control| {
            let (mut output, consumer) = CpalOutput::new(sample_rate)?;
            output.build_stream(consumer)?;
            drive(engine, &mut output, control)
        });
    }

    /// Stream into any sink, e.g. a [`ct_audio::RingSink`] read elsewhere.
    pub fn play_to<S: AudioSink + Send + 'static>(&mut self, mut sink: S) {
        self.spawn_playback(move |engine, control| drive(engine, &mut sink, control));
    }

    fn spawn_playback<F>(&mut self, body: F)
    where
        F: FnOnce(&Mutex<Engine>, &StreamControl) -> Result<u64, AudioError> + Send + 'static,
    {
        self.stop_playback();

        let control = Arc::new(StreamControl::default());
        let finished = Arc::new(AtomicBool::new(false));

        let engine = self.engine.clone();
        let shared = control.clone();
        let done = finished.clone();

        let thread = thread::spawn(move || {
            match body(&*engine, &shared) {
                Ok(n) => info!("stream stopped after {} frames", n),
                Err(AudioError::Closed) => info!("sink closed"),
                Err(e) => warn!("stream ended: {}", e),
            }
            done.store(true, Ordering::Relaxed);
        });

        self.playback = Some(PlaybackHandle {
            control,
            finished,
            thread: Some(thread),
        });
    }

    /// Stop the score player and the sample clock.
    pub fn stop(&mut self) {
        self.stop_player();
        self.stop_playback();
    }

    fn stop_playback(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.control.stop.store(true, Ordering::Relaxed);
            // A writer blocked on a sink nobody drains only wakes through its release flag.
            if let Some(open) = pb.control.release.lock().as_ref() {
                open.store(false, Ordering::Release);
            }
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    fn stop_player(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = player.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Frames delivered to the current sink.
    pub fn frames_rendered(&self) -> u64 {
        self.playback
            .as_ref()
            .map_or(0, |p| p.control.frames.load(Ordering::Relaxed))
    }

    // --- Score playback ---

    /// Feed `score` into the event controller in wall-clock time.
    pub fn play_score(&mut self, score: Score) {
        self.stop_player();

        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let sender = self.events.clone();
        let sample_rate = self.config.sample_rate;
        let stop = stop_signal.clone();
        let done = finished.clone();

        let thread = thread::spawn(move || {
            play_score(&score, sample_rate, &sender, &stop);
            done.store(true, Ordering::Relaxed);
        });

        self.player = Some(PlayerHandle {
            stop_signal,
            finished,
            thread: Some(thread),
        });
    }

    /// Whether the last score handed to [`Controller::play_score`] has sent every event.
    pub fn is_score_finished(&self) -> bool {
        self.player
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    // --- Offline rendering ---

    /// Render `score` plus `tail` frames on a fresh engine with this configuration.
    pub fn render_score(&self, score: &Score, tail: u64) -> Result<Vec<Frame>, ConfigError> {
        let mut engine = Engine::new(self.config)?;
        Ok(score.clone().render(&mut engine, tail))
    }

    pub fn render_to_wav(&self, score: &Score, tail: u64) -> Result<Vec<u8>, ConfigError> {
        let frames = self.render_score(score, tail)?;
        Ok(frames_to_wav(&frames, self.config.sample_rate))
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
        self.shutdown.take();
        if let Some(handle) = self.event_thread.take() {
            let _ = handle.join();
        }
    }
}

fn drive<S: AudioSink + ?Sized>(
    engine: &Mutex<Engine>,
    sink: &mut S,
    control: &StreamControl,
) -> Result<u64, AudioError> {
    sink.start()?;
    // Published after start, which reopens the flag; a stop racing this is
    // seen by `run_stream` before its first write.
    *control.release.lock() = sink.release_handle();
    info!("streaming at {} Hz", sink.sample_rate());
    let result = run_stream(engine, sink, &control.stop, &control.frames);
    let stopped = sink.stop();
    let delivered = result?;
    stopped?;
    Ok(delivered)
}
