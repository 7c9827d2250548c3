//! Sample clock: renders one frame per tick and pushes it to a sink.

use ct_audio::{AudioError, AudioSink};
use ct_engine::Engine;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Drive `engine` into `sink` until `stop` is raised or the sink closes.
///
/// The engine lock is held for one `render_frame` and released before the
/// frame is pushed, so a sink applying backpressure never stalls the event
/// controller. Returns the number of frames delivered.
pub fn run_stream<S: AudioSink + ?Sized>(
    engine: &Mutex<Engine>,
    sink: &mut S,
    stop: &AtomicBool,
    frames: &AtomicU64,
) -> Result<u64, AudioError> {
    let mut delivered = frames.load(Ordering::Relaxed);
    while !stop.load(Ordering::Relaxed) {
        let frame = engine.lock().render_frame();
        sink.write_frame(frame)?;
        delivered += 1;
        frames.store(delivered, Ordering::Relaxed);
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_audio::{CaptureSink, RingSink};
    use ct_engine::{EngineConfig, Frame, NoteEvent};
    use ringbuf::traits::Consumer;
    use std::sync::Arc;
    use std::thread;

    fn shared_engine() -> Arc<Mutex<Engine>> {
        Arc::new(Mutex::new(Engine::new(EngineConfig::default()).unwrap()))
    }

    #[test]
    fn pushes_one_frame_per_tick_until_sink_closes() {
        let engine = shared_engine();
        engine.lock().handle(NoteEvent::NoteOn { channel: 0, note: 69, velocity: 127 });
        let mut sink = CaptureSink::with_limit(44_100, 441);
        let stop = AtomicBool::new(false);
        let frames = AtomicU64::new(0);
        let result = run_stream(&engine, &mut sink, &stop, &frames);
        assert!(matches!(result, Err(AudioError::Closed)));
        assert_eq!(frames.load(Ordering::Relaxed), 441);
        assert_eq!(sink.frames().len(), 441);
        assert_eq!(sink.frames()[0], Frame::mono(32767));
        // One extra frame was rendered for the write that failed.
        assert_eq!(engine.lock().tick(), 442);
    }

    #[test]
    fn stop_flag_ends_loop() {
        let engine = shared_engine();
        let mut sink = CaptureSink::new(44_100);
        let stop = AtomicBool::new(true);
        let frames = AtomicU64::new(0);
        assert_eq!(run_stream(&engine, &mut sink, &stop, &frames).unwrap(), 0);
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn backpressure_never_drops_frames() {
        let engine = shared_engine();
        engine.lock().handle(NoteEvent::NoteOn { channel: 0, note: 81, velocity: 127 });
        let (mut sink, mut consumer) = RingSink::new(44_100, 16);
        let open = sink.open_flag();
        let stop = Arc::new(AtomicBool::new(false));
        let frames = Arc::new(AtomicU64::new(0));

        let clock = {
            let engine = engine.clone();
            let stop = stop.clone();
            let frames = frames.clone();
            thread::spawn(move || run_stream(&engine, &mut sink, &stop, &frames))
        };

        let mut received = Vec::new();
        while received.len() < 2000 {
            if let Some(frame) = consumer.try_pop() {
                received.push(frame);
            } else {
                thread::yield_now();
            }
        }
        stop.store(true, Ordering::Relaxed);
        open.store(false, Ordering::Release);
        let _ = clock.join().unwrap();

        let mut reference = Engine::new(EngineConfig::default()).unwrap();
        reference.handle(NoteEvent::NoteOn { channel: 0, note: 81, velocity: 127 });
        assert_eq!(received, reference.render_frames(2000));
    }
}
