//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ct_engine::Frame;
use log::{info, warn};
use ringbuf::traits::Consumer;
use ringbuf::HeapCons;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ring::RingSink;
use crate::traits::{AudioError, AudioSink};

/// CPAL-based audio output fed through a [`RingSink`].
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    ring: RingSink,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device at `sample_rate`.
    ///
    /// Returns the output and the consumer half of its ring, to be handed to
    /// [`CpalOutput::build_stream`].
    pub fn new(sample_rate: u32) -> Result<(Self, HeapCons<Frame>), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // Force stereo output: the stream callback assumes 2-channel interleaving
        config.channels = 2;
        config.sample_rate = SampleRate(sample_rate);

        // About 100ms of buffered frames
        let (ring, consumer) = RingSink::new(sample_rate, (sample_rate / 10) as usize);

        if let Ok(name) = device.name() {
            info!(
                "audio output: {} at {} Hz, {} frame buffer",
                name,
                sample_rate,
                ring.capacity()
            );
        }

        let output = Self {
            device,
            config,
            stream: None,
            ring,
            running: Arc::new(AtomicBool::new(false)),
        };

        Ok((output, consumer))
    }

    /// Build and start the audio stream.
    pub fn build_stream(&mut self, mut consumer: HeapCons<Frame>) -> Result<(), AudioError> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;

        let stream = self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    for chunk in data.chunks_mut(channels) {
                        let (left, right) = consumer
                            .try_pop()
                            .map_or((0.0, 0.0), Frame::to_f32);
                        // Write stereo pair; zero-fill any extra channels
                        for (i, sample) in chunk.iter_mut().enumerate() {
                            *sample = match i {
                                0 => left,
                                1 => right,
                                _ => 0.0,
                            };
                        }
                    }
                },
                |err| warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }
}

impl AudioSink for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write_frame(&mut self, frame: Frame) -> Result<(), AudioError> {
        self.ring.write_frame(frame)
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.ring.open_flag().store(true, Ordering::Release);
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        // Release a writer blocked on a ring nobody drains anymore
        self.ring.open_flag().store(false, Ordering::Release);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn release_handle(&self) -> Option<Arc<AtomicBool>> {
        self.ring.release_handle()
    }
}
