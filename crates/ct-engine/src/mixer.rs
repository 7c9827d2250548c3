//! Engine: the voice pool plus the per-tick mixer.

use alloc::vec::Vec;

use crate::config::{ConfigError, EngineConfig, MixStrategy, NoiseMode};
use crate::frame::{to_pcm, Frame};
use crate::noise::SharedNoise;
use crate::oscillator::Waveform;
use crate::voice::RenderContext;
use crate::voice_pool::VoicePool;

/// The synthesis engine.
///
/// Owns every voice slot and the engine-wide noise register. Shared between
/// the sample clock and the event controller behind one lock; nothing in here
/// synchronizes on its own.
pub struct Engine {
    config: EngineConfig,
    pub(crate) pool: VoicePool,
    /// Registers used when noise mode is `Shared`.
    shared_noise: SharedNoise,
    /// Frames rendered so far.
    tick: u64,
}

impl Engine {
    /// Create an engine with every voice inactive.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pool: VoicePool::new(config.layout, config.steal),
            config,
            shared_noise: SharedNoise::default(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Frames rendered since creation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Mix every active voice into one sample and advance their phases.
    pub fn mix_tick(&mut self) -> i16 {
        let strategy = self.config.mix;
        if self.config.noise == NoiseMode::Shared {
            self.clock_shared_noise();
        }
        let ctx = RenderContext {
            triangle: self.config.triangle,
            noise_mode: self.config.noise,
            noise_rate: self.config.noise_rate,
            shared_noise: &self.shared_noise,
        };

        let mut total = 0.0f32;
        let mut sounding_lanes = 0u32;
        for lane in 0..self.pool.lanes() {
            let mut lane_sum = 0.0f32;
            let mut lane_voices = 0u32;
            for voice in self.pool.lane_mut(lane).iter_mut().filter(|v| v.active) {
                lane_sum += voice.render(&ctx);
                voice.advance();
                lane_voices += 1;
            }
            if lane_voices == 0 {
                continue;
            }
            sounding_lanes += 1;
            total += match strategy {
                MixStrategy::Average => lane_sum / lane_voices as f32,
                MixStrategy::HeadroomSum => lane_sum,
            };
        }

        self.tick = self.tick.wrapping_add(1);

        let mixed = match strategy {
            MixStrategy::Average if sounding_lanes == 0 => 0.0,
            MixStrategy::Average => total / sounding_lanes as f32,
            MixStrategy::HeadroomSum => total / self.pool.capacity() as f32,
        };
        to_pcm(mixed)
    }

    /// Clock the engine-wide register of each noise kind that is sounding on this tick.
    fn clock_shared_noise(&mut self) {
        let mut long = false;
        let mut short = false;
        for voice in self.pool.voices().filter(|v| v.active) {
            match voice.waveform {
                Waveform::NoiseLong => long = true,
                Waveform::NoiseShort => short = true,
                _ => {}
            }
        }
        self.shared_noise.clock(self.tick, long, short, self.config.noise_rate);
    }

    /// Generate one stereo frame (mono sample on both channels).
    pub fn render_frame(&mut self) -> Frame {
        Frame::mono(self.mix_tick())
    }

    /// Render `count` frames (allocates; offline use only).
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        (0..count).map(|_| self.render_frame()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, NoiseMode, NoiseRate, TriangleMode};
    use crate::frequency::{advance_phase, phase_increment};
    use crate::noise::Lfsr;
    use crate::oscillator::AMPLITUDE;
    use crate::voice::Trigger;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config).unwrap()
    }

    fn seat(engine: &mut Engine, lane: usize, waveform: Waveform, frequency: f32, volume: f32) {
        let trigger = Trigger { note: 69, frequency, volume, waveform };
        let rate = engine.sample_rate();
        engine.pool.trigger(lane, &trigger, rate).unwrap();
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig { sample_rate: 0, ..EngineConfig::default() };
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn silence_without_voices() {
        let mut e = engine(EngineConfig::default());
        for _ in 0..100 {
            assert_eq!(e.mix_tick(), 0);
        }
        assert_eq!(e.tick(), 100);
    }

    #[test]
    fn headroom_sum_silence_without_voices() {
        let mut e = engine(EngineConfig { mix: MixStrategy::HeadroomSum, ..EngineConfig::default() });
        assert_eq!(e.render_frame(), Frame::silence());
    }

    #[test]
    fn single_square_voice_at_full_volume() {
        let mut e = engine(EngineConfig::default());
        seat(&mut e, 0, Waveform::Square, 440.0, 1.0);
        let inc = phase_increment(440.0, 44_100);
        let mut phase = 0.0f32;
        for n in 0..50 {
            let expected = if phase < 0.5 { 32767 } else { -32767 };
            assert_eq!(e.mix_tick(), expected, "tick {}", n);
            phase = advance_phase(phase, inc);
        }
        let voice = e.pool().get(0, 0).unwrap();
        assert_eq!(voice.phase, phase);
    }

    #[test]
    fn averaging_equal_voices_is_idempotent() {
        let mut e = engine(EngineConfig::default());
        for _ in 0..4 {
            seat(&mut e, 0, Waveform::Square, 1000.0, 0.5);
        }
        assert_eq!(e.mix_tick(), (AMPLITUDE * 0.5) as i16);
    }

    #[test]
    fn averaging_opposite_voices_cancels() {
        let mut e = engine(EngineConfig::default());
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        e.pool.lane_mut(0)[1].phase = 0.75;
        assert_eq!(e.mix_tick(), 0);
    }

    #[test]
    fn quiet_voice_lowers_average() {
        let mut e = engine(EngineConfig::default());
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        seat(&mut e, 0, Waveform::Square, 1000.0, 0.0);
        assert_eq!(e.mix_tick(), (AMPLITUDE / 2.0) as i16);
    }

    #[test]
    fn multi_channel_averages_lanes_then_channels() {
        let mut e = engine(EngineConfig::multi_channel(4, 4));
        // Lane 0: two full-volume voices -> lane mix = A.
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        // Lane 2: one half-volume voice -> lane mix = A/2.
        seat(&mut e, 2, Waveform::Square, 1000.0, 0.5);
        // Silent lanes 1 and 3 do not count.
        let expected = (AMPLITUDE + AMPLITUDE * 0.5) / 2.0;
        assert_eq!(e.mix_tick(), expected as i16);
    }

    #[test]
    fn headroom_sum_divides_by_capacity() {
        let config = EngineConfig {
            layout: Layout::Single { voices: 4 },
            mix: MixStrategy::HeadroomSum,
            ..EngineConfig::default()
        };
        let mut e = engine(config);
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        assert_eq!(e.mix_tick(), (AMPLITUDE / 4.0) as i16);
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        // The first voice is still in its high half.
        assert_eq!(e.mix_tick(), (AMPLITUDE * 2.0 / 4.0) as i16);
    }

    #[test]
    fn inactive_voices_do_not_advance() {
        let mut e = engine(EngineConfig::default());
        seat(&mut e, 0, Waveform::Square, 1000.0, 1.0);
        e.mix_tick();
        e.pool.release(0, 69);
        let phase = e.pool().get(0, 0).unwrap().phase;
        e.mix_tick();
        assert_eq!(e.pool().get(0, 0).unwrap().phase, phase);
    }

    #[test]
    fn noise_output_changes_only_on_update_ticks() {
        for (waveform, rate, period) in [
            (Waveform::NoiseLong, NoiseRate::Fast, 4),
            (Waveform::NoiseShort, NoiseRate::Fast, 2),
            (Waveform::NoiseLong, NoiseRate::Slow, 8),
        ] {
            let mut e = engine(EngineConfig { noise_rate: rate, ..EngineConfig::default() });
            seat(&mut e, 0, waveform, 440.0, 1.0);
            let out = e.render_frames(400);
            let mut changes = 0;
            for n in 1..out.len() {
                if out[n] != out[n - 1] {
                    assert_eq!(n % period, 0, "{:?} changed at tick {}", waveform, n);
                    changes += 1;
                }
            }
            assert!(changes > 0, "{:?} never changed", waveform);
        }
    }

    #[test]
    fn per_voice_noise_is_independent() {
        let mut e = engine(EngineConfig::multi_channel(2, 1));
        seat(&mut e, 0, Waveform::NoiseLong, 440.0, 1.0);
        seat(&mut e, 1, Waveform::NoiseLong, 440.0, 1.0);
        let a = e.pool().get(0, 0).unwrap().noise;
        let b = e.pool().get(1, 0).unwrap().noise;
        assert_ne!(a, b);
    }

    #[test]
    fn shared_noise_correlates_voices() {
        let config = EngineConfig { noise: NoiseMode::Shared, ..EngineConfig::default() };
        let mut e = engine(config);
        seat(&mut e, 0, Waveform::NoiseLong, 440.0, 1.0);
        seat(&mut e, 0, Waveform::NoiseLong, 440.0, 1.0);
        // Both voices read the same register bit every tick, so the average is always ±A.
        for _ in 0..200 {
            assert_eq!(e.mix_tick().unsigned_abs(), 32767);
        }
    }

    #[test]
    fn shared_noise_clocks_on_engine_ticks() {
        let config = EngineConfig { noise: NoiseMode::Shared, ..EngineConfig::default() };
        let mut e = engine(config);
        e.mix_tick();
        seat(&mut e, 0, Waveform::NoiseLong, 440.0, 1.0);
        // Engine ticks 1..=3 are off the boundary even though the voice just started.
        for _ in 0..3 {
            e.mix_tick();
        }
        assert_eq!(e.shared_noise.long, Lfsr::default());
        e.mix_tick();
        assert_ne!(e.shared_noise.long, Lfsr::default());
    }

    #[test]
    fn shared_noise_keeps_each_kind_on_its_own_period() {
        let config = EngineConfig { noise: NoiseMode::Shared, ..EngineConfig::default() };
        let mut e = engine(config);
        // The long voice comes first in the lane but contributes nothing.
        seat(&mut e, 0, Waveform::NoiseLong, 440.0, 0.0);
        seat(&mut e, 0, Waveform::NoiseShort, 440.0, 1.0);
        let mut long = Lfsr::default();
        let mut short = Lfsr::default();
        for tick in 0..200u64 {
            long.clock(tick, false, NoiseRate::Fast);
            short.clock(tick, true, NoiseRate::Fast);
            assert_eq!(e.mix_tick(), to_pcm(short.output() / 2.0), "tick {}", tick);
        }
        assert_eq!(e.shared_noise.long, long);
        assert_eq!(e.shared_noise.short, short);
    }

    #[test]
    fn stepped_triangle_never_goes_negative() {
        let config = EngineConfig { triangle: TriangleMode::Stepped, ..EngineConfig::default() };
        let mut e = engine(config);
        seat(&mut e, 0, Waveform::Triangle, 440.0, 1.0);
        assert!(e.render_frames(500).iter().all(|f| f.left >= 0));
    }

    #[test]
    fn frames_are_mono_duplicated() {
        let mut e = engine(EngineConfig::default());
        seat(&mut e, 0, Waveform::Triangle, 330.0, 0.8);
        for frame in e.render_frames(300) {
            assert_eq!(frame.left, frame.right);
        }
    }
}
