//! Engine configuration: pool layout and the behavioral policies the
//! oscillators and mixer are parameterized over.

use core::fmt;

/// Number of external channel ids a note source can address.
pub const MAX_CHANNELS: usize = 16;

/// Upper bound on voices in one lane.
pub const MAX_VOICES_PER_LANE: usize = 32;

/// Lowest accepted output rate.
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Highest accepted output rate.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Shape of the voice pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One flat lane; every channel id plays into it.
    Single { voices: usize },
    /// One lane per channel id, `channels` lanes of `voices_per_channel` slots.
    Multi { channels: usize, voices_per_channel: usize },
}

impl Layout {
    /// Number of lanes (rows) in the pool.
    pub fn lanes(&self) -> usize {
        match *self {
            Layout::Single { .. } => 1,
            Layout::Multi { channels, .. } => channels,
        }
    }

    /// Number of voice slots per lane.
    pub fn voices_per_lane(&self) -> usize {
        match *self {
            Layout::Single { voices } => voices,
            Layout::Multi { voices_per_channel, .. } => voices_per_channel,
        }
    }

    /// Total voice slots across all lanes.
    pub fn capacity(&self) -> usize {
        self.lanes() * self.voices_per_lane()
    }

    /// Map an external channel id onto a lane.
    ///
    /// Returns `None` for ids outside 0..16, and for ids beyond the lane count
    /// of a multi-channel pool.
    pub fn lane_for(&self, channel: u8) -> Option<usize> {
        let channel = channel as usize;
        if channel >= MAX_CHANNELS {
            return None;
        }
        match *self {
            Layout::Single { .. } => Some(0),
            Layout::Multi { channels, .. } => (channel < channels).then_some(channel),
        }
    }
}

/// Which slot gets reused when a lane is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StealPolicy {
    /// Always slot 0 of the lane.
    #[default]
    FirstSlot,
    /// The slot whose note was triggered longest ago.
    LeastRecentlyTriggered,
}

/// How active voices are combined into one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MixStrategy {
    /// Average each lane over its active voices, then average the sounding lanes.
    ///
    /// Loudness of a single voice does not depend on how many others sound,
    /// but the relative level of each lane does.
    #[default]
    Average,
    /// Sum every active voice, divide by the pool capacity, clamp.
    HeadroomSum,
}

/// Where noise voices take their shift register from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseMode {
    /// Each voice owns a register, reseeded on every trigger.
    #[default]
    PerVoice,
    /// One register for the whole engine. Simultaneous noise voices are correlated.
    Shared,
}

/// How often the noise register is clocked. Sets the audible noise pitch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseRate {
    /// Every 4 ticks (long) / every 2 ticks (short).
    #[default]
    Fast,
    /// Every 8 ticks (long) / every 4 ticks (short).
    Slow,
}

impl NoiseRate {
    /// Ticks between register updates.
    pub fn period(self, short: bool) -> u64 {
        match (self, short) {
            (NoiseRate::Fast, false) => 4,
            (NoiseRate::Fast, true) => 2,
            (NoiseRate::Slow, false) => 8,
            (NoiseRate::Slow, true) => 4,
        }
    }
}

/// Output scaling of the stepped triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriangleMode {
    /// Steps shifted and scaled to span the full bipolar range with zero mean.
    #[default]
    Centered,
    /// Raw `step * A / 15`: unipolar, never negative.
    Stepped,
}

/// Full engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Output frames per second.
    pub sample_rate: u32,
    pub layout: Layout,
    pub steal: StealPolicy,
    pub mix: MixStrategy,
    pub noise: NoiseMode,
    pub noise_rate: NoiseRate,
    pub triangle: TriangleMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            layout: Layout::Single { voices: 8 },
            steal: StealPolicy::default(),
            mix: MixStrategy::default(),
            noise: NoiseMode::default(),
            noise_rate: NoiseRate::default(),
            triangle: TriangleMode::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration with a multi-channel pool and default policies.
    pub fn multi_channel(channels: usize, voices_per_channel: usize) -> Self {
        Self {
            layout: Layout::Multi { channels, voices_per_channel },
            ..Self::default()
        }
    }

    /// Check that the configuration describes a pool the engine can run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        let lanes = self.layout.lanes();
        if lanes == 0 || lanes > MAX_CHANNELS {
            return Err(ConfigError::Channels(lanes));
        }
        let voices = self.layout.voices_per_lane();
        if voices == 0 || voices > MAX_VOICES_PER_LANE {
            return Err(ConfigError::Voices(voices));
        }
        Ok(())
    }
}

/// Rejected configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample rate outside the supported range.
    SampleRate(u32),
    /// Lane count of zero or above the channel limit.
    Channels(usize),
    /// Voices per lane of zero or above the lane limit.
    Voices(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SampleRate(rate) => write!(
                f,
                "sample rate {} Hz outside {}..={} Hz",
                rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            ),
            ConfigError::Channels(n) => {
                write!(f, "channel count {} outside 1..={}", n, MAX_CHANNELS)
            }
            ConfigError::Voices(n) => {
                write!(f, "voice count {} outside 1..={}", n, MAX_VOICES_PER_LANE)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
