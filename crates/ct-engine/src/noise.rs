//! 15-bit linear-feedback shift register for the noise waveforms.

use crate::config::NoiseRate;
use crate::oscillator::AMPLITUDE;

/// Power-on register value.
pub const LFSR_SEED: u16 = 1;

const LFSR_MASK: u16 = 0x7FFF;

/// Feedback tap (besides bit 0) for long-period noise.
const LONG_TAP: u16 = 1;

/// Feedback tap (besides bit 0) for short-period noise.
const SHORT_TAP: u16 = 6;

/// Noise shift register. The state is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lfsr {
    state: u16,
}

impl Lfsr {
    /// Create a register from a seed; a zero seed falls back to [`LFSR_SEED`].
    pub const fn new(seed: u16) -> Self {
        let state = seed & LFSR_MASK;
        Self {
            state: if state == 0 { LFSR_SEED } else { state },
        }
    }

    /// Deterministic seed for the `serial`-th trigger of the engine.
    pub fn for_trigger(serial: u64) -> Self {
        let mixed = serial.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new((mixed >> 49) as u16)
    }

    pub fn state(&self) -> u16 {
        self.state
    }

    /// Shift once: feedback is bit 0 XOR the tap bit, inserted at bit 14.
    pub fn step(&mut self, short: bool) {
        let tap = if short { SHORT_TAP } else { LONG_TAP };
        let feedback = (self.state ^ (self.state >> tap)) & 1;
        self.state = (self.state >> 1) | (feedback << 14);
    }

    /// Step if `tick` is on an update boundary for the given rate.
    /// Returns whether the register moved.
    pub fn clock(&mut self, tick: u64, short: bool, rate: NoiseRate) -> bool {
        if tick % rate.period(short) == 0 {
            self.step(short);
            true
        } else {
            false
        }
    }

    /// Current output bit (bit 0).
    pub fn bit(&self) -> bool {
        self.state & 1 != 0
    }

    /// `+A` when bit 0 is set, `-A` otherwise.
    pub fn output(&self) -> f32 {
        if self.bit() {
            AMPLITUDE
        } else {
            -AMPLITUDE
        }
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new(LFSR_SEED)
    }
}

/// Engine-wide registers for shared noise mode, one per noise kind.
///
/// Every voice of a kind reads the same register, so simultaneous voices of
/// that kind are correlated. The two kinds never disturb each other's period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SharedNoise {
    pub long: Lfsr,
    pub short: Lfsr,
}

impl SharedNoise {
    pub fn register(&self, short: bool) -> &Lfsr {
        if short {
            &self.short
        } else {
            &self.long
        }
    }

    /// Clock each sounding kind's register on its own update boundary.
    pub fn clock(&mut self, tick: u64, long: bool, short: bool, rate: NoiseRate) {
        if long {
            self.long.clock(tick, false, rate);
        }
        if short {
            self.short.clock(tick, true, rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_is_replaced() {
        assert_eq!(Lfsr::new(0).state(), LFSR_SEED);
        assert_eq!(Lfsr::new(0x8000).state(), LFSR_SEED);
    }

    #[test]
    fn long_step_from_seed() {
        // bit0 = 1, bit1 = 0 -> feedback 1
        let mut lfsr = Lfsr::new(1);
        lfsr.step(false);
        assert_eq!(lfsr.state(), 0x4000);
        assert!(!lfsr.bit());
    }

    #[test]
    fn short_step_uses_bit_six() {
        let mut lfsr = Lfsr::new(0b100_0001);
        lfsr.step(true);
        // bit0 ^ bit6 = 0, so bit 14 stays clear
        assert_eq!(lfsr.state(), 0b10_0000);
        let mut lfsr = Lfsr::new(0b100_0001);
        lfsr.step(false);
        // bit0 ^ bit1 = 1
        assert_eq!(lfsr.state(), 0x4000 | 0b10_0000);
    }

    #[test]
    fn state_stays_fifteen_bits_and_nonzero() {
        for short in [false, true] {
            let mut lfsr = Lfsr::default();
            for _ in 0..40_000 {
                lfsr.step(short);
                assert_ne!(lfsr.state(), 0);
                assert_eq!(lfsr.state() & !LFSR_MASK, 0);
            }
        }
    }

    #[test]
    fn long_sequence_has_maximal_period() {
        let start = Lfsr::default();
        let mut lfsr = start;
        let mut period = 0u32;
        loop {
            lfsr.step(false);
            period += 1;
            if lfsr == start {
                break;
            }
        }
        assert_eq!(period, 32_767);
    }

    #[test]
    fn clock_only_moves_on_boundaries() {
        let mut lfsr = Lfsr::default();
        let mut moved = Vec::new();
        for tick in 0..12 {
            if lfsr.clock(tick, false, NoiseRate::Fast) {
                moved.push(tick);
            }
        }
        assert_eq!(moved, vec![0, 4, 8]);

        let mut lfsr = Lfsr::default();
        let moved: Vec<u64> = (0..9).filter(|t| lfsr.clock(*t, true, NoiseRate::Slow)).collect();
        assert_eq!(moved, vec![0, 4, 8]);
    }

    #[test]
    fn trigger_seeds_differ() {
        let a = Lfsr::for_trigger(1);
        let b = Lfsr::for_trigger(2);
        assert_ne!(a, b);
        assert_eq!(Lfsr::for_trigger(7), Lfsr::for_trigger(7));
    }

    #[test]
    fn shared_kinds_clock_independently() {
        let mut shared = SharedNoise::default();
        let mut long = Lfsr::default();
        let mut short = Lfsr::default();
        for tick in 0..64 {
            shared.clock(tick, true, true, NoiseRate::Fast);
            long.clock(tick, false, NoiseRate::Fast);
            short.clock(tick, true, NoiseRate::Fast);
            assert_eq!(*shared.register(false), long);
            assert_eq!(*shared.register(true), short);
        }
    }

    #[test]
    fn silent_kind_holds_its_register() {
        let mut shared = SharedNoise::default();
        for tick in 0..16 {
            shared.clock(tick, false, true, NoiseRate::Slow);
        }
        assert_eq!(shared.long, Lfsr::default());
        assert_ne!(shared.short, Lfsr::default());
    }
}
