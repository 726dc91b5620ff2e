//! Wave difficulty curve
//!
//! A pure function of the wave index: travel time shrinks geometrically down
//! to a floor, and one more balloon joins every `increase_every` waves.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::*;

/// Parameters for one wave. Never mutated once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Wave index (0-based)
    pub index: u32,
    /// Balloons launched in this wave
    pub count: u32,
    /// Time to reach the top before per-balloon jitter (seconds)
    pub travel_secs: f32,
    /// Launch offset between consecutive balloons
    pub stagger_ms: Millis,
    /// Wait before this wave launches (seconds)
    pub delay_secs: f32,
}

impl Wave {
    /// Launch offset of the balloon at `slot` (0-based) from the wave start
    #[inline]
    pub fn launch_offset(&self, slot: u32) -> Millis {
        u64::from(slot) * self.stagger_ms
    }
}

/// Difficulty tuning. Defaults match the shipped game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyCurve {
    pub base_count: u32,
    pub increase_every: u32,
    pub decay: f32,
    pub min_travel_secs: f32,
    pub stagger_ms: Millis,
    pub jitter_pct: f32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_count: BASE_BALLOON_COUNT,
            increase_every: COUNT_INCREASE_EVERY,
            decay: TRAVEL_DECAY,
            min_travel_secs: MIN_TRAVEL_SECS,
            stagger_ms: LAUNCH_STAGGER_MS,
            jitter_pct: TRAVEL_JITTER_PCT,
        }
    }
}

impl DifficultyCurve {
    /// Balloon count for a wave
    pub fn count_for(&self, wave_index: u32) -> u32 {
        self.base_count + wave_index / self.increase_every.max(1)
    }

    /// Travel time for a wave, starting from `base_travel_secs` at wave 0
    pub fn travel_for(&self, wave_index: u32, base_travel_secs: f32) -> f32 {
        let exponent = i32::try_from(wave_index).unwrap_or(i32::MAX);
        (base_travel_secs * self.decay.powi(exponent)).max(self.min_travel_secs)
    }

    /// Parameters for `wave_index`. The inter-wave delay equals the travel time.
    pub fn next_wave(&self, wave_index: u32, base_travel_secs: f32) -> Wave {
        let travel_secs = self.travel_for(wave_index, base_travel_secs);
        Wave {
            index: wave_index,
            count: self.count_for(wave_index),
            travel_secs,
            stagger_ms: self.stagger_ms,
            delay_secs: travel_secs,
        }
    }

    /// Per-balloon travel time: `travel_secs` varied by up to ±`jitter_pct`
    pub fn jittered_travel<R: Rng + ?Sized>(&self, travel_secs: f32, rng: &mut R) -> f32 {
        vary_by(travel_secs, self.jitter_pct, rng)
    }
}

/// Vary `value` by a uniformly random factor in `[1 - pct, 1 + pct]`
pub fn vary_by<R: Rng + ?Sized>(value: f32, pct: f32, rng: &mut R) -> f32 {
    let pct = pct.abs();
    if pct == 0.0 {
        return value;
    }
    value * (1.0 + rng.random_range(-pct..=pct))
}

/// Convert seconds to whole milliseconds
#[inline]
pub fn secs_to_millis(secs: f32) -> Millis {
    (secs.max(0.0) * 1000.0).round() as Millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_first_wave_matches_base() {
        let curve = DifficultyCurve::default();
        let wave = curve.next_wave(0, BASE_TRAVEL_SECS);
        assert_eq!(wave.count, BASE_BALLOON_COUNT);
        assert!((wave.travel_secs - BASE_TRAVEL_SECS).abs() < f32::EPSILON);
        assert_eq!(wave.delay_secs, wave.travel_secs);
    }

    #[test]
    fn test_count_steps_at_interval() {
        let curve = DifficultyCurve::default();
        let w4 = curve.next_wave(4, BASE_TRAVEL_SECS);
        let w5 = curve.next_wave(5, BASE_TRAVEL_SECS);
        assert_eq!(w5.count, w4.count + 1);
        assert_eq!(w4.count, curve.base_count);
    }

    #[test]
    fn test_travel_hits_floor() {
        let curve = DifficultyCurve::default();
        let late = curve.next_wave(10_000, BASE_TRAVEL_SECS);
        assert_eq!(late.travel_secs, curve.min_travel_secs);
    }

    #[test]
    fn test_launch_offsets() {
        let wave = DifficultyCurve::default().next_wave(3, BASE_TRAVEL_SECS);
        assert_eq!(wave.launch_offset(0), 0);
        assert_eq!(wave.launch_offset(1), LAUNCH_STAGGER_MS);
        assert_eq!(wave.launch_offset(4), 4 * LAUNCH_STAGGER_MS);
    }

    #[test]
    fn test_secs_to_millis() {
        assert_eq!(secs_to_millis(2.0), 2000);
        assert_eq!(secs_to_millis(1.95), 1950);
        assert_eq!(secs_to_millis(-1.0), 0);
    }

    proptest! {
        #[test]
        fn prop_travel_strictly_decreasing_until_floor(n in 0u32..2_000) {
            let curve = DifficultyCurve::default();
            let a = curve.travel_for(n, BASE_TRAVEL_SECS);
            let b = curve.travel_for(n + 1, BASE_TRAVEL_SECS);
            if a > curve.min_travel_secs {
                prop_assert!(b < a);
            } else {
                prop_assert_eq!(b, curve.min_travel_secs);
            }
        }

        #[test]
        fn prop_count_non_decreasing(n in 0u32..10_000) {
            let curve = DifficultyCurve::default();
            let a = curve.count_for(n);
            let b = curve.count_for(n + 1);
            if (n + 1) % curve.increase_every == 0 {
                prop_assert_eq!(b, a + 1);
            } else {
                prop_assert_eq!(b, a);
            }
        }

        #[test]
        fn prop_jitter_is_bounded(seed in any::<u64>(), travel in 0.25f32..5.0) {
            let curve = DifficultyCurve::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let jittered = curve.jittered_travel(travel, &mut rng);
            let bound = travel * curve.jitter_pct + 1e-4;
            prop_assert!((jittered - travel).abs() <= bound);
        }
    }
}
