//! Tick Time Base
//!
//! Gameplay timers count whole ticks. Durations are authored in seconds as
//! `Fixed` and converted against the tick rate when compared, so a 2.0 s
//! cooldown at 60 Hz is exactly 120 ticks.

use crate::core::fixed::{Fixed, FIXED_ONE, FIXED_SCALE};

/// Authoritative ticks per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickRate(u32);

impl TickRate {
    /// Tick rate in Hz. Zero is treated as 1 Hz.
    pub const fn new(hz: u32) -> Self {
        Self(if hz == 0 { 1 } else { hz })
    }

    /// Ticks per second.
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// Whole ticks needed for `seconds` to elapse, rounded up.
    ///
    /// A duration within one `Fixed` unit of a tick boundary lands on that
    /// boundary, so `to_fixed(0.1)` at 60 Hz is 6 ticks, not 7.
    pub fn ticks(self, seconds: Fixed) -> u32 {
        if seconds <= 0 {
            return 0;
        }
        let rate = self.0 as i64;
        let scaled = (seconds as i64 * rate - rate).max(0);
        let ticks = (scaled + FIXED_ONE as i64 - 1) >> FIXED_SCALE;
        ticks.min(u32::MAX as i64) as u32
    }

    /// Distance covered at `speed` units/s over `ticks` ticks, as wide
    /// Q16.16. Exact up to the final truncation.
    pub fn distance_wide(self, speed: Fixed, ticks: u32) -> i64 {
        speed as i64 * ticks as i64 / self.0 as i64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::new(crate::TICK_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};

    #[test]
    fn test_whole_seconds_are_exact() {
        let rate = TickRate::new(60);
        assert_eq!(rate.ticks(from_int(1)), 60);
        assert_eq!(rate.ticks(from_int(2)), 120);
        assert_eq!(rate.ticks(from_int(5)), 300);
    }

    #[test]
    fn test_truncated_fractions_round_to_boundary() {
        let rate = TickRate::new(60);
        assert_eq!(rate.ticks(to_fixed(0.25)), 15);
        assert_eq!(rate.ticks(to_fixed(0.1)), 6);
        assert_eq!(rate.ticks(to_fixed(0.3)), 18);
        // Between boundaries rounds up
        assert_eq!(rate.ticks(to_fixed(0.02)), 2);
    }

    #[test]
    fn test_non_positive_durations() {
        let rate = TickRate::new(60);
        assert_eq!(rate.ticks(0), 0);
        assert_eq!(rate.ticks(-FIXED_ONE), 0);
        assert_eq!(rate.ticks(1), 0);
    }

    #[test]
    fn test_distance() {
        let rate = TickRate::new(60);
        assert_eq!(rate.distance_wide(from_int(10), 300), from_int(50) as i64);
        assert_eq!(rate.distance_wide(from_int(300), 1), from_int(5) as i64);
        assert_eq!(TickRate::new(4).distance_wide(from_int(10), 1), to_fixed(2.5) as i64);
    }

    #[test]
    fn test_zero_rate() {
        assert_eq!(TickRate::new(0).hz(), 1);
        assert_eq!(TickRate::default().hz(), 60);
    }
}
