//! Common time/period helpers for bridge_core.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Tick period for a rate in Hz, at least 1 microsecond.
/// Non-finite or non-positive rates fall back to one tick per second.
#[inline]
pub fn period_for_hz(hz: f64) -> Duration {
    if !(hz.is_finite() && hz > 0.0) {
        return Duration::from_secs(1);
    }
    let us = (MICROS_PER_SEC as f64 / hz).round().max(1.0);
    Duration::from_micros(us as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_matches_rate() {
        assert_eq!(period_for_hz(1.0), Duration::from_secs(1));
        assert_eq!(period_for_hz(60.0), Duration::from_micros(16_667));
        assert_eq!(period_for_hz(2.5), Duration::from_millis(400));
    }

    #[test]
    fn period_floors_and_guards() {
        assert_eq!(period_for_hz(1e9), Duration::from_micros(1));
        assert_eq!(period_for_hz(0.0), Duration::from_secs(1));
        assert_eq!(period_for_hz(f64::NAN), Duration::from_secs(1));
    }
}
