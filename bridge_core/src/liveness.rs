//! Input liveness: has a valid datagram arrived within the last second?
//!
//! The ingress worker calls `touch` after each successful parse; the output
//! worker calls `evaluate` once per tick. `evaluate` is the only writer of the
//! timed-out flag and reports a `Transition` only when the flag flips.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bridge_traits::clock::Clock;

/// Silence longer than this freezes output.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    TimedOut,
    Recovered,
}

pub struct Liveness {
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    last_ok_ms: AtomicU64,
    timed_out: AtomicBool,
    threshold_ms: u64,
}

impl std::fmt::Debug for Liveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Liveness")
            .field("last_ok_ms", &self.last_ok_ms.load(Ordering::Relaxed))
            .field("timed_out", &self.timed_out.load(Ordering::Relaxed))
            .field("threshold_ms", &self.threshold_ms)
            .finish()
    }
}

impl Liveness {
    /// Starts live, as if a sample had just arrived.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self::with_threshold(clock, LIVENESS_TIMEOUT)
    }

    pub fn with_threshold(clock: Arc<dyn Clock + Send + Sync>, threshold: Duration) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            last_ok_ms: AtomicU64::new(0),
            timed_out: AtomicBool::new(false),
            threshold_ms: u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Record a successful ingestion now.
    pub fn touch(&self) {
        let now = self.clock.ms_since(self.epoch);
        self.last_ok_ms.store(now, Ordering::Release);
    }

    /// Milliseconds since the last successful ingestion.
    pub fn silent_for_ms(&self) -> u64 {
        let now = self.clock.ms_since(self.epoch);
        now.saturating_sub(self.last_ok_ms.load(Ordering::Acquire))
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    /// Re-derive the timed-out flag; returns the transition if it flipped.
    pub fn evaluate(&self) -> Option<Transition> {
        let silent_ms = self.silent_for_ms();
        let expired = silent_ms > self.threshold_ms;
        let was = self.timed_out.swap(expired, Ordering::AcqRel);
        match (was, expired) {
            (false, true) => {
                tracing::warn!(silent_ms, "input timed out; pausing control output");
                Some(Transition::TimedOut)
            }
            (true, false) => {
                tracing::info!("input resumed; control output continues");
                Some(Transition::Recovered)
            }
            _ => None,
        }
    }
}
