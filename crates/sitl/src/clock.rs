//! Monotonic clock for the host runtime

use agrispray_core::traits::TimeSource;
use tokio::time::Instant;

/// Milliseconds since the clock was created.
///
/// Backed by `tokio::time::Instant`, so paused test time drives it too.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
