//! Time abstraction for the spray control loop.
//!
//! All protocol timeouts are evaluated by subtracting two readings of a
//! monotonic millisecond counter; there is no separate timer primitive.

use core::cell::Cell;

/// Monotonic millisecond clock.
///
/// # Example
///
/// ```
/// use agrispray_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let sent_at = time.now_ms();
/// time.advance_ms(3_500);
/// assert_eq!(time.elapsed_ms(sent_at), 3_500);
/// ```
pub trait TimeSource {
    /// Milliseconds since an arbitrary, fixed origin (usually boot).
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `since_ms`.
    ///
    /// Saturates to zero if `since_ms` lies in the future.
    fn elapsed_ms(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }

    /// Timestamp for outgoing wire messages (`time_boot_ms`), wrapping at `u32::MAX`.
    fn wire_timestamp(&self) -> u32 {
        self.now_ms() as u32
    }
}

/// Mock clock with explicit time advancement.
///
/// Single-threaded only; intended for deterministic tests of the
/// timeout boundaries.
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    now_ms: Cell<u64>,
}

impl MockTime {
    /// Creates a clock starting at 0 ms.
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
        }
    }

    /// Creates a clock starting at `ms`.
    pub fn with_initial(ms: u64) -> Self {
        Self {
            now_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set_ms(&self, ms: u64) {
        self.now_ms.set(ms);
    }

    /// Advances the current time.
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
