//! Tick timing
//!
//! The controller runs as one fixed-period task. The host runtime measures
//! each tick and feeds the numbers into [`TaskStats`]; nothing here depends
//! on an async runtime.
//!
//! # Example
//!
//! ```rust
//! use agrispray_core::scheduler::{TaskMetadata, TaskStats, SPRAY_TASK};
//!
//! let mut stats = TaskStats::default();
//! stats.update(&SPRAY_TASK, 120, 3_000);
//! assert_eq!(stats.deadline_misses, 0);
//! ```

/// Controller tick period (ms)
pub const TICK_PERIOD_MS: u64 = 3;

/// The spray controller task
pub const SPRAY_TASK: TaskMetadata = TaskMetadata {
    name: "spray_controller",
    period_ms: TICK_PERIOD_MS,
    budget_us: 1_000,
};

/// Timing contract of a periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMetadata {
    pub name: &'static str,
    pub period_ms: u64,
    /// A tick running longer than this counts as a deadline miss
    pub budget_us: u32,
}

impl TaskMetadata {
    #[inline]
    pub const fn period_us(&self) -> u32 {
        (self.period_ms * 1000) as u32
    }

    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }
}

/// Runtime statistics of a periodic task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub last_execution_us: u32,
    /// Exponential moving average, alpha = 0.1
    pub avg_execution_us: u32,
    pub max_execution_us: u32,
    pub deadline_misses: u32,
    /// Moving average of |period - target|
    pub avg_jitter_us: u32,
    pub execution_count: u64,
}

impl TaskStats {
    /// Record one execution that took `execution_us`, `period_us` after the previous one.
    pub fn update(&mut self, task: &TaskMetadata, execution_us: u32, period_us: u32) {
        self.last_execution_us = execution_us;
        self.max_execution_us = self.max_execution_us.max(execution_us);
        self.avg_execution_us = ema(self.avg_execution_us, execution_us, self.execution_count);

        let jitter = period_us.abs_diff(task.period_us());
        self.avg_jitter_us = ema(self.avg_jitter_us, jitter, self.execution_count);

        if !task.is_within_budget(execution_us) {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
            log_warn!(
                "{} overran budget: {} us > {} us",
                task.name,
                execution_us,
                task.budget_us
            );
        }
        self.execution_count = self.execution_count.saturating_add(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// avg_new = (value + 9 * avg_old) / 10, seeded with the first sample
fn ema(avg: u32, value: u32, count: u64) -> u32 {
    if count == 0 {
        value
    } else {
        ((value as u64 + 9 * avg as u64) / 10) as u32
    }
}
