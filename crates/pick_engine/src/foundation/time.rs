//! Time management utilities
//!
//! The evaluation pass measures its per-frame budget through a [`TimeSource`]
//! so that budget behavior can be driven deterministically in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source used for budget accounting
pub trait TimeSource: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced time source
///
/// Time only moves when [`ManualClock::advance`] is called. Clones share the
/// same underlying counter, so a fake collaborator can charge a fixed cost per
/// query while the manager observes it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let micros = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Simple stopwatch for measuring elapsed time against a [`TimeSource`]
pub struct Stopwatch<'a> {
    clock: &'a dyn TimeSource,
    started_at: Duration,
}

impl<'a> Stopwatch<'a> {
    /// Create a stopwatch and start it immediately
    pub fn start_new(clock: &'a dyn TimeSource) -> Self {
        Self {
            clock,
            started_at: clock.now(),
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.started_at)
    }

    /// Restart measurement from the current instant
    pub fn restart(&mut self) {
        self.started_at = self.clock.now();
    }
}
