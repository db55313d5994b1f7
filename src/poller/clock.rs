//! Time source used by the poller.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A source of monotonic time that can also block the caller.
///
/// The poller never reads the system clock directly, so tests can drive it
/// with [`ManualClock`] and observe exact attempt counts.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// The real clock: `Instant::now` and `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only moves when slept or advanced explicitly.
///
/// Sleeping returns immediately after advancing the clock, which lets a
/// ten-minute poll run in microseconds.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    /// Create a clock whose elapsed time starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Move the clock forward without a sleep, e.g. to model check latency.
    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_add(duration));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin
            .checked_add(self.elapsed.get())
            .unwrap_or(self.origin)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
