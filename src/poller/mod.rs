//! Bounded-retry readiness polling.
//!
//! A [`Poller`] repeatedly invokes a [`ReadinessCheck`] against a caller-owned
//! session until every returned [`StatusRecord`] reports completion, the
//! deadline passes, or a transport failure is treated as fatal.
//!
//! The loop is synchronous and runs on the caller's thread. One check is in
//! flight at a time, and each call to [`Poller::poll`] owns its own deadline
//! and counters.
//!
//! ```text
//! sleep(initial_delay)
//! deadline = now + timeout
//! loop:
//!     check -> all complete?      -> Ready
//!     timeout == 0 or now >= deadline -> TimedOut
//!     sleep(interval)
//! ```

mod clock;


use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{PollError, TransportError};
use crate::status::{StatusRecord, all_complete};

pub use clock::{Clock, ManualClock, SystemClock};

/// Default total timeout, matching the device check defaults.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single status query against a device.
///
/// The session handle is passed into every invocation; the check holds no
/// connection state of its own.
pub trait ReadinessCheck<S: ?Sized> {
    /// Query the device once and return the observed status records.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the device could not be queried or
    /// its response could not be adapted into status records.
    fn check(&self, session: &S) -> Result<Vec<StatusRecord>, TransportError>;
}

/// Timing and retry policy for one poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before the first check, e.g. to let a rebooting device settle.
    pub initial_delay: Duration,
    /// Wait between checks. Zero polls without pausing.
    pub interval: Duration,
    /// Total time budget measured from the first check. Zero means one check.
    pub timeout: Duration,
    /// Treat transport failures as "not ready yet" rather than fatal.
    pub retry_transport_errors: bool,
    /// Give up after this many consecutive transport failures.
    pub max_transport_errors: Option<u32>,
}

impl PollPolicy {
    /// A policy with the given timing and the default transport-error handling.
    #[must_use]
    pub const fn new(initial_delay: Duration, interval: Duration, timeout: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            timeout,
            retry_transport_errors: true,
            max_transport_errors: None,
        }
    }

    /// Return a copy that fails on the first transport error.
    #[must_use]
    pub const fn fail_fast(mut self) -> Self {
        self.retry_transport_errors = false;
        self
    }

    /// Return a copy that gives up after `limit` consecutive transport errors.
    #[must_use]
    pub const fn with_max_transport_errors(mut self, limit: u32) -> Self {
        self.max_transport_errors = Some(limit);
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, DEFAULT_TIMEOUT)
    }
}

/// The terminal result of a poll session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Every record of the last check reported completion.
    Ready {
        /// The records from the successful check.
        records: Vec<StatusRecord>,
        /// The number of check invocations performed.
        attempts: u32,
    },
    /// The deadline passed with work still incomplete.
    TimedOut {
        /// The number of check invocations performed.
        attempts: u32,
        /// The configured timeout.
        timeout: Duration,
    },
    /// A transport failure ended the poll.
    TransportError {
        /// The failure that ended the poll.
        error: TransportError,
        /// The number of check invocations performed.
        attempts: u32,
    },
}

impl PollOutcome {
    /// The number of check invocations performed.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. }
            | Self::TimedOut { attempts, .. }
            | Self::TransportError { attempts, .. } => *attempts,
        }
    }

    /// Returns whether the device was observed ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Convert the outcome into the records of the ready check.
    ///
    /// # Errors
    ///
    /// Returns `PollError::Timeout` for [`PollOutcome::TimedOut`] and
    /// `PollError::Transport` for [`PollOutcome::TransportError`].
    pub fn into_result(self) -> Result<Vec<StatusRecord>, PollError> {
        match self {
            Self::Ready { records, .. } => Ok(records),
            Self::TimedOut { timeout, .. } => Err(PollError::Timeout { timeout }),
            Self::TransportError { error, attempts } => Err(PollError::Transport {
                attempts,
                source: error,
            }),
        }
    }
}

/// Runs readiness checks under a [`PollPolicy`].
#[derive(Debug, Clone)]
pub struct Poller<C = SystemClock> {
    policy: PollPolicy,
    clock: C,
}

impl Poller<SystemClock> {
    /// Create a poller driven by the system clock.
    #[must_use]
    pub const fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Poller<C> {
    /// Create a poller driven by the given clock.
    #[must_use]
    pub const fn with_clock(policy: PollPolicy, clock: C) -> Self {
        Self { policy, clock }
    }

    /// The policy this poller applies.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Poll `check` against `session` until ready, timed out, or failed.
    ///
    /// The deadline is evaluated after each check, so a check that starts
    /// before the deadline is always allowed to finish and be counted.
    pub fn poll<S, K>(&self, check: &K, session: &S) -> PollOutcome
    where
        S: ?Sized,
        K: ReadinessCheck<S> + ?Sized,
    {
        self.poll_after(self.policy.initial_delay, check, session)
    }

    /// Like [`Poller::poll`], but waits `initial_delay` before the first
    /// check instead of the policy's own delay.
    pub fn poll_after<S, K>(&self, initial_delay: Duration, check: &K, session: &S) -> PollOutcome
    where
        S: ?Sized,
        K: ReadinessCheck<S> + ?Sized,
    {
        let policy = &self.policy;
        if !initial_delay.is_zero() {
            debug!(
                delay_secs = initial_delay.as_secs(),
                "waiting before first readiness check"
            );
            self.clock.sleep(initial_delay);
        }

        // An unrepresentable deadline is treated as no deadline at all.
        let deadline = self.clock.now().checked_add(policy.timeout);
        let mut attempts: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            match check.check(session) {
                Ok(records) => {
                    consecutive_errors = 0;
                    if all_complete(&records) {
                        info!(attempts, "device reported ready");
                        return PollOutcome::Ready { records, attempts };
                    }
                    debug!(attempts, records = records.len(), "device not ready yet");
                }
                Err(error) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    if self.transport_error_is_fatal(consecutive_errors) {
                        warn!(attempts, %error, "readiness check failed; giving up");
                        return PollOutcome::TransportError { error, attempts };
                    }
                    warn!(attempts, %error, "readiness check failed; treating as not ready");
                }
            }

            let expired = policy.timeout.is_zero()
                || deadline.is_some_and(|limit| self.clock.now() >= limit);
            if expired {
                info!(
                    attempts,
                    timeout_secs = policy.timeout.as_secs(),
                    "readiness deadline passed"
                );
                return PollOutcome::TimedOut {
                    attempts,
                    timeout: policy.timeout,
                };
            }

            if !policy.interval.is_zero() {
                self.clock.sleep(policy.interval);
            }
        }
    }

    fn transport_error_is_fatal(&self, consecutive_errors: u32) -> bool {
        !self.policy.retry_transport_errors
            || self
                .policy
                .max_transport_errors
                .is_some_and(|limit| consecutive_errors >= limit)
    }
}
