//! Typed status records produced by readiness checks.
//!
//! Device responses are adapted into [`StatusRecord`]s at the boundary, so
//! the poller only ever sees a required completion marker rather than probing
//! loosely-shaped XML for a `status` field.

use crate::error::TransportError;

/// The PAN-OS job status that marks a finished job.
const FINISHED_STATUS: &str = "FIN";

/// Whether a unit of device work has reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The work has finished.
    Complete,
    /// The work is queued, active or otherwise still pending.
    Incomplete,
}

impl Completion {
    /// Interpret a PAN-OS job status string.
    ///
    /// `FIN` is complete; any other non-empty status (`ACT`, `PEND`,
    /// `QUEUED`, ...) is incomplete.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::MalformedResponse` if the status is empty.
    pub fn from_job_status(status: &str) -> Result<Self, TransportError> {
        match status.trim() {
            "" => Err(TransportError::MalformedResponse {
                message: String::from("job entry has an empty status"),
            }),
            FINISHED_STATUS => Ok(Self::Complete),
            _ => Ok(Self::Incomplete),
        }
    }

    /// Interpret the `expired` flag of a license entry.
    ///
    /// A license that has not expired is complete; an expired one is not.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::MalformedResponse` unless the flag is `yes`
    /// or `no`.
    pub fn from_license_expired(expired: &str) -> Result<Self, TransportError> {
        let flag = expired.trim();
        if flag.eq_ignore_ascii_case("no") {
            Ok(Self::Complete)
        } else if flag.eq_ignore_ascii_case("yes") {
            Ok(Self::Incomplete)
        } else {
            Err(TransportError::MalformedResponse {
                message: format!("license expiry flag '{flag}' is not yes or no"),
            })
        }
    }
}

/// The outcome a finished job reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// The job succeeded.
    Ok,
    /// The job failed.
    Fail,
    /// The result is not yet known.
    Pending,
    /// Any other result string the device reports.
    Other(String),
}

impl JobResult {
    /// Interpret a PAN-OS job result string.
    #[must_use]
    pub fn parse(result: &str) -> Self {
        match result.trim() {
            "OK" => Self::Ok,
            "FAIL" => Self::Fail,
            "PEND" => Self::Pending,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One status observation returned by a readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// Whether the observed work has finished.
    pub completion: Completion,
    /// The device job identifier, when the record describes a job.
    pub job_id: Option<u64>,
    /// The job type (for example `Commit`) or licensed feature name.
    pub kind: Option<String>,
    /// The job result, when the device reports one.
    pub result: Option<JobResult>,
    /// Percentage progress, when the device reports one.
    pub progress: Option<u8>,
}

impl StatusRecord {
    /// Create a record with only a completion marker.
    #[must_use]
    pub const fn new(completion: Completion) -> Self {
        Self {
            completion,
            job_id: None,
            kind: None,
            result: None,
            progress: None,
        }
    }

    /// A bare record reporting completion.
    #[must_use]
    pub const fn complete() -> Self {
        Self::new(Completion::Complete)
    }

    /// A bare record reporting work still in progress.
    #[must_use]
    pub const fn incomplete() -> Self {
        Self::new(Completion::Incomplete)
    }

    /// Returns whether this record reports completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Complete
    }
}

/// Returns whether a set of records means the device is ready.
///
/// Every record must report completion. An empty set is never ready: no
/// records yet is not evidence that the work has finished.
#[must_use]
pub fn all_complete(records: &[StatusRecord]) -> bool {
    !records.is_empty() && records.iter().all(StatusRecord::is_complete)
}
