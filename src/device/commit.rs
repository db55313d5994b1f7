//! Commit and restart orchestration on top of the poller.

use std::time::Duration;

use tracing::{info, warn};

use super::{ApiRequest, DeviceSession, JobsCheck, RESTART_COMMAND, response};
use crate::error::{CommitError, TransportError};
use crate::poller::{Clock, PollOutcome, Poller};
use crate::status::JobResult;

/// Wait before the first check after a restart when the policy sets no
/// initial delay. A device that has just accepted a restart still answers for
/// a while and would otherwise look ready at once.
pub const RESTART_SETTLE_DELAY: Duration = Duration::from_secs(30);

/// What a commit did to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitReport {
    /// The candidate configuration matched the running one.
    NothingToCommit,
    /// A commit job ran and finished successfully.
    Committed {
        /// The device job identifier.
        job_id: u64,
        /// How many job checks it took to observe completion.
        attempts: u32,
    },
}

impl CommitReport {
    /// Returns whether the running configuration changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Commit the candidate configuration and wait for the commit job.
///
/// # Errors
///
/// Returns `CommitError::Request` if the commit is rejected,
/// `CommitError::Wait` if the job does not finish under the poller's policy,
/// and `CommitError::Failed` if the job finishes with a `FAIL` result.
pub fn commit_and_wait<S, C>(session: &S, poller: &Poller<C>) -> Result<CommitReport, CommitError>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    let body = session
        .request(&ApiRequest::commit())
        .map_err(CommitError::Request)?;
    let Some(job_id) = response::commit_job_id(&body).map_err(CommitError::Request)? else {
        info!("no changes to commit");
        return Ok(CommitReport::NothingToCommit);
    };

    info!(job_id, "commit job enqueued");
    let outcome = poller.poll(&JobsCheck::id(job_id), session);
    let attempts = outcome.attempts();
    let records = outcome
        .into_result()
        .map_err(|source| CommitError::Wait { job_id, source })?;

    if records
        .iter()
        .any(|record| record.result == Some(JobResult::Fail))
    {
        return Err(CommitError::Failed { job_id });
    }

    info!(job_id, attempts, "commit job finished");
    Ok(CommitReport::Committed { job_id, attempts })
}

/// Ask the device to restart.
///
/// A device that drops the connection or stops answering mid-request is
/// restarting as asked, so unreachable and timed-out requests count as
/// success.
///
/// # Errors
///
/// Returns the transport error if the device rejects the request or answers
/// with something other than a success envelope.
pub fn restart<S: DeviceSession + ?Sized>(session: &S) -> Result<(), TransportError> {
    match session.request(&ApiRequest::op(RESTART_COMMAND)) {
        Ok(body) => response::expect_success(&body),
        Err(error @ (TransportError::Unreachable { .. } | TransportError::RequestTimeout { .. })) => {
            warn!(%error, "connection dropped while requesting restart");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

/// Restart the device, then wait until its job queue is idle again.
///
/// The policy's `initial_delay` is waited before the first check, or
/// [`RESTART_SETTLE_DELAY`] when it is zero. The policy should retry
/// transport errors while the device boots.
///
/// # Errors
///
/// Returns the transport error if the restart request itself is rejected.
pub fn restart_and_wait<S, C>(session: &S, poller: &Poller<C>) -> Result<PollOutcome, TransportError>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    restart(session)?;
    let configured = poller.policy().initial_delay;
    let settle = if configured.is_zero() {
        RESTART_SETTLE_DELAY
    } else {
        configured
    };
    info!(
        settle_secs = settle.as_secs(),
        "restart requested; waiting for device"
    );
    Ok(poller.poll_after(settle, &JobsCheck::all(), session))
}
