//! Then step definitions for device polling BDD tests.

use std::time::Duration;

use panpoll::device::CommitReport;
use panpoll::poller::PollOutcome;
use rstest_bdd_macros::then;

use super::state::{CommitOutcome, DeviceState, StepResult};

fn outcome(device_state: &DeviceState) -> StepResult<PollOutcome> {
    device_state
        .outcome
        .get()
        .ok_or_else(|| String::from("poll outcome should be set"))
}

fn commit_outcome(device_state: &DeviceState) -> StepResult<CommitOutcome> {
    device_state
        .commit
        .get()
        .ok_or_else(|| String::from("commit outcome should be set"))
}

#[then("the device is ready after {attempts} attempts")]
fn device_is_ready(device_state: &DeviceState, attempts: u32) -> StepResult<()> {
    match outcome(device_state)? {
        PollOutcome::Ready { attempts: actual, .. } if actual == attempts => Ok(()),
        other => Err(format!("expected ready after {attempts} attempts, got {other:?}")),
    }
}

#[then("the poll times out after {attempts} attempts")]
fn poll_times_out(device_state: &DeviceState, attempts: u32) -> StepResult<()> {
    match outcome(device_state)? {
        PollOutcome::TimedOut { attempts: actual, .. } if actual == attempts => Ok(()),
        other => Err(format!(
            "expected timeout after {attempts} attempts, got {other:?}"
        )),
    }
}

#[then("the poll fails with a transport error after {attempts} attempts")]
fn poll_fails_with_transport_error(device_state: &DeviceState, attempts: u32) -> StepResult<()> {
    match outcome(device_state)? {
        PollOutcome::TransportError { attempts: actual, .. } if actual == attempts => Ok(()),
        other => Err(format!(
            "expected transport error after {attempts} attempts, got {other:?}"
        )),
    }
}

#[then("{seconds} seconds have elapsed")]
fn seconds_elapsed(device_state: &DeviceState, seconds: u64) -> StepResult<()> {
    let elapsed = device_state
        .elapsed
        .get()
        .ok_or_else(|| String::from("elapsed time should be set"))?;
    if elapsed == Duration::from_secs(seconds) {
        Ok(())
    } else {
        Err(format!("expected {seconds}s elapsed, got {elapsed:?}"))
    }
}

#[then("the commit reports no change")]
fn commit_reports_no_change(device_state: &DeviceState) -> StepResult<()> {
    match commit_outcome(device_state)? {
        CommitOutcome::Report(CommitReport::NothingToCommit) => Ok(()),
        other => Err(format!("expected nothing to commit, got {other:?}")),
    }
}

#[then("commit job {job_id} finished after {attempts} attempts")]
fn commit_job_finished(device_state: &DeviceState, job_id: u64, attempts: u32) -> StepResult<()> {
    let expected = CommitReport::Committed { job_id, attempts };
    match commit_outcome(device_state)? {
        CommitOutcome::Report(report) if report == expected => Ok(()),
        other => Err(format!("expected {expected:?}, got {other:?}")),
    }
}

#[then("the commit error reads {expected}")]
fn commit_error_reads(device_state: &DeviceState, expected: String) -> StepResult<()> {
    match commit_outcome(device_state)? {
        CommitOutcome::Failed { message } if message == expected => Ok(()),
        other => Err(format!("expected commit error '{expected}', got {other:?}")),
    }
}
