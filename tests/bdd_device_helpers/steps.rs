//! Given and When step definitions for device polling BDD tests.

use std::time::Duration;

use panpoll::device::{JobsCheck, commit_and_wait, restart_and_wait};
use panpoll::poller::{ManualClock, PollPolicy, Poller};
use rstest_bdd_macros::{given, when};

use crate::fake_device::FakeDevice;
use super::state::{CommitOutcome, DeviceState, StepResult};

#[given("a device that never finishes its jobs")]
fn never_finishes(device_state: &DeviceState) {
    device_state.update_script(|script| script.pending_checks = None);
}

#[given("a device that finishes its jobs after {pending} incomplete checks")]
fn finishes_after(device_state: &DeviceState, pending: u32) {
    device_state.update_script(|script| script.pending_checks = Some(pending));
}

#[given("a device with an empty job queue")]
fn empty_queue(device_state: &DeviceState) {
    device_state.update_script(|script| script.empty_queue = true);
}

#[given("an unreachable device")]
fn unreachable_device(device_state: &DeviceState) {
    device_state.update_script(|script| script.unreachable_checks = u32::MAX);
}

#[given("a device that is unreachable for {checks} checks")]
fn unreachable_for(device_state: &DeviceState, checks: u32) {
    device_state.update_script(|script| script.unreachable_checks = checks);
}

#[given("a device with no pending changes")]
fn no_pending_changes(device_state: &DeviceState) {
    device_state.update_script(|script| script.commit_job = None);
}

#[given("a device that enqueues commit job {job_id}")]
fn enqueues_commit_job(device_state: &DeviceState, job_id: u64) {
    device_state.update_script(|script| script.commit_job = Some(job_id));
}

#[given("the job finishes with result {result}")]
fn job_finishes_with(device_state: &DeviceState, result: String) {
    device_state.update_script(|script| script.job_result = result);
}

#[given("a poll policy with initial delay {initial_delay}, interval {interval} and timeout {timeout}")]
fn poll_policy(device_state: &DeviceState, initial_delay: u64, interval: u64, timeout: u64) {
    device_state.policy.set(PollPolicy::new(
        Duration::from_secs(initial_delay),
        Duration::from_secs(interval),
        Duration::from_secs(timeout),
    ));
}

#[given("transport errors are fatal")]
fn transport_errors_fatal(device_state: &DeviceState) -> StepResult<()> {
    device_state.update_policy(PollPolicy::fail_fast)
}

#[given("at most {limit} consecutive transport errors are tolerated")]
fn transport_error_cap(device_state: &DeviceState, limit: u32) -> StepResult<()> {
    device_state.update_policy(|policy| policy.with_max_transport_errors(limit))
}

fn policy(device_state: &DeviceState) -> StepResult<PollPolicy> {
    device_state
        .policy
        .get()
        .ok_or_else(|| String::from("poll policy should be set"))
}

#[when("the device is polled for readiness")]
fn poll_device(device_state: &DeviceState) -> StepResult<()> {
    let device = FakeDevice::new(device_state.script());
    let clock = ManualClock::new();
    let poller = Poller::with_clock(policy(device_state)?, &clock);

    let outcome = poller.poll(&JobsCheck::all(), &device);

    device_state.outcome.set(outcome);
    device_state.elapsed.set(clock.elapsed());
    Ok(())
}

#[when("the configuration is committed")]
fn commit_configuration(device_state: &DeviceState) -> StepResult<()> {
    let device = FakeDevice::new(device_state.script());
    let clock = ManualClock::new();
    let poller = Poller::with_clock(policy(device_state)?, &clock);

    let outcome = match commit_and_wait(&device, &poller) {
        Ok(report) => CommitOutcome::Report(report),
        Err(error) => CommitOutcome::Failed {
            message: error.to_string(),
        },
    };
    device_state.commit.set(outcome);
    Ok(())
}

#[when("the device is restarted and waited for")]
fn restart_device(device_state: &DeviceState) -> StepResult<()> {
    let device = FakeDevice::new(device_state.script());
    let clock = ManualClock::new();
    let poller = Poller::with_clock(policy(device_state)?, &clock);

    let outcome = restart_and_wait(&device, &poller)
        .map_err(|e| format!("restart should be accepted: {e}"))?;

    device_state.outcome.set(outcome);
    device_state.elapsed.set(clock.elapsed());
    Ok(())
}
