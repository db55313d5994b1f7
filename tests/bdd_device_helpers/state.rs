//! Scenario state for device polling BDD tests.

use std::time::Duration;

use panpoll::device::CommitReport;
use panpoll::poller::{PollOutcome, PollPolicy};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use crate::fake_device::DeviceScript;

/// Convenience alias for step outcomes.
pub type StepResult<T> = Result<T, String>;

/// Result of a commit attempt, reduced to what scenarios assert on.
#[derive(Clone, Debug)]
pub enum CommitOutcome {
    /// The commit returned a report.
    Report(CommitReport),
    /// The commit failed with the given error message.
    Failed {
        /// The `Display` representation of the error.
        message: String,
    },
}

/// State shared across device polling scenarios.
#[derive(Default, ScenarioState)]
pub struct DeviceState {
    /// How the scripted device behaves.
    pub(crate) script: Slot<DeviceScript>,
    /// The poll policy under test.
    pub(crate) policy: Slot<PollPolicy>,
    /// Outcome of the most recent poll.
    pub(crate) outcome: Slot<PollOutcome>,
    /// Outcome of the most recent commit.
    pub(crate) commit: Slot<CommitOutcome>,
    /// Simulated time spent by the poller.
    pub(crate) elapsed: Slot<Duration>,
}

impl DeviceState {
    /// The current script, or the default one if no step has set it.
    pub(crate) fn script(&self) -> DeviceScript {
        self.script.get().unwrap_or_default()
    }

    /// Apply `change` to the current script.
    pub(crate) fn update_script(&self, change: impl FnOnce(&mut DeviceScript)) {
        let mut script = self.script();
        change(&mut script);
        self.script.set(script);
    }

    /// Apply `change` to the configured policy.
    pub(crate) fn update_policy(
        &self,
        change: impl FnOnce(PollPolicy) -> PollPolicy,
    ) -> StepResult<()> {
        let policy = self
            .policy
            .get()
            .ok_or_else(|| String::from("poll policy should be set"))?;
        self.policy.set(change(policy));
        Ok(())
    }
}

/// Fixture providing fresh state for each scenario.
#[rstest::fixture]
pub fn device_state() -> DeviceState {
    DeviceState::default()
}
