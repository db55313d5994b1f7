//! Subcommand execution.
//!
//! Each subcommand runs against a caller-owned [`DeviceSession`] and
//! [`Poller`] and yields a [`CommandReport`]. The binary prints the report;
//! anything that did not succeed comes back as an error.

use std::fmt;

use tracing::debug;

use crate::config::Commands;
use crate::device::{
    CommitReport, DeviceSession, JobsCheck, LicenseCheck, commit_and_wait, restart,
    restart_and_wait,
};
use crate::error::Result;
use crate::poller::{Clock, Poller};

/// What a successful subcommand did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// Whether the device state changed.
    pub changed: bool,
    /// A one-line description of the result.
    pub message: String,
}

impl CommandReport {
    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
        }
    }

    fn updated(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "changed: {}; {}", self.changed, self.message)
    }
}

/// Run `command` against `session`.
///
/// # Errors
///
/// Returns `PanpollError::Poll` when a wait times out or hits a fatal
/// transport error, `PanpollError::Commit` when a commit fails, and
/// `PanpollError::Transport` when a restart request is rejected.
pub fn run_command<S, C>(
    command: &Commands,
    session: &S,
    poller: &Poller<C>,
) -> Result<CommandReport>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    debug!(?command, "running command");
    match command {
        Commands::Check(_) => check(session, poller),
        Commands::Commit(_) => commit(session, poller),
        Commands::Restart(args) if args.wait => restart_then_wait(session, poller),
        Commands::Restart(_) => {
            restart(session)?;
            Ok(CommandReport::updated("restart requested"))
        }
        Commands::Licenses(_) => licenses(session, poller),
    }
}

fn check<S, C>(session: &S, poller: &Poller<C>) -> Result<CommandReport>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    let outcome = poller.poll(&JobsCheck::all(), session);
    let attempts = outcome.attempts();
    outcome.into_result()?;
    Ok(CommandReport::unchanged(format!(
        "device ready after {attempts} checks"
    )))
}

fn commit<S, C>(session: &S, poller: &Poller<C>) -> Result<CommandReport>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    Ok(match commit_and_wait(session, poller)? {
        CommitReport::NothingToCommit => CommandReport::unchanged("no changes to commit"),
        CommitReport::Committed { job_id, .. } => {
            CommandReport::updated(format!("commit job {job_id} finished"))
        }
    })
}

fn restart_then_wait<S, C>(session: &S, poller: &Poller<C>) -> Result<CommandReport>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    let outcome = restart_and_wait(session, poller)?;
    let attempts = outcome.attempts();
    outcome.into_result()?;
    Ok(CommandReport::updated(format!(
        "device back after {attempts} checks"
    )))
}

fn licenses<S, C>(session: &S, poller: &Poller<C>) -> Result<CommandReport>
where
    S: DeviceSession + ?Sized,
    C: Clock,
{
    let records = poller.poll(&LicenseCheck, session).into_result()?;
    Ok(CommandReport::unchanged(format!(
        "{} licenses active",
        records.len()
    )))
}
