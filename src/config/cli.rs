//! Command-line argument definitions for panpoll.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for panpoll.
#[derive(Debug, Parser)]
#[command(name = "panpoll")]
#[command(
    author,
    version,
    about = "Wait for PAN-OS devices to become ready and commit their configuration"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Firewall or Panorama host name, address, or URL.
    #[arg(long, global = true)]
    pub host: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Wait until every job on the device has finished.
    Check(CheckArgs),

    /// Commit the candidate configuration and wait for the commit job.
    Commit(CommitArgs),

    /// Restart the device, optionally waiting for it to come back.
    Restart(RestartArgs),

    /// Wait until the device reports licenses and none has expired.
    Licenses(CheckArgs),
}

impl Commands {
    /// Poll overrides given on the command line for this subcommand.
    #[must_use]
    pub const fn poll_overrides(&self) -> PollOverrides {
        match self {
            Self::Check(args) => args.poll,
            Self::Commit(args) => PollOverrides {
                initial_delay: None,
                interval: args.interval,
                timeout: args.timeout,
            },
            Self::Restart(args) => args.poll,
            Self::Licenses(args) => args.poll,
        }
    }
}

/// Timing flags shared by waiting subcommands, all in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::Args)]
pub struct PollOverrides {
    /// Seconds to wait before the first check.
    #[arg(long)]
    pub initial_delay: Option<u64>,

    /// Seconds between checks.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Total seconds to wait. Zero checks exactly once.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the `check` subcommand.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Polling overrides.
    #[command(flatten)]
    pub poll: PollOverrides,
}

/// Arguments for the `commit` subcommand.
#[derive(Debug, Parser)]
pub struct CommitArgs {
    /// Seconds between job checks.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Total seconds to wait for the commit job.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the `restart` subcommand.
#[derive(Debug, Parser)]
pub struct RestartArgs {
    /// Wait for the device to come back after the restart.
    #[arg(long)]
    pub wait: bool,

    /// Polling overrides used with `--wait`. Without `--initial-delay`, the
    /// first check waits 30 seconds for the device to go down.
    #[command(flatten)]
    pub poll: PollOverrides,
}
