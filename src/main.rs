//! `panpoll` application entry point.
//!
//! This binary waits for PAN-OS devices to become ready, commits their
//! candidate configuration, restarts them, or waits for their licenses. It
//! uses `eyre` for opaque error handling at the application boundary,
//! converting domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/panpoll/config.toml` or path from `PANPOLL_CONFIG_PATH`)
//! 3. Environment variables (`PANPOLL_*`)
//! 4. Command-line arguments
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use panpoll::commands::{CommandReport, run_command};
use panpoll::config::{AppConfig, Cli, load_config};
use panpoll::device::XmlApiSession;
use panpoll::error::Result as PanpollResult;
use panpoll::poller::Poller;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Loads configuration with layered precedence via `OrthoConfig`, then runs
/// the requested subcommand. Any error becomes a non-zero exit.
fn main() -> EyreResult<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;

    let report = run(&cli, &config).map_err(Report::from)?;
    print_report(&report);
    Ok(())
}

/// Install the stderr log subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Open a session and run the CLI command against it.
///
/// The session is dropped when the command finishes.
fn run(cli: &Cli, config: &AppConfig) -> PanpollResult<CommandReport> {
    let session = XmlApiSession::connect(config)?;
    let poller = Poller::new(config.poll.policy());
    run_command(&cli.command, &session, &poller)
}

/// Print the result line for the invoking automation.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_report(report: &CommandReport) {
    println!("{report}");
}
