//! Semantic error types for the panpoll library.
//!
//! This module defines the error hierarchy for panpoll, following the principle of
//! using semantic error enums (via `thiserror`) for conditions the caller might
//! inspect or retry, while reserving opaque errors (`eyre::Report`) for the
//! application boundary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while talking to a device over the XML API.
///
/// Every variant is a transport-layer failure from the poller's point of
/// view: the check could not produce status records this time round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HTTP client could not be built or the runtime could not start.
    #[error("failed to initialise device client: {message}")]
    ClientSetup {
        /// A description of the setup failure.
        message: String,
    },

    /// The device could not be reached.
    #[error("failed to reach device '{host}': {message}")]
    Unreachable {
        /// The device host.
        host: String,
        /// A description of the connection failure.
        message: String,
    },

    /// The request did not complete within the per-request timeout.
    #[error("request to device '{host}' timed out after {seconds} seconds")]
    RequestTimeout {
        /// The device host.
        host: String,
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// The device answered with a non-success HTTP status.
    #[error("device returned HTTP status {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The XML API reported an error.
    #[error("device rejected request (status '{status}', code {code})")]
    Api {
        /// The `status` attribute of the response.
        status: String,
        /// The `code` attribute of the response, or `none`.
        code: String,
    },

    /// The response could not be decoded.
    #[error("malformed device response: {message}")]
    MalformedResponse {
        /// A description of the decoding failure.
        message: String,
    },
}

/// Terminal failures of a readiness poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The deadline passed without every status record reporting completion.
    #[error(
        "timed out waiting for device readiness after {} seconds",
        display_seconds(.timeout)
    )]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// The check failed at the transport layer and the policy treats that as fatal.
    #[error("readiness check failed after {attempts} attempts: {source}")]
    Transport {
        /// The number of check invocations performed.
        attempts: u32,
        /// The transport error that ended the poll.
        #[source]
        source: TransportError,
    },
}

/// Whole seconds, or seconds with millisecond precision for fractional values.
fn display_seconds(duration: &Duration) -> String {
    let millis = duration.subsec_millis();
    if millis == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}.{millis:03}", duration.as_secs())
    }
}

/// Errors that can occur while committing a candidate configuration.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The commit request itself was rejected.
    #[error("commit request failed: {0}")]
    Request(#[source] TransportError),

    /// The commit job finished but reported failure.
    #[error("commit job {job_id} failed")]
    Failed {
        /// The device job identifier.
        job_id: u64,
    },

    /// Waiting for the commit job did not succeed.
    #[error("commit job {job_id} did not complete: {source}")]
    Wait {
        /// The device job identifier.
        job_id: u64,
        /// The underlying poll failure.
        #[source]
        source: PollError,
    },
}

/// Top-level error type for the panpoll library.
///
/// This enum aggregates all domain-specific errors into a single type. At the
/// application boundary (main.rs), these errors are converted to
/// `eyre::Report` for human-readable error reporting.
#[derive(Debug, Error)]
pub enum PanpollError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while talking to the device.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A readiness poll did not succeed.
    #[error(transparent)]
    Poll(#[from] PollError),

    /// A commit did not succeed.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// A specialised `Result` type for panpoll operations.
pub type Result<T> = std::result::Result<T, PanpollError>;
