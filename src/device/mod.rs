//! PAN-OS device access over the XML API.
//!
//! A [`DeviceSession`] is an explicit, caller-owned handle: the caller opens
//! it (see [`XmlApiSession::connect`]), passes it into every readiness check,
//! and drops it when finished. Nothing in this crate keeps device state
//! between calls.
//!
//! - [`response`]: decoding of `<response>` envelopes into typed values
//! - [`JobsCheck`]: the job-listing readiness check
//! - [`LicenseCheck`]: the license-listing readiness check
//! - [`commit_and_wait`], [`restart_and_wait`]: orchestration built on the poller

mod checks;
mod commit;
pub mod response;
mod session;


use std::fmt;

pub use checks::{JobsCheck, LicenseCheck};
pub use commit::{
    CommitReport, RESTART_SETTLE_DELAY, commit_and_wait, restart, restart_and_wait,
};
pub use session::{XmlApiSession, endpoint_for};

use crate::error::TransportError;

/// Operational command that restarts the device.
pub const RESTART_COMMAND: &str = "<request><restart><system/></restart></request>";

/// Operational command that lists installed licenses.
pub const LICENSE_INFO_COMMAND: &str = "<request><license><info/></license></request>";

/// Commit command for the candidate configuration.
pub const COMMIT_COMMAND: &str = "<commit></commit>";

/// A single XML API request.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// An operational command (`type=op`).
    Op {
        /// The XML command document.
        cmd: String,
    },
    /// A commit (`type=commit`).
    Commit {
        /// The XML commit document.
        cmd: String,
    },
    /// API key generation (`type=keygen`).
    Keygen {
        /// The administrator user name.
        user: String,
        /// The administrator password.
        password: String,
    },
}

impl ApiRequest {
    /// An operational command request.
    #[must_use]
    pub fn op(cmd: impl Into<String>) -> Self {
        Self::Op { cmd: cmd.into() }
    }

    /// A commit of the candidate configuration.
    #[must_use]
    pub fn commit() -> Self {
        Self::Commit {
            cmd: String::from(COMMIT_COMMAND),
        }
    }

    /// Form parameters for this request, excluding the API key.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Op { cmd } => vec![("type", "op"), ("cmd", cmd.as_str())],
            Self::Commit { cmd } => vec![("type", "commit"), ("cmd", cmd.as_str())],
            Self::Keygen { user, password } => vec![
                ("type", "keygen"),
                ("user", user.as_str()),
                ("password", password.as_str()),
            ],
        }
    }

    /// Returns whether the request must carry an API key.
    #[must_use]
    pub const fn requires_key(&self) -> bool {
        !matches!(self, Self::Keygen { .. })
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op { cmd } => f.debug_struct("Op").field("cmd", cmd).finish(),
            Self::Commit { cmd } => f.debug_struct("Commit").field("cmd", cmd).finish(),
            Self::Keygen { user, .. } => f
                .debug_struct("Keygen")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// An open connection to one device.
///
/// Production code uses [`XmlApiSession`]; tests inject mock implementations
/// via `mockall`.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceSession {
    /// Send one request and return the raw XML response body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the device cannot be reached, the
    /// request times out, or the HTTP exchange fails.
    fn request(&self, request: &ApiRequest) -> Result<String, TransportError>;
}
