//! Configuration data types for panpoll.

use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::poller::PollPolicy;

/// Default per-request timeout for XML API calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default total readiness timeout, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

/// Device connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// XML API key. Takes precedence over user name and password.
    pub api_key: Option<String>,

    /// Administrator user name used to generate an API key.
    pub username: Option<String>,

    /// Administrator password used to generate an API key.
    pub password: Option<String>,

    /// HTTPS port, when the device does not listen on 443.
    pub port: Option<u16>,

    /// Verify the device's TLS certificate.
    pub verify_tls: bool,

    /// Upper bound on a single XML API request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            username: None,
            password: None,
            port: None,
            verify_tls: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl DeviceConfig {
    /// Validates that the device can be authenticated against.
    ///
    /// Either `api_key` or both `username` and `password` must be set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` naming the missing fields.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().is_some_and(|key| !key.is_empty()) {
            return Ok(());
        }
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("device.username");
        }
        if self.password.is_none() {
            missing.push("device.password");
        }
        if missing.is_empty() {
            return Ok(());
        }
        Err(ConfigError::MissingRequired {
            field: format!("device.api_key (or {})", missing.join(", ")),
        }
        .into())
    }
}

/// Readiness polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds to wait before the first check.
    pub initial_delay_secs: u64,

    /// Seconds to wait between checks.
    pub interval_secs: u64,

    /// Total seconds to keep checking. Zero checks exactly once.
    pub timeout_secs: u64,

    /// Keep polling through transport failures instead of failing at once.
    pub retry_transport_errors: bool,

    /// Give up after this many consecutive transport failures.
    pub max_transport_errors: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 0,
            interval_secs: 0,
            timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            retry_transport_errors: true,
            max_transport_errors: None,
        }
    }
}

impl PollConfig {
    /// The poll policy these settings describe.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            interval: Duration::from_secs(self.interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            retry_transport_errors: self.retry_transport_errors,
            max_transport_errors: self.max_transport_errors,
        }
    }
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `PANPOLL_CONFIG_PATH` environment variable
/// 2. `.panpoll.toml` in the current working directory
/// 3. `.panpoll.toml` in the home directory
/// 4. `~/.config/panpoll/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "PANPOLL",
    post_merge_hook,
    discovery(
        app_name = "panpoll",
        env_var = "PANPOLL_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".panpoll.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The firewall or Panorama host name, address, or URL.
    pub host: Option<String>,

    /// Device connection configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub device: DeviceConfig,

    /// Readiness polling configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub poll: PollConfig,
}

impl AppConfig {
    /// Returns the configured host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` if no host is configured.
    pub fn require_host(&self) -> Result<&str> {
        self.host.as_deref().ok_or_else(|| {
            ConfigError::MissingRequired {
                field: String::from("host"),
            }
            .into()
        })
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank values from an empty environment variable mean "unset".
        if self.host.as_deref().is_some_and(|host| host.trim().is_empty()) {
            self.host = None;
        }
        if self.device.api_key.as_deref().is_some_and(str::is_empty) {
            self.device.api_key = None;
        }
        Ok(())
    }
}
