//! Configuration system for panpoll.
//!
//! This module provides the configuration structures and CLI definitions for the
//! panpoll application. Configuration loading and precedence merging is handled by
//! the `ortho_config` crate: CLI flags override environment variables, which
//! override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/panpoll/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "fw01.example.net"
//!
//! [device]
//! api_key = "LUFRPT14MW5xOEo1R09KVlBZNnpnemh0VHRBOWl6TGM9"
//! verify_tls = false
//! request_timeout_secs = 30
//!
//! [poll]
//! initial_delay_secs = 0
//! interval_secs = 5
//! timeout_secs = 600
//! retry_transport_errors = true
//! max_transport_errors = 20
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{CheckArgs, Cli, Commands, CommitArgs, PollOverrides, RestartArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{
    AppConfig, DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DeviceConfig, PollConfig,
};
