//! Readiness polling and commit orchestration for PAN-OS devices.
//!
//! `panpoll` waits for PAN-OS firewalls and Panorama to become ready: it
//! polls a status check against an explicit device session until every job
//! reports completion, the deadline passes, or a transport failure is treated
//! as fatal. On top of that loop it commits candidate configuration and waits
//! for the commit job, restarts a device and waits for it to return, and
//! waits for a device's licenses.
//!
//! # Modules
//!
//! - [`commands`]: Subcommand execution against a device session
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`device`]: XML API session, response decoding, job checks and orchestration
//! - [`error`]: Semantic error types for the library
//! - [`poller`]: The bounded-retry readiness poller
//! - [`status`]: Typed status records

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod poller;
pub mod status;
