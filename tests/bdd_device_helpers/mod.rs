//! Behavioural step helpers for device polling scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{DeviceState, device_state};
