//! Shared fixtures and helper functions for config tests.

use crate::config::{AppConfig, DeviceConfig};
use ortho_config::MergeComposer;
use rstest::fixture;
use std::sync::Arc;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        host = "fw01.example.net"

        [device]
        api_key = "secret-key"
        port = 8443
        verify_tls = false
        request_timeout_secs = 10

        [poll]
        initial_delay_secs = 120
        interval_secs = 5
        timeout_secs = 600
        retry_transport_errors = false
        max_transport_errors = 4
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        host = "10.0.0.1"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `DeviceConfig` authenticated by user name and password.
#[fixture]
pub fn device_config_with_password() -> DeviceConfig {
    DeviceConfig {
        username: Some(String::from("admin")),
        password: Some(String::from("admin")),
        ..DeviceConfig::default()
    }
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.host.is_none(), "host should be None");
    assert!(config.device.api_key.is_none(), "device.api_key should be None");
    assert!(config.device.verify_tls, "device.verify_tls should be true");
    assert_eq!(config.device.request_timeout_secs, 30);
    assert_eq!(config.poll.initial_delay_secs, 0);
    assert_eq!(config.poll.interval_secs, 0);
    assert_eq!(config.poll.timeout_secs, 60);
    assert!(
        config.poll.retry_transport_errors,
        "poll.retry_transport_errors should be true"
    );
    assert!(config.poll.max_transport_errors.is_none());
}
