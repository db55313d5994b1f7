//! Configuration loading with layered precedence.
//!
//! This module provides functions to load configuration with the precedence order
//! (lowest to highest): application defaults, configuration file, environment
//! variables, command-line arguments.
//!
//! The layers are composed manually with `MergeComposer` rather than through
//! `OrthoConfig::load()`, because the `Cli` struct owns subcommand dispatch and
//! the per-subcommand polling flags, and because typed environment variables
//! must fail fast instead of being silently ignored.
//!
//! # Environment Variable Handling
//!
//! Environment variables with unparseable values (e.g. `PANPOLL_POLL_TIMEOUT_SECS=soon`)
//! return an error immediately. String fields (e.g. `PANPOLL_HOST`) are always
//! accepted. Environment access goes through `mockable::Env` so the layer can be
//! exercised without touching the process environment.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Unsigned 16-bit integer, e.g. a port. Invalid values return an error.
    U16,
    /// Unsigned 32-bit integer. Invalid values return an error.
    U32,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `PANPOLL_HOST`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["poll", "timeout_secs"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "PANPOLL_HOST",
        path: &["host"],
        var_type: EnvVarType::String,
    },
    // Device fields
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_API_KEY",
        path: &["device", "api_key"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_USERNAME",
        path: &["device", "username"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_PASSWORD",
        path: &["device", "password"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_PORT",
        path: &["device", "port"],
        var_type: EnvVarType::U16,
    },
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_VERIFY_TLS",
        path: &["device", "verify_tls"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "PANPOLL_DEVICE_REQUEST_TIMEOUT_SECS",
        path: &["device", "request_timeout_secs"],
        var_type: EnvVarType::U64,
    },
    // Poll fields
    EnvVarSpec {
        env_var: "PANPOLL_POLL_INITIAL_DELAY_SECS",
        path: &["poll", "initial_delay_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "PANPOLL_POLL_INTERVAL_SECS",
        path: &["poll", "interval_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "PANPOLL_POLL_TIMEOUT_SECS",
        path: &["poll", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "PANPOLL_POLL_RETRY_TRANSPORT_ERRORS",
        path: &["poll", "retry_transport_errors"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "PANPOLL_POLL_MAX_TRANSPORT_ERRORS",
        path: &["poll", "max_transport_errors"],
        var_type: EnvVarType::U32,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `PANPOLL_*` variable without keeping a
/// second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Uses `cap_std::fs_utf8` for capability-oriented filesystem access: the
/// parent directory is opened first and the file is read from there.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Find the configuration file to load, if any.
///
/// An explicit `--config` path must exist; otherwise discovery falls back to
/// `PANPOLL_CONFIG_PATH` and the XDG/dotfile locations.
fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(ref path) = cli.config {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.clone().into_std_path_buf(),
            }
            .into());
        }
        return Ok(Some(path.clone()));
    }

    let discovery = ConfigDiscovery::builder("panpoll")
        .env_var("PANPOLL_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".panpoll.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Load configuration with full layer precedence.
///
/// This function loads configuration from all available sources:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, `PANPOLL_CONFIG_PATH`, or discovered)
/// 3. Environment variables prefixed with `PANPOLL_`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// Later sources override earlier ones.
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - A `--config` path that does not exist
/// - Malformed configuration files
/// - Invalid typed environment variable values (e.g., non-integer for
///   `PANPOLL_POLL_TIMEOUT_SECS`)
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// Load configuration, reading environment variables through `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<E: Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    // Layer 1: Defaults (serialised from AppConfig::default()).
    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    // Layer 2: Configuration file.
    if let Some(ref path) = resolve_config_path(cli)? {
        load_config_file(path, &mut composer)?;
    }

    // Layer 3: Environment variables.
    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    // Layer 4: CLI overrides.
    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Parse an unsigned integer of type `T`, rejecting values outside its range.
fn parse_unsigned<T>(spec: &EnvVarSpec, raw_value: &str) -> Result<Value>
where
    T: std::str::FromStr + Into<u64>,
{
    raw_value
        .parse::<T>()
        .map(|n| Value::Number(Into::<u64>::into(n).into()))
        .map_err(|_| {
            ConfigError::InvalidValue {
                field: spec.env_var.to_owned(),
                reason: format!(
                    "expected unsigned integer up to {}, got '{raw_value}'",
                    std::any::type_name::<T>()
                ),
            }
            .into()
        })
}

/// Parse one raw environment value according to its spec.
fn parse_env_value(spec: &EnvVarSpec, raw_value: String) -> Result<Value> {
    match spec.var_type {
        EnvVarType::String => Ok(Value::String(raw_value)),
        EnvVarType::Bool => raw_value.parse::<bool>().map(Value::Bool).map_err(|_| {
            ConfigError::InvalidValue {
                field: spec.env_var.to_owned(),
                reason: format!("expected bool (true/false), got '{raw_value}'"),
            }
            .into()
        }),
        EnvVarType::U16 => parse_unsigned::<u16>(spec, &raw_value),
        EnvVarType::U32 => parse_unsigned::<u32>(spec, &raw_value),
        EnvVarType::U64 => parse_unsigned::<u64>(spec, &raw_value),
    }
}

/// Collect environment variables with the `PANPOLL_` prefix into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable (bool, u64)
/// has an unparseable value.
fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };
        let json_value = parse_env_value(spec, raw_value)?;
        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map.
///
/// For a path like `["poll", "timeout_secs"]`, this creates the intermediate
/// `poll` object if needed and inserts `timeout_secs` within it.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref host) = cli.host {
        overrides.insert("host".to_owned(), Value::String(host.clone()));
    }

    let poll = cli.command.poll_overrides();
    let poll_fields = [
        ("initial_delay_secs", poll.initial_delay),
        ("interval_secs", poll.interval),
        ("timeout_secs", poll.timeout),
    ];
    for (field, value) in poll_fields {
        if let Some(seconds) = value {
            insert_at_path(&mut overrides, &["poll", field], Value::Number(seconds.into()));
        }
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
