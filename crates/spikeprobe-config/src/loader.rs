// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (or built-in defaults when no file exists)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, DecodePolicyName, SpikeprobeConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "spikeprobe.toml";

/// Find the spikeprobe configuration file
///
/// Search order:
/// 1. `SPIKEPROBE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./spikeprobe.toml`
/// 3. Up to 5 parent directories
///
/// Returns `Ok(None)` when no file exists in the searched locations.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if `SPIKEPROBE_CONFIG_PATH` names a missing file
pub fn find_config_file() -> ConfigResult<Option<PathBuf>> {
    if let Ok(env_path) = env::var("SPIKEPROBE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPIKEPROBE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    Ok(search_paths.into_iter().find(|path| path.exists()))
}

/// Load configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for one
///   and fall back to defaults if nothing is found.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if an explicit config file is missing or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SpikeprobeConfig> {
    let config_file = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            Some(path.to_path_buf())
        }
        None => find_config_file()?,
    };

    let mut config = match config_file {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        None => SpikeprobeConfig::default(),
    };

    apply_environment_overrides(&mut config)?;

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKEPROBE_DECODE_POLICY` -> `decode.policy`
/// - `SPIKEPROBE_LOG_LEVEL` -> `logging.level`
/// - `SPIKEPROBE_LOG_DIR` -> `logging.log_dir`
/// - `SPIKEPROBE_COORDINATE_LOG` -> `output.coordinate_log`
/// - `SPIKEPROBE_PRESET_LOG` -> `output.preset_log`
/// - `SPIKEPROBE_CURRENT_END` -> `sweep.coordinate.current_end`
/// - `SPIKEPROBE_PRESET_DWELL` -> `sweep.preset.dwell_cycles`
/// - `SPIKEPROBE_PRESET_DRIVE` -> `sweep.preset.drive_stimulus`
pub fn apply_environment_overrides(config: &mut SpikeprobeConfig) -> ConfigResult<()> {
    let overrides: HashMap<String, String> = [
        ("SPIKEPROBE_DECODE_POLICY", "decode_policy"),
        ("SPIKEPROBE_LOG_LEVEL", "log_level"),
        ("SPIKEPROBE_LOG_DIR", "log_dir"),
        ("SPIKEPROBE_COORDINATE_LOG", "coordinate_log"),
        ("SPIKEPROBE_PRESET_LOG", "preset_log"),
        ("SPIKEPROBE_CURRENT_END", "current_end"),
        ("SPIKEPROBE_PRESET_DWELL", "preset_dwell"),
        ("SPIKEPROBE_PRESET_DRIVE", "preset_drive"),
    ]
    .iter()
    .filter_map(|(var, key)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_cli_overrides(config, &overrides)
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"preset_dwell": "250"}`)
///
/// Unknown keys are ignored. A known key with an unparsable value is an error.
pub fn apply_cli_overrides(
    config: &mut SpikeprobeConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("decode_policy") {
        config.decode.policy = DecodePolicyName::parse(value).ok_or_else(|| {
            ConfigError::InvalidValue(format!("decode_policy: unknown policy '{}'", value))
        })?;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("coordinate_log") {
        config.output.coordinate_log = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("preset_log") {
        config.output.preset_log = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("current_end") {
        config.sweep.coordinate.current_end = parse_value("current_end", value)?;
    }
    if let Some(value) = cli_args.get("preset_dwell") {
        config.sweep.preset.dwell_cycles = parse_value("preset_dwell", value)?;
    }
    if let Some(value) = cli_args.get("preset_drive") {
        config.sweep.preset.drive_stimulus = parse_value("preset_drive", value)?;
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{}: cannot parse '{}'", key, value)))
}
