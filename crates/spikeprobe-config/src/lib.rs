// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeprobe Configuration System
//!
//! Type-safe configuration loader for the spikeprobe harness with support for:
//! - TOML file parsing (`spikeprobe.toml`)
//! - Environment variable overrides (`SPIKEPROBE_*`)
//! - CLI argument overrides
//!
//! A missing configuration file is not an error: every section has defaults
//! that reproduce the canonical testbench (10 µs scenario clock, 500 ms sweep
//! clock, one-cycle per-point resets, 100-cycle preset dwell).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spikeprobe_config::{load_config, SpikeprobeConfig};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! println!("Preset dwell: {} cycles", config.sweep.preset.dwell_cycles);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
