// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `spikeprobe.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpikeprobeConfig {
    pub clock: ClockConfig,
    pub reset: ResetConfig,
    pub decode: DecodeConfig,
    pub sweep: SweepConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    /// Extra declarative scenarios, run after the canonical ones
    pub scenarios: Vec<ScenarioConfig>,
}

/// Clock periods handed to the simulation backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Clock period for the short assertion scenarios (microseconds)
    pub scenario_period_us: u64,
    /// Clock period for characterization sweeps (microseconds)
    pub sweep_period_us: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            scenario_period_us: 10,
            sweep_period_us: 500_000,
        }
    }
}

/// Reset protocol configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Cycles held in reset by the power-on scenario
    pub power_on_cycles: u32,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            power_on_cycles: 10,
        }
    }
}

/// Output decoding policy name
///
/// The DUT's output encoding differs between hardware revisions, so the
/// policy is a deployment choice rather than a constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicyName {
    /// Plain 8-bit two's complement
    #[default]
    SignedInteger,
    /// Sign bit, one integer bit, six fraction bits, scaled by 100
    SignedFixedPoint,
}

impl DecodePolicyName {
    /// Parse the snake_case name used in TOML and overrides
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "signed_integer" | "int" | "integer" => Some(Self::SignedInteger),
            "signed_fixed_point" | "fixed" | "fixed_point" => Some(Self::SignedFixedPoint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedInteger => "signed_integer",
            Self::SignedFixedPoint => "signed_fixed_point",
        }
    }
}

/// Decoding configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Policy used for logged sweep values
    pub policy: DecodePolicyName,
}

/// Sweep strategies configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    pub coordinate: CoordinateSweepConfig,
    pub preset: PresetSweepConfig,
}

/// Exhaustive `(current, a, b)` sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinateSweepConfig {
    /// Exclusive upper bound of the stimulus current (full run: 255)
    pub current_end: u16,
    /// Cycles stepped at each point before the sample is taken
    pub dwell_cycles: u32,
    /// Reset cycles between consecutive points
    pub point_reset_cycles: u32,
    /// Reset cycles before the first point
    pub initial_reset_cycles: u32,
}

impl Default for CoordinateSweepConfig {
    fn default() -> Self {
        Self {
            current_end: 255,
            dwell_cycles: 1,
            point_reset_cycles: 1,
            initial_reset_cycles: 1,
        }
    }
}

/// Firing-mode preset sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PresetSweepConfig {
    /// Stimulus held on `ui_in` for every preset
    pub drive_stimulus: u8,
    /// Cycles sampled per preset (one sample per cycle)
    pub dwell_cycles: u32,
    /// Reset cycles between consecutive presets
    pub point_reset_cycles: u32,
    /// Reset cycles before the first preset
    pub initial_reset_cycles: u32,
}

impl Default for PresetSweepConfig {
    fn default() -> Self {
        Self {
            drive_stimulus: 255,
            dwell_cycles: 100,
            point_reset_cycles: 1,
            initial_reset_cycles: 1,
        }
    }
}

/// Result log destinations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub coordinate_log: PathBuf,
    pub preset_log: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            coordinate_log: PathBuf::from("test_sweep.log"),
            preset_log: PathBuf::from("test_presets.log"),
        }
    }
}

/// Diagnostic logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    /// Base directory for per-run log folders
    pub log_dir: PathBuf,
    /// Number of most recent run folders to keep
    pub retention_runs: usize,
    /// Write JSON log files in addition to the console
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            retention_runs: 10,
            file_logging: false,
        }
    }
}

/// Declarative scenario: reset, optional stimulus, step, check, observe
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub clock_period_us: u64,
    pub reset_cycles: u32,
    /// Release `rst_n` after the reset hold
    pub release_reset: bool,
    /// `(ui_in, uio_in)` applied after reset
    pub ui_in: Option<u8>,
    pub uio_in: Option<u8>,
    pub step_cycles: u32,
    pub predicate: PredicateConfig,
    /// Trailing cycles logged without assertion
    pub observe_cycles: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            clock_period_us: 10,
            reset_cycles: 1,
            release_reset: true,
            ui_in: None,
            uio_in: None,
            step_cycles: 1,
            predicate: PredicateConfig::NonZero,
            observe_cycles: 0,
        }
    }
}

/// Post-condition checked by a scenario
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredicateConfig {
    /// Raw `uo_out` is non-zero
    NonZero,
    /// Decoded value strictly greater than `threshold`
    DecodedAbove {
        #[serde(default)]
        policy: DecodePolicyName,
        threshold: f64,
    },
    /// Decoded value strictly less than `threshold`
    DecodedBelow {
        #[serde(default)]
        policy: DecodePolicyName,
        threshold: f64,
    },
    /// Raw `uo_out` equals `value`
    RawEquals { value: u8 },
}

impl Default for PredicateConfig {
    fn default() -> Self {
        Self::NonZero
    }
}
