// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within the ranges the harness can honour
//! and that declared scenarios don't collide.

use crate::{ConfigError, ConfigResult, PredicateConfig, SpikeprobeConfig};
use std::collections::HashSet;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    ZeroCycles { field: String },
    OutOfRange { field: String, value: u64, max: u64 },
    DuplicateScenario { name: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCycles { field } => {
                write!(f, "{} must be at least one cycle", field)
            }
            Self::OutOfRange { field, value, max } => {
                write!(f, "{} = {} is outside valid range (1-{})", field, value, max)
            }
            Self::DuplicateScenario { name } => {
                write!(f, "Scenario '{}' is declared more than once", name)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Non-zero dwell and reset durations
/// - Stimulus range of the coordinate sweep (1-255)
/// - Clock periods
/// - Logging level names
/// - Scenario names (non-empty, unique) and thresholds (finite)
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation found
pub fn validate_config(config: &SpikeprobeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_sweeps(config, &mut errors);
    validate_clock(config, &mut errors);
    validate_logging(config, &mut errors);
    validate_scenarios(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_cycles(field: &str, value: u32, errors: &mut Vec<ConfigValidationError>) {
    if value == 0 {
        errors.push(ConfigValidationError::ZeroCycles {
            field: field.to_string(),
        });
    }
}

fn validate_sweeps(config: &SpikeprobeConfig, errors: &mut Vec<ConfigValidationError>) {
    let coordinate = &config.sweep.coordinate;
    if coordinate.current_end == 0 || coordinate.current_end > 255 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "sweep.coordinate.current_end".to_string(),
            value: coordinate.current_end as u64,
            max: 255,
        });
    }
    require_cycles("sweep.coordinate.dwell_cycles", coordinate.dwell_cycles, errors);
    require_cycles(
        "sweep.coordinate.point_reset_cycles",
        coordinate.point_reset_cycles,
        errors,
    );
    require_cycles(
        "sweep.coordinate.initial_reset_cycles",
        coordinate.initial_reset_cycles,
        errors,
    );

    let preset = &config.sweep.preset;
    require_cycles("sweep.preset.dwell_cycles", preset.dwell_cycles, errors);
    require_cycles("sweep.preset.point_reset_cycles", preset.point_reset_cycles, errors);
    require_cycles(
        "sweep.preset.initial_reset_cycles",
        preset.initial_reset_cycles,
        errors,
    );
    require_cycles("reset.power_on_cycles", config.reset.power_on_cycles, errors);
}

fn validate_clock(config: &SpikeprobeConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, period) in [
        ("clock.scenario_period_us", config.clock.scenario_period_us),
        ("clock.sweep_period_us", config.clock.sweep_period_us),
    ] {
        if period == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "clock period must be non-zero".to_string(),
            });
        }
    }
}

fn validate_logging(config: &SpikeprobeConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }
    if config.logging.retention_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: "must keep at least the current run".to_string(),
        });
    }
}

fn validate_scenarios(config: &SpikeprobeConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut seen = HashSet::new();
    for (index, scenario) in config.scenarios.iter().enumerate() {
        if scenario.name.trim().is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("scenarios[{}].name", index),
                reason: "scenario name must not be empty".to_string(),
            });
        } else if !seen.insert(scenario.name.clone()) {
            errors.push(ConfigValidationError::DuplicateScenario {
                name: scenario.name.clone(),
            });
        }

        if scenario.clock_period_us == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("scenarios[{}].clock_period_us", index),
                reason: "clock period must be non-zero".to_string(),
            });
        }

        if scenario.ui_in.is_some() != scenario.uio_in.is_some() {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("scenarios[{}]", index),
                reason: "ui_in and uio_in must be given together".to_string(),
            });
        }

        match &scenario.predicate {
            PredicateConfig::DecodedAbove { threshold, .. }
            | PredicateConfig::DecodedBelow { threshold, .. }
                if !threshold.is_finite() =>
            {
                errors.push(ConfigValidationError::InvalidValue {
                    field: format!("scenarios[{}].predicate.threshold", index),
                    reason: "threshold must be finite".to_string(),
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScenarioConfig;

    #[test]
    fn test_zero_dwell_rejected() {
        let mut config = SpikeprobeConfig::default();
        config.sweep.preset.dwell_cycles = 0;
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("sweep.preset.dwell_cycles"));
    }

    #[test]
    fn test_current_end_range() {
        let mut config = SpikeprobeConfig::default();
        config.sweep.coordinate.current_end = 256;
        assert!(validate_config(&config).is_err());

        config.sweep.coordinate.current_end = 16;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = SpikeprobeConfig::default();
        config.sweep.coordinate.dwell_cycles = 0;
        config.logging.level = "loud".to_string();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("dwell_cycles"));
        assert!(err.contains("logging.level"));
    }

    #[test]
    fn test_duplicate_and_unpaired_scenarios() {
        let mut config = SpikeprobeConfig::default();
        let scenario = ScenarioConfig {
            name: "twice".to_string(),
            ui_in: Some(10),
            ..ScenarioConfig::default()
        };
        config.scenarios = vec![scenario.clone(), scenario];
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("declared more than once"));
        assert!(err.contains("must be given together"));
    }
}
