// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for harness operations
//!
//! Three failure classes with different blast radius:
//! - [`DomainError`]: an encoder input does not fit its bit width. Local.
//! - [`AssertionFailure`]: a scenario post-condition does not hold. Aborts
//!   that scenario only.
//! - [`EnvironmentFailure`]: the simulation backend could not advance. Fatal
//!   for the whole run, never retried.

use crate::codec::DecodedValue;

/// Encoder input outside its valid range
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("coordinate field '{field}' = {value} does not fit in 4 bits")]
    CoordinateOutOfRange { field: char, value: u8 },

    #[error("preset index {0} is outside the firing-mode table (0..=6)")]
    PresetOutOfRange(usize),
}

/// Scenario post-condition that did not hold
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "scenario '{scenario}' failed at cycle {cycle}: expected {expected}, observed uo_out=0x{raw:02x} (decoded {decoded})"
)]
pub struct AssertionFailure {
    pub scenario: String,
    pub expected: String,
    pub raw: u8,
    pub decoded: DecodedValue,
    pub cycle: u64,
}

/// Reason reported by a simulation backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BackendFault(pub String);

impl BackendFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// The external simulation collaborator is broken
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentFailure {
    #[error("backend '{backend}' failed to advance at cycle {cycle}: {source}")]
    StepFailed {
        backend: &'static str,
        cycle: u64,
        #[source]
        source: BackendFault,
    },

    #[error("backend '{backend}' could not start a {period_us} us clock: {source}")]
    ClockStart {
        backend: &'static str,
        period_us: u64,
        #[source]
        source: BackendFault,
    },
}

/// Harness error type
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error(transparent)]
    Environment(#[from] EnvironmentFailure),

    #[error("result log I/O failed: {0}")]
    Log(#[from] std::io::Error),

    #[error("sweep aborted after {completed_points} completed points")]
    Aborted { completed_points: usize },

    #[error("invalid harness configuration: {0}")]
    Config(String),

    #[error("log replay failed at line {line}: {reason}")]
    Replay { line: usize, reason: String },
}

impl HarnessError {
    /// Whether the whole run must stop (as opposed to a single scenario)
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HarnessError::Assertion(_))
    }
}

impl From<spikeprobe_config::ConfigError> for HarnessError {
    fn from(err: spikeprobe_config::ConfigError) -> Self {
        HarnessError::Config(err.to_string())
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_assertions_are_non_fatal() {
        let assertion = HarnessError::from(AssertionFailure {
            scenario: "power_on".to_string(),
            expected: "uo_out != 0".to_string(),
            raw: 0,
            decoded: DecodedValue::Integer(0),
            cycle: 11,
        });
        assert!(!assertion.is_fatal());

        let env = HarnessError::from(EnvironmentFailure::StepFailed {
            backend: "fn",
            cycle: 3,
            source: BackendFault::new("simulator exited"),
        });
        assert!(env.is_fatal());
        assert!(HarnessError::Aborted { completed_points: 2 }.is_fatal());
    }

    #[test]
    fn test_assertion_message() {
        let failure = AssertionFailure {
            scenario: "spike".to_string(),
            expected: "signed_integer(uo_out) > 30".to_string(),
            raw: 0x10,
            decoded: DecodedValue::Integer(16),
            cycle: 2,
        };
        let message = failure.to_string();
        assert!(message.contains("spike"));
        assert!(message.contains("0x10"));
        assert!(message.contains("decoded 16"));
    }
}
