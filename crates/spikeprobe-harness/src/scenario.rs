// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Scenario Runner

A scenario is a fixed recipe run against the DUT:

```text
start clock ─► hold reset (N) ─► [release] ─► [apply ui_in / uio_in]
            ─► step (S) ─► assert predicate ─► observe (M, logged only)
```

Three canonical scenarios cover the tile's bring-up checks:

| Name         | Clock      | Reset          | Stimulus        | Check              |
|--------------|------------|----------------|-----------------|--------------------|
| `power_on`   | 10 us      | 10, released   | none            | `int(uo_out) != 0` |
| `reset_only` | 10 us      | 1, held        | none            | `int(uo_out) != 0` |
| `spike`      | 500 000 us | 1, released    | 255 / 175       | `int(uo_out) > 30` |

`reset_only` samples while reset is still asserted, so it checks the reset
value of the membrane potential rather than any dynamics.
*/

use spikeprobe_config::{PredicateConfig, ScenarioConfig, SpikeprobeConfig};
use tracing::{debug, error, info, warn};

use crate::codec::{DecodePolicy, ParameterEncoding};
use crate::driver::{CycleDriver, Sample};
use crate::dut::{ClockStepper, DutHandle};
use crate::error::{AssertionFailure, HarnessError, HarnessResult};
use crate::reset::{hold_reset, release_reset};

/// Post-condition evaluated on `uo_out` after the step phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Signed-integer decode of `uo_out` is non-zero
    ///
    /// Zero exactly when the raw byte is zero. Use `DecodedAbove` /
    /// `DecodedBelow` to check a fixed-point reading.
    NonZero,
    DecodedAbove { policy: DecodePolicy, threshold: f64 },
    DecodedBelow { policy: DecodePolicy, threshold: f64 },
    RawEquals(u8),
}

impl Predicate {
    pub fn holds(&self, raw: u8) -> bool {
        match *self {
            Predicate::NonZero => self.policy().decode(raw).as_f64() != 0.0,
            Predicate::DecodedAbove { policy, threshold } => policy.decode(raw).as_f64() > threshold,
            Predicate::DecodedBelow { policy, threshold } => policy.decode(raw).as_f64() < threshold,
            Predicate::RawEquals(expected) => raw == expected,
        }
    }

    /// Policy used to report decoded values for this predicate
    pub fn policy(&self) -> DecodePolicy {
        match *self {
            Predicate::DecodedAbove { policy, .. } | Predicate::DecodedBelow { policy, .. } => policy,
            Predicate::NonZero | Predicate::RawEquals(_) => DecodePolicy::SignedInteger,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Predicate::NonZero => "signed_integer(uo_out) != 0".to_string(),
            Predicate::DecodedAbove { policy, threshold } => {
                format!("{}(uo_out) > {}", policy.name(), threshold)
            }
            Predicate::DecodedBelow { policy, threshold } => {
                format!("{}(uo_out) < {}", policy.name(), threshold)
            }
            Predicate::RawEquals(value) => format!("uo_out == 0x{:02x}", value),
        }
    }
}

impl From<&PredicateConfig> for Predicate {
    fn from(config: &PredicateConfig) -> Self {
        match *config {
            PredicateConfig::NonZero => Predicate::NonZero,
            PredicateConfig::DecodedAbove { policy, threshold } => Predicate::DecodedAbove {
                policy: policy.into(),
                threshold,
            },
            PredicateConfig::DecodedBelow { policy, threshold } => Predicate::DecodedBelow {
                policy: policy.into(),
                threshold,
            },
            PredicateConfig::RawEquals { value } => Predicate::RawEquals(value),
        }
    }
}

/// Declarative scenario description
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub clock_period_us: u64,
    pub reset_cycles: u32,
    pub release_reset: bool,
    /// `(ui_in, uio_in)` applied after reset
    pub stimulus: Option<(u8, u8)>,
    pub step_cycles: u32,
    pub predicate: Predicate,
    pub observe_cycles: u32,
}

impl Scenario {
    /// Reset for `reset_cycles`, release, one cycle, output must be non-zero
    pub fn power_on(reset_cycles: u32) -> Self {
        Self {
            name: "power_on".to_string(),
            clock_period_us: 10,
            reset_cycles,
            release_reset: true,
            stimulus: None,
            step_cycles: 1,
            predicate: Predicate::NonZero,
            observe_cycles: 0,
        }
    }

    /// One cycle of held reset, output must be non-zero
    pub fn reset_only() -> Self {
        Self {
            name: "reset_only".to_string(),
            clock_period_us: 10,
            reset_cycles: 1,
            release_reset: false,
            stimulus: None,
            step_cycles: 0,
            predicate: Predicate::NonZero,
            observe_cycles: 0,
        }
    }

    /// Maximum drive with `(a, b) = (10, 15)`: first cycle must exceed 30
    pub fn spike() -> Self {
        Self {
            name: "spike".to_string(),
            clock_period_us: 500_000,
            reset_cycles: 1,
            release_reset: true,
            stimulus: Some((255, 175)),
            step_cycles: 1,
            predicate: Predicate::DecodedAbove {
                policy: DecodePolicy::SignedInteger,
                threshold: 30.0,
            },
            observe_cycles: 500,
        }
    }

    pub fn canonical() -> Vec<Self> {
        vec![Self::power_on(10), Self::reset_only(), Self::spike()]
    }

    pub fn from_config(config: &ScenarioConfig) -> HarnessResult<Self> {
        let stimulus = match (config.ui_in, config.uio_in) {
            (Some(ui_in), Some(uio_in)) => Some((ui_in, uio_in)),
            (None, None) => None,
            _ => {
                return Err(HarnessError::Config(format!(
                    "scenario '{}' must set both ui_in and uio_in or neither",
                    config.name
                )))
            }
        };

        Ok(Self {
            name: config.name.clone(),
            clock_period_us: config.clock_period_us,
            reset_cycles: config.reset_cycles,
            release_reset: config.release_reset,
            stimulus,
            step_cycles: config.step_cycles,
            predicate: Predicate::from(&config.predicate),
            observe_cycles: config.observe_cycles,
        })
    }

    fn parameter(&self) -> ParameterEncoding {
        ParameterEncoding::Direct {
            byte: self.stimulus.map_or(0, |(_, uio_in)| uio_in),
        }
    }
}

/// Canonical scenarios tuned by the config, followed by the configured ones
///
/// A configured scenario with a canonical name replaces the canonical entry.
pub fn scenarios_from_config(config: &SpikeprobeConfig) -> HarnessResult<Vec<Scenario>> {
    let mut power_on = Scenario::power_on(config.reset.power_on_cycles);
    power_on.clock_period_us = config.clock.scenario_period_us;
    let mut reset_only = Scenario::reset_only();
    reset_only.clock_period_us = config.clock.scenario_period_us;

    let mut scenarios = vec![power_on, reset_only, Scenario::spike()];
    for entry in &config.scenarios {
        let scenario = Scenario::from_config(entry)?;
        match scenarios.iter_mut().find(|s| s.name == scenario.name) {
            Some(existing) => *existing = scenario,
            None => scenarios.push(scenario),
        }
    }
    Ok(scenarios)
}

/// Evidence collected by a passing scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub name: String,
    /// The sample the predicate was checked against
    pub checked: Sample,
    pub observations: Vec<Sample>,
}

/// Per-scenario result of [`run_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<ScenarioReport, AssertionFailure>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run one scenario against the DUT
pub fn run_scenario<S: ClockStepper>(
    driver: &mut CycleDriver<S>,
    dut: &mut DutHandle,
    scenario: &Scenario,
) -> HarnessResult<ScenarioReport> {
    info!("[SCENARIO] {}: start", scenario.name);
    let policy = scenario.predicate.policy();
    let parameter = scenario.parameter();

    driver.start_clock(dut, scenario.clock_period_us)?;
    hold_reset(driver, dut, scenario.reset_cycles)?;
    let in_reset = driver.sample(dut, parameter, policy);
    debug!(
        "[SCENARIO] {}: uo_out during reset = {}",
        scenario.name,
        in_reset.value
    );

    if scenario.release_reset {
        release_reset(dut);
    }
    if let Some((ui_in, uio_in)) = scenario.stimulus {
        dut.ui_in = ui_in;
        dut.uio_in = uio_in;
    }
    driver.step(dut, scenario.step_cycles)?;

    let checked = driver.sample(dut, parameter, policy);
    if !scenario.predicate.holds(checked.raw) {
        return Err(AssertionFailure {
            scenario: scenario.name.clone(),
            expected: scenario.predicate.describe(),
            raw: checked.raw,
            decoded: checked.value,
            cycle: checked.cycle,
        }
        .into());
    }

    let mut observations = Vec::with_capacity(scenario.observe_cycles as usize);
    for _ in 0..scenario.observe_cycles {
        driver.tick(dut)?;
        let sample = driver.sample(dut, parameter, policy);
        info!(
            "[SCENARIO] {}: cycle {} uo_out {}",
            scenario.name,
            sample.cycle,
            sample.value
        );
        observations.push(sample);
    }

    info!(
        "[SCENARIO] {}: passed ({})",
        scenario.name,
        scenario.predicate.describe()
    );
    Ok(ScenarioReport {
        name: scenario.name.clone(),
        checked,
        observations,
    })
}

/// Run every scenario in order
///
/// An assertion failure is recorded and the next scenario runs; any other
/// error stops the run and is returned.
pub fn run_all<S: ClockStepper>(
    driver: &mut CycleDriver<S>,
    dut: &mut DutHandle,
    scenarios: &[Scenario],
) -> HarnessResult<Vec<ScenarioOutcome>> {
    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let result = match run_scenario(driver, dut, scenario) {
            Ok(report) => Ok(report),
            Err(HarnessError::Assertion(failure)) => {
                warn!("[SCENARIO] {}", failure);
                Err(failure)
            }
            Err(e) => {
                error!(
                    "[SCENARIO] {}: fatal, stopping run: {}",
                    scenario.name,
                    e
                );
                return Err(e);
            }
        };
        outcomes.push(ScenarioOutcome {
            name: scenario.name.clone(),
            result,
        });
    }

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    info!(
        "[SCENARIO] {}/{} scenarios passed",
        passed,
        outcomes.len()
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_signed_integer;
    use spikeprobe_config::DecodePolicyName;

    #[test]
    fn test_canonical_scenarios() {
        let scenarios = Scenario::canonical();
        let names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["power_on", "reset_only", "spike"]);

        let spike = &scenarios[2];
        assert_eq!(spike.stimulus, Some((255, 175)));
        assert_eq!(spike.observe_cycles, 500);
        assert!(!scenarios[1].release_reset);
    }

    #[test]
    fn test_non_zero_checks_signed_integer_decode() {
        let predicate = Scenario::power_on(10).predicate;
        assert_eq!(predicate.policy(), DecodePolicy::SignedInteger);
        for raw in 0..=u8::MAX {
            assert_eq!(predicate.holds(raw), decode_signed_integer(raw) != 0, "raw 0x{:02x}", raw);
        }
        // -128 as a signed integer, even though its fixed-point magnitude is zero
        assert!(predicate.holds(0x80));
        assert_eq!(predicate.describe(), "signed_integer(uo_out) != 0");
    }

    #[test]
    fn test_spike_predicate_uses_signed_value() {
        let predicate = Scenario::spike().predicate;
        assert!(predicate.holds(31));
        assert!(!predicate.holds(30));
        // 0xC8 is raw 200 but signed -56
        assert!(!predicate.holds(0xC8));
    }

    #[test]
    fn test_predicate_from_config() {
        let predicate = Predicate::from(&PredicateConfig::DecodedBelow {
            policy: DecodePolicyName::SignedFixedPoint,
            threshold: 0.0,
        });
        assert!(predicate.holds(0xE0));
        assert!(!predicate.holds(0x80));
        assert_eq!(predicate.describe(), "signed_fixed_point(uo_out) < 0");
        assert_eq!(Predicate::from(&PredicateConfig::RawEquals { value: 7 }), Predicate::RawEquals(7));
    }

    #[test]
    fn test_from_config_requires_paired_stimulus() {
        let config = ScenarioConfig {
            name: "half".to_string(),
            ui_in: Some(1),
            ..ScenarioConfig::default()
        };
        assert!(matches!(Scenario::from_config(&config), Err(HarnessError::Config(_))));
    }

    #[test]
    fn test_configured_scenario_replaces_canonical() {
        let mut config = SpikeprobeConfig::default();
        config.reset.power_on_cycles = 4;
        config.scenarios.push(ScenarioConfig {
            name: "spike".to_string(),
            clock_period_us: 20,
            ui_in: Some(200),
            uio_in: Some(0x12),
            ..ScenarioConfig::default()
        });
        config.scenarios.push(ScenarioConfig {
            name: "quiet".to_string(),
            predicate: PredicateConfig::RawEquals { value: 0xBF },
            ..ScenarioConfig::default()
        });

        let scenarios = scenarios_from_config(&config).unwrap();
        assert_eq!(scenarios.len(), 4);
        assert_eq!(scenarios[0].reset_cycles, 4);
        assert_eq!(scenarios[2].clock_period_us, 20);
        assert_eq!(scenarios[2].stimulus, Some((200, 0x12)));
        assert_eq!(scenarios[3].name, "quiet");
    }
}
