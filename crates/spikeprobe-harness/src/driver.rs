// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cycle driver: the single point where simulated time advances
//!
//! Wraps an injected [`ClockStepper`] with a monotonically increasing cycle
//! counter. Every [`Sample`] is stamped with that counter, so cycle indices
//! in result logs are strictly increasing across resets and sweep points.

use serde::Serialize;
use tracing::trace;

use crate::codec::{DecodePolicy, DecodedValue, ParameterEncoding};
use crate::dut::{ClockStepper, DutHandle};
use crate::error::{EnvironmentFailure, HarnessResult};

/// One decoded observation of `uo_out`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Cycles elapsed since the driver was created
    pub cycle: u64,
    /// Stimulus current applied during the cycle
    pub ui_in: u8,
    /// Parameter encoding active during the cycle
    pub parameter: ParameterEncoding,
    /// Raw `uo_out` byte
    pub raw: u8,
    /// `raw` under the run's decode policy
    pub value: DecodedValue,
}

/// Advances a DUT through an injected clock stepper
pub struct CycleDriver<S> {
    stepper: S,
    cycle: u64,
}

impl<S: ClockStepper> CycleDriver<S> {
    pub fn new(stepper: S) -> Self {
        Self { stepper, cycle: 0 }
    }

    /// Start the DUT clock; must be called before the first step
    pub fn start_clock(&mut self, dut: &mut DutHandle, period_us: u64) -> HarnessResult<()> {
        self.stepper
            .start_clock(dut, period_us)
            .map_err(|source| EnvironmentFailure::ClockStart {
                backend: self.stepper.backend_name(),
                period_us,
                source,
            })?;
        Ok(())
    }

    /// Advance exactly `cycles` clock cycles
    ///
    /// On return `dut.uo_out` reflects the state after the last cycle. A
    /// backend fault is surfaced as [`EnvironmentFailure::StepFailed`] and the
    /// cycle counter is left at the value it had before the call.
    pub fn step(&mut self, dut: &mut DutHandle, cycles: u32) -> HarnessResult<()> {
        if cycles == 0 {
            return Ok(());
        }

        self.stepper
            .advance(dut, cycles)
            .map_err(|source| EnvironmentFailure::StepFailed {
                backend: self.stepper.backend_name(),
                cycle: self.cycle,
                source,
            })?;
        self.cycle += u64::from(cycles);

        trace!(
            "[DRIVER] +{} cycles -> {} (uo_out=0x{:02x})",
            cycles,
            self.cycle,
            dut.uo_out
        );
        Ok(())
    }

    /// Advance a single cycle
    #[inline]
    pub fn tick(&mut self, dut: &mut DutHandle) -> HarnessResult<()> {
        self.step(dut, 1)
    }

    /// Decode the current `uo_out` into a [`Sample`]
    pub fn sample(
        &self,
        dut: &DutHandle,
        parameter: ParameterEncoding,
        policy: DecodePolicy,
    ) -> Sample {
        Sample {
            cycle: self.cycle,
            ui_in: dut.ui_in,
            parameter,
            raw: dut.uo_out,
            value: policy.decode(dut.uo_out),
        }
    }

    /// Cycles elapsed since construction
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    pub fn stepper_mut(&mut self) -> &mut S {
        &mut self.stepper
    }

    pub fn into_stepper(self) -> S {
        self.stepper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dut::FnStepper;
    use crate::error::{BackendFault, HarnessError};

    fn echo_stepper() -> FnStepper<impl FnMut(&mut DutHandle) -> Result<(), BackendFault>> {
        FnStepper::new("echo", |dut: &mut DutHandle| {
            dut.uo_out = dut.ui_in;
            Ok(())
        })
    }

    #[test]
    fn test_step_counts_cycles() {
        let mut driver = CycleDriver::new(echo_stepper());
        let mut dut = DutHandle::new();
        driver.start_clock(&mut dut, 10).unwrap();
        driver.step(&mut dut, 3).unwrap();
        driver.tick(&mut dut).unwrap();
        driver.step(&mut dut, 0).unwrap();
        assert_eq!(driver.cycle(), 4);
        assert_eq!(dut.clk_period_us, 10);
    }

    #[test]
    fn test_sample_is_post_cycle() {
        let mut driver = CycleDriver::new(echo_stepper());
        let mut dut = DutHandle::new();
        dut.ui_in = 0xE0;
        driver.tick(&mut dut).unwrap();

        let sample = driver.sample(
            &dut,
            ParameterEncoding::Direct { byte: 0 },
            DecodePolicy::SignedInteger,
        );
        assert_eq!(sample.cycle, 1);
        assert_eq!(sample.raw, 0xE0);
        assert_eq!(sample.value, DecodedValue::Integer(-32));
    }

    #[test]
    fn test_backend_fault_becomes_environment_failure() {
        let mut calls = 0;
        let stepper = FnStepper::new("flaky", move |_dut: &mut DutHandle| {
            calls += 1;
            if calls > 2 {
                Err(BackendFault::new("simulator exited"))
            } else {
                Ok(())
            }
        });
        let mut driver = CycleDriver::new(stepper);
        let mut dut = DutHandle::new();
        driver.step(&mut dut, 2).unwrap();

        let err = driver.step(&mut dut, 5).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Environment(EnvironmentFailure::StepFailed { backend: "flaky", cycle: 2, .. })
        ));
        assert_eq!(driver.cycle(), 2);
    }
}
