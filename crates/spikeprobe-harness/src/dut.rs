// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! DUT handle and clock-stepping abstraction
//!
//! The harness never owns the device: the caller creates a [`DutHandle`],
//! picks a [`ClockStepper`] for its simulation backend, and lends both to
//! the driver. Every pin is a named field; there is no global DUT state.
//!
//! ## Pin contract
//!
//! | Field     | Direction | Meaning                                   |
//! |-----------|-----------|-------------------------------------------|
//! | `rst_n`   | in        | Active-low reset                          |
//! | `ena`     | in        | Tile enable, high for all meaningful runs |
//! | `ui_in`   | in        | 8-bit stimulus current                    |
//! | `uio_in`  | in        | Parameter byte (coordinate or preset)     |
//! | `uo_out`  | out       | Response, valid after a cycle completes   |
//! | `uio_out` | out       | Output half of the bidirectional byte     |
//! | `uio_oe`  | out       | Output enables of the bidirectional byte  |

use crate::error::BackendFault;

/// Pin-level view of the device under test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutHandle {
    /// Clock period the backend was asked to run at (0 = not started)
    pub clk_period_us: u64,
    pub rst_n: bool,
    pub ena: bool,
    pub ui_in: u8,
    pub uio_in: u8,
    pub uo_out: u8,
    pub uio_out: u8,
    pub uio_oe: u8,
}

impl DutHandle {
    /// A handle with every line low and no clock running
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether reset is currently asserted
    #[inline]
    pub fn in_reset(&self) -> bool {
        !self.rst_n
    }
}

/// Backend that turns pin state into simulated clock cycles
///
/// One implementation per simulation backend (event-driven simulator
/// bridge, FFI to a compiled model, behavioral stand-in for tests).
/// `advance` is the only blocking operation in the harness and has no
/// timeout: a backend that cannot make progress must return an error rather
/// than retry.
///
/// # Example
///
/// ```ignore
/// struct VerilatorStepper { model: *mut ffi::Vtop }
///
/// impl ClockStepper for VerilatorStepper {
///     fn advance(&mut self, dut: &mut DutHandle, cycles: u32) -> Result<(), BackendFault> {
///         for _ in 0..cycles {
///             unsafe { ffi::drive(self.model, dut.rst_n, dut.ena, dut.ui_in, dut.uio_in) };
///             unsafe { ffi::tick(self.model) };
///         }
///         dut.uo_out = unsafe { ffi::uo_out(self.model) };
///         Ok(())
///     }
///     fn backend_name(&self) -> &'static str { "verilator" }
/// }
/// ```
pub trait ClockStepper {
    /// Start the DUT clock at a fixed period
    fn start_clock(&mut self, dut: &mut DutHandle, period_us: u64) -> Result<(), BackendFault> {
        dut.clk_period_us = period_us;
        Ok(())
    }

    /// Advance exactly `cycles` rising edges; `dut` outputs must reflect the
    /// state after the last one
    fn advance(&mut self, dut: &mut DutHandle, cycles: u32) -> Result<(), BackendFault>;

    /// Backend name for logging/debugging
    fn backend_name(&self) -> &'static str {
        "unnamed-backend"
    }
}

impl<S: ClockStepper + ?Sized> ClockStepper for Box<S> {
    fn start_clock(&mut self, dut: &mut DutHandle, period_us: u64) -> Result<(), BackendFault> {
        (**self).start_clock(dut, period_us)
    }

    fn advance(&mut self, dut: &mut DutHandle, cycles: u32) -> Result<(), BackendFault> {
        (**self).advance(dut, cycles)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// Stepper built from a per-cycle closure
///
/// The closure is called once per clock cycle with the current pin state
/// and updates the output fields. Suitable for behavioral models and thin
/// FFI shims that expose a single "tick" entry point.
pub struct FnStepper<F> {
    name: &'static str,
    on_cycle: F,
}

impl<F> FnStepper<F>
where
    F: FnMut(&mut DutHandle) -> Result<(), BackendFault>,
{
    pub fn new(name: &'static str, on_cycle: F) -> Self {
        Self { name, on_cycle }
    }
}

impl<F> ClockStepper for FnStepper<F>
where
    F: FnMut(&mut DutHandle) -> Result<(), BackendFault>,
{
    fn advance(&mut self, dut: &mut DutHandle, cycles: u32) -> Result<(), BackendFault> {
        for _ in 0..cycles {
            (self.on_cycle)(dut)?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_idle() {
        let dut = DutHandle::new();
        assert!(dut.in_reset());
        assert!(!dut.ena);
        assert_eq!(dut.clk_period_us, 0);
    }

    #[test]
    fn test_fn_stepper_calls_once_per_cycle() {
        let mut stepper = FnStepper::new("counter", |dut: &mut DutHandle| {
            dut.uo_out = dut.uo_out.wrapping_add(1);
            Ok(())
        });
        let mut dut = DutHandle::new();
        stepper.advance(&mut dut, 5).unwrap();
        assert_eq!(dut.uo_out, 5);
        stepper.advance(&mut dut, 0).unwrap();
        assert_eq!(dut.uo_out, 5);
        assert_eq!(stepper.backend_name(), "counter");
    }

    #[test]
    fn test_boxed_stepper_forwards() {
        let mut stepper: Box<dyn ClockStepper> = Box::new(FnStepper::new("boxed", |dut: &mut DutHandle| {
            dut.uo_out = dut.ui_in;
            Ok(())
        }));
        let mut dut = DutHandle::new();
        dut.ui_in = 42;
        stepper.start_clock(&mut dut, 10).unwrap();
        stepper.advance(&mut dut, 1).unwrap();
        assert_eq!(dut.clk_period_us, 10);
        assert_eq!(dut.uo_out, 42);
        assert_eq!(stepper.backend_name(), "boxed");
    }
}
