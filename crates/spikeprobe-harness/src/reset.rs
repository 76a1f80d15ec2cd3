// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reset sequencing
//!
//! ```text
//! hold:     ena=1  ui_in=0  uio_in=0  rst_n=0   step(cycles)
//! release:                            rst_n=1
//! ```
//!
//! No assertions are made here; callers check outputs afterwards.

use tracing::debug;

use crate::driver::CycleDriver;
use crate::dut::{ClockStepper, DutHandle};
use crate::error::HarnessResult;

/// Drive reset and hold it for `cycles` cycles, leaving `rst_n` low
pub fn hold_reset<S: ClockStepper>(
    driver: &mut CycleDriver<S>,
    dut: &mut DutHandle,
    cycles: u32,
) -> HarnessResult<()> {
    dut.ena = true;
    dut.ui_in = 0;
    dut.uio_in = 0;
    dut.rst_n = false;
    driver.step(dut, cycles)?;
    debug!("[RESET] held {} cycles (cycle {})", cycles, driver.cycle());
    Ok(())
}

/// Deassert reset; takes effect on the next cycle
#[inline]
pub fn release_reset(dut: &mut DutHandle) {
    dut.rst_n = true;
}

/// Full reset: hold for `cycles` cycles, then release
pub fn reset<S: ClockStepper>(
    driver: &mut CycleDriver<S>,
    dut: &mut DutHandle,
    cycles: u32,
) -> HarnessResult<()> {
    hold_reset(driver, dut, cycles)?;
    release_reset(dut);
    Ok(())
}
