// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Behavioral stand-in for the neuron tile
//!
//! Integer toy model, one update per cycle:
//!
//! ```text
//! reset:    v = -65                                  uo_out = 0xBF
//! running:  v += ui_in / 2 + a - b                   (a, b) = uio_in nibbles
//!           v >= 30  => uo_out = min(v, 127), v = -65
//!           else        uo_out = v (two's complement, clamped to i8)
//! disabled: uo_out = 0
//! ```

#![allow(dead_code)]

use spikeprobe_harness::{BackendFault, DutHandle, FnStepper};

pub const V_RESET: i16 = -65;
pub const V_PEAK: i16 = 30;

pub type ToyStepper = FnStepper<Box<dyn FnMut(&mut DutHandle) -> Result<(), BackendFault>>>;

fn update(v: &mut i16, dut: &mut DutHandle) {
    if !dut.ena {
        dut.uo_out = 0;
        return;
    }
    if dut.in_reset() {
        *v = V_RESET;
        dut.uo_out = *v as i8 as u8;
        return;
    }

    let a = (dut.uio_in >> 4) as i16;
    let b = (dut.uio_in & 0x0F) as i16;
    *v = (*v + dut.ui_in as i16 / 2 + a - b).clamp(-128, 127);
    if *v >= V_PEAK {
        dut.uo_out = (*v).min(127) as i8 as u8;
        *v = V_RESET;
    } else {
        dut.uo_out = *v as i8 as u8;
    }
}

/// Expected decoded output of one post-reset cycle with the given inputs
pub fn expected_first_cycle(ui_in: u8, a: u8, b: u8) -> i8 {
    let v = (V_RESET + ui_in as i16 / 2 + a as i16 - b as i16).clamp(-128, 127);
    v as i8
}

/// Toy neuron that never fails
pub fn toy_neuron() -> ToyStepper {
    let mut v = V_RESET;
    FnStepper::new(
        "toy-neuron",
        Box::new(move |dut: &mut DutHandle| {
            update(&mut v, dut);
            Ok(())
        }),
    )
}

/// Toy neuron whose backend dies on cycle `fail_on` (1-based)
pub fn failing_toy_neuron(fail_on: u64) -> ToyStepper {
    let mut v = V_RESET;
    let mut cycles = 0u64;
    FnStepper::new(
        "failing-toy-neuron",
        Box::new(move |dut: &mut DutHandle| {
            cycles += 1;
            if cycles >= fail_on {
                return Err(BackendFault::new(format!("simulator exited at cycle {}", cycles)));
            }
            update(&mut v, dut);
            Ok(())
        }),
    )
}
