// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeprobe
//!
//! Verification harness for a clocked spiking-neuron hardware tile: a single
//! Izhikevich neuron with an 8-bit stimulus input, an 8-bit parameter input
//! and an 8-bit membrane-potential output.
//!
//! ## Crates
//!
//! - **`harness`**: reset sequencing, pin codecs, cycle driver, sweeps,
//!   result logs and scenarios
//! - **`config`**: `spikeprobe.toml` loading, overrides and validation
//! - **`observability`**: tracing subscriber setup and `--debug-<crate>` flags
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spikeprobe::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = spikeprobe::config::load_config(None, None)?;
//! let engine = SweepEngine::from_config(&config);
//!
//! // Any backend: simulator bridge, FFI model, behavioral stand-in
//! let mut driver = CycleDriver::new(FnStepper::new("stub", |dut: &mut DutHandle| {
//!     dut.uo_out = dut.ui_in;
//!     Ok(())
//! }));
//! let mut dut = DutHandle::new();
//! let mut logger = ResultLogger::open(&config.output.preset_log, LogFormat::Preset)?;
//! let summary = engine.run_preset_sweep(&mut driver, &mut dut, &mut logger)?;
//! println!("{} samples", summary.samples);
//! # Ok(())
//! # }
//! ```

pub use spikeprobe_config as config;
pub use spikeprobe_harness as harness;
pub use spikeprobe_observability as observability;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{SpikeprobeConfig, DecodePolicyName};
    pub use crate::harness::{
        run_all, run_scenario, scenarios_from_config, ClockStepper, CycleDriver, DecodePolicy,
        DecodedValue, DutHandle, FnStepper, HarnessError, HarnessResult, LogFormat,
        ParameterCoordinate, ParameterEncoding, ResultLogger, Sample, Scenario, SweepEngine,
        SweepSummary,
    };
}
