// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeprobe-harness
//!
//! Verification engine for a clocked, single-neuron spiking tile.
//!
//! The tile takes a stimulus current on `ui_in`, a parameter byte on `uio_in`
//! and exposes its membrane potential on `uo_out`. This crate drives it
//! through deterministic sequences and records what comes back:
//!
//! - [`reset`](mod@reset): reset hold / release sequencing
//! - [`codec`]: parameter byte encoding and `uo_out` decoding policies
//! - [`driver`]: cycle counting over an injected [`ClockStepper`]
//! - [`sweep`]: exhaustive coordinate and firing-mode sweeps
//! - [`logger`]: line-flushed result logs
//! - [`replay`]: coordinate log verification
//! - [`scenario`]: declarative bring-up checks
//!
//! Simulation backends are not part of this crate. Callers implement
//! [`ClockStepper`] (or wrap a per-cycle closure in [`FnStepper`]) and own
//! the [`DutHandle`].
//!
//! ## Example
//!
//! ```ignore
//! use spikeprobe_harness::{CycleDriver, DutHandle, Scenario, run_all};
//!
//! let mut driver = CycleDriver::new(my_backend);
//! let mut dut = DutHandle::new();
//! let outcomes = run_all(&mut driver, &mut dut, &Scenario::canonical())?;
//! ```

pub mod codec;
pub mod driver;
pub mod dut;
pub mod error;
pub mod logger;
pub mod presets;
pub mod replay;
pub mod reset;
pub mod scenario;
pub mod sweep;

pub use codec::{
    decode_coordinate, decode_signed_fixed_point, decode_signed_integer, encode_coordinate,
    encode_preset, DecodePolicy, DecodedValue, ParameterCoordinate, ParameterEncoding,
};
pub use driver::{CycleDriver, Sample};
pub use dut::{ClockStepper, DutHandle, FnStepper};
pub use error::{
    AssertionFailure, BackendFault, DomainError, EnvironmentFailure, HarnessError, HarnessResult,
};
pub use logger::{LogFormat, ResultLogger};
pub use presets::{firing_mode, firing_mode_by_name, FiringMode, FIRING_MODES, PRESET_COUNT};
pub use replay::{read_coordinate_log, verify_coordinate_order, CoordinateRecord, ReplayReport};
pub use reset::{hold_reset, release_reset, reset};
pub use scenario::{
    run_all, run_scenario, scenarios_from_config, Predicate, Scenario, ScenarioOutcome,
    ScenarioReport,
};
pub use sweep::{
    CoordinateSweep, CoordinateTriple, PresetSweep, SweepEngine, SweepPoint, SweepSummary,
    FULL_COORDINATE_POINTS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
