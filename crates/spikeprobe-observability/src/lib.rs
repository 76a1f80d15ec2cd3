// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeprobe-observability
//!
//! Logging setup shared by every spikeprobe entry point.
//!
//! Diagnostic output (what the harness is doing) goes through `tracing` and is
//! configured here. Measurement output (decoded samples) goes through the
//! harness `ResultLogger` and is never routed through this crate.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known spikeprobe crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "spikeprobe",
    "spikeprobe-harness",
    "spikeprobe-config",
    "spikeprobe-observability",
];
