// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Firing-Mode Presets
//!
//! The tile ships a read-only table of Izhikevich parameter sets. Writing a
//! table index to `uio_in` (preset mode) selects one of them:
//!
//! ```text
//! dv/dt = 0.04v² + 5v + 140 - u + I
//! du/dt = a(bv - u)
//! if v >= 30 mV: v = c, u = u + d
//! ```
//!
//! The harness never integrates these equations; the table is here so logs
//! and reports can name the behavior class a preset index stands for.

use serde::Serialize;

/// Number of entries in the firing-mode table
pub const PRESET_COUNT: usize = 7;

/// One named behavior class and its `(a, b, c, d)` parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiringMode {
    /// Short tag used in log records (no whitespace)
    pub name: &'static str,
    pub description: &'static str,
    /// Time scale of the recovery variable
    pub a: f32,
    /// Sensitivity of recovery to membrane potential
    pub b: f32,
    /// After-spike reset of v (mV)
    pub c: f32,
    /// After-spike increment of u
    pub d: f32,
}

/// Firing-mode table, indexed by preset byte
pub const FIRING_MODES: [FiringMode; PRESET_COUNT] = [
    FiringMode {
        name: "RS",
        description: "Regular spiking",
        a: 0.02,
        b: 0.2,
        c: -65.0,
        d: 8.0,
    },
    FiringMode {
        name: "IB",
        description: "Intrinsically bursting",
        a: 0.02,
        b: 0.2,
        c: -55.0,
        d: 4.0,
    },
    FiringMode {
        name: "CH",
        description: "Chattering",
        a: 0.02,
        b: 0.2,
        c: -50.0,
        d: 2.0,
    },
    FiringMode {
        name: "FS",
        description: "Fast spiking",
        a: 0.1,
        b: 0.2,
        c: -65.0,
        d: 2.0,
    },
    FiringMode {
        name: "TC",
        description: "Thalamo-cortical",
        a: 0.02,
        b: 0.25,
        c: -65.0,
        d: 0.05,
    },
    FiringMode {
        name: "RZ",
        description: "Resonator",
        a: 0.1,
        b: 0.26,
        c: -65.0,
        d: 2.0,
    },
    FiringMode {
        name: "LTS",
        description: "Low-threshold spiking",
        a: 0.02,
        b: 0.25,
        c: -65.0,
        d: 2.0,
    },
];

/// Look up a firing mode by preset index
pub fn firing_mode(index: usize) -> Option<&'static FiringMode> {
    FIRING_MODES.get(index)
}

/// Look up a firing mode by its short tag (case-insensitive)
pub fn firing_mode_by_name(name: &str) -> Option<(usize, &'static FiringMode)> {
    FIRING_MODES
        .iter()
        .enumerate()
        .find(|(_, mode)| mode.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert_eq!(firing_mode(0).map(|m| m.name), Some("RS"));
        assert_eq!(firing_mode(6).map(|m| m.name), Some("LTS"));
        assert!(firing_mode(PRESET_COUNT).is_none());
    }

    #[test]
    fn test_names_are_unique_log_tokens() {
        for (i, mode) in FIRING_MODES.iter().enumerate() {
            assert!(!mode.name.contains(char::is_whitespace));
            assert_eq!(firing_mode_by_name(mode.name).map(|(idx, _)| idx), Some(i));
        }
        assert_eq!(firing_mode_by_name("lts").map(|(idx, _)| idx), Some(6));
    }

    #[test]
    fn test_regular_spiking_parameters() {
        let rs = &FIRING_MODES[0];
        assert_eq!((rs.a, rs.b, rs.c, rs.d), (0.02, 0.2, -65.0, 8.0));
    }
}
