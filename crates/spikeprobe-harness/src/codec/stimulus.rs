// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Parameter Byte Encoding
//!
//! The DUT reads `uio_in` in one of two ways, depending on the test intent:
//!
//! ```text
//! Coordinate mode:   uio_in = (a << 4) | b        a, b ∈ [0, 15]
//!                    bit  7 6 5 4 3 2 1 0
//!                         a a a a b b b b
//!
//! Preset mode:       uio_in = preset_index        index ∈ [0, 6]
//!                    (lookup key into the firing-mode table, no packing)
//! ```
//!
//! The two modes are never mixed within a sweep run. [`ParameterEncoding`]
//! carries which mode produced a byte so samples stay self-describing.

use core::fmt;
use serde::Serialize;

use crate::error::DomainError;
use crate::presets::PRESET_COUNT;

/// Largest value a coordinate nibble can hold
pub const NIBBLE_MAX: u8 = 0x0F;

/// A pair of 4-bit sweep parameters
///
/// Ordering is lexicographic on `(a, b)`, matching sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParameterCoordinate {
    a: u8,
    b: u8,
}

impl ParameterCoordinate {
    /// Create a coordinate, rejecting values wider than 4 bits
    pub fn new(a: u8, b: u8) -> Result<Self, DomainError> {
        if a > NIBBLE_MAX {
            return Err(DomainError::CoordinateOutOfRange { field: 'a', value: a });
        }
        if b > NIBBLE_MAX {
            return Err(DomainError::CoordinateOutOfRange { field: 'b', value: b });
        }
        Ok(Self { a, b })
    }

    /// Unpack a parameter byte; total, every byte is a valid coordinate
    pub fn from_byte(byte: u8) -> Self {
        Self {
            a: byte >> 4,
            b: byte & NIBBLE_MAX,
        }
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.a
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Pack as `(a << 4) | b`
    #[inline]
    pub fn to_byte(self) -> u8 {
        (self.a << 4) | self.b
    }
}

impl fmt::Display for ParameterCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Pack `(a, b)` into the parameter byte
pub fn encode_coordinate(a: u8, b: u8) -> Result<u8, DomainError> {
    ParameterCoordinate::new(a, b).map(ParameterCoordinate::to_byte)
}

/// Unpack a parameter byte into `(a, b)`
pub fn decode_coordinate(byte: u8) -> (u8, u8) {
    let coordinate = ParameterCoordinate::from_byte(byte);
    (coordinate.a(), coordinate.b())
}

/// Encode a firing-mode preset index; the byte is the index itself
pub fn encode_preset(preset_index: usize) -> Result<u8, DomainError> {
    if preset_index >= PRESET_COUNT {
        return Err(DomainError::PresetOutOfRange(preset_index));
    }
    Ok(preset_index as u8)
}

/// How the `uio_in` byte of a sample was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParameterEncoding {
    /// Packed `(a, b)` nibbles
    Coordinate(ParameterCoordinate),
    /// Firing-mode table index
    Preset { index: u8 },
    /// Byte written verbatim by a scenario, no interpretation
    Direct { byte: u8 },
}

impl ParameterEncoding {
    /// Build a preset encoding, validating the index
    pub fn preset(preset_index: usize) -> Result<Self, DomainError> {
        encode_preset(preset_index).map(|index| Self::Preset { index })
    }

    /// The byte to drive onto `uio_in`
    pub fn byte(&self) -> u8 {
        match self {
            Self::Coordinate(coordinate) => coordinate.to_byte(),
            Self::Preset { index } => *index,
            Self::Direct { byte } => *byte,
        }
    }
}
