// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Output Decoding Policies
//!
//! Hardware revisions of the neuron tile disagree on what `uo_out` carries,
//! so both readings are kept as named policies:
//!
//! ```text
//! SignedInteger:      two's complement
//!     value = raw > 127 ? raw - 256 : raw            range [-128, 127]
//!
//! SignedFixedPoint:   bit  7    6    5 4 3 2 1 0
//!                          sign int  fraction / 64
//!     magnitude = int + fraction / 64
//!     value     = ±magnitude × 100                   range ±198.4375
//! ```
//!
//! Which one the silicon actually uses must be confirmed against the tile's
//! hardware documentation before a policy is made the default.

use core::fmt;
use serde::Serialize;
use spikeprobe_config::DecodePolicyName;

const SIGN_BIT: u8 = 0x80;
const INTEGER_BIT: u8 = 0x40;
const FRACTION_MASK: u8 = 0x3F;
const FRACTION_SCALE: f64 = 64.0;
const ENGINEERING_SCALE: f64 = 100.0;

/// Decode `uo_out` as 8-bit two's complement
#[inline]
pub fn decode_signed_integer(raw: u8) -> i8 {
    raw as i8
}

/// Decode `uo_out` as sign / 1-bit integer / 6-bit fraction, scaled by 100
///
/// Zero magnitude decodes to `+0.0` regardless of the sign bit.
#[inline]
pub fn decode_signed_fixed_point(raw: u8) -> f64 {
    let integer = if raw & INTEGER_BIT != 0 { 1.0 } else { 0.0 };
    let fraction = (raw & FRACTION_MASK) as f64 / FRACTION_SCALE;
    let magnitude = (integer + fraction) * ENGINEERING_SCALE;

    if raw & SIGN_BIT != 0 && magnitude != 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Named output decoding policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    #[default]
    SignedInteger,
    SignedFixedPoint,
}

impl DecodePolicy {
    pub fn decode(self, raw: u8) -> DecodedValue {
        match self {
            DecodePolicy::SignedInteger => DecodedValue::Integer(decode_signed_integer(raw)),
            DecodePolicy::SignedFixedPoint => DecodedValue::Real(decode_signed_fixed_point(raw)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DecodePolicy::SignedInteger => "signed_integer",
            DecodePolicy::SignedFixedPoint => "signed_fixed_point",
        }
    }
}

impl From<DecodePolicyName> for DecodePolicy {
    fn from(name: DecodePolicyName) -> Self {
        match name {
            DecodePolicyName::SignedInteger => DecodePolicy::SignedInteger,
            DecodePolicyName::SignedFixedPoint => DecodePolicy::SignedFixedPoint,
        }
    }
}

/// A decoded output sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Integer(i8),
    Real(f64),
}

impl DecodedValue {
    pub fn as_f64(self) -> f64 {
        match self {
            DecodedValue::Integer(v) => v as f64,
            DecodedValue::Real(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Integer(v) => write!(f, "{}", v),
            DecodedValue::Real(v) => write!(f, "{}", v),
        }
    }
}
