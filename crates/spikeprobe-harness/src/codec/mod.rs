// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pin-level codecs
//!
//! - **stimulus**: sweep coordinates / preset indices -> `uio_in` byte
//! - **fixed_point**: `uo_out` byte -> engineering value

pub mod fixed_point;
pub mod stimulus;

pub use fixed_point::{
    decode_signed_fixed_point, decode_signed_integer, DecodePolicy, DecodedValue,
};
pub use stimulus::{
    decode_coordinate, encode_coordinate, encode_preset, ParameterCoordinate, ParameterEncoding,
    NIBBLE_MAX,
};
