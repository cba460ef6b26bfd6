// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element conversions between wire and engine representations.
//!
//! Every precision change the runtime performs is one of these functions.
//! Wire values are wider than engine slots, so decoding narrows and
//! encoding widens:
//!
//! | wire      | engine | direction | rule                                |
//! |-----------|--------|-----------|-------------------------------------|
//! | `float64` | `f32`  | narrow    | round to nearest `f32`              |
//! | `int64`   | `i64`  | none      | verbatim                            |
//! | `int64`   | `i32`  | narrow    | keep the low 32 bits (two's compl.) |
//! | `int64`   | `bool` | narrow    | non-zero is `true`                  |
//! | `uint8`   | `u8`   | none      | verbatim                            |
//!
//! Encoding reverses each row exactly: `f32` widens losslessly to `f64`,
//! `bool` becomes `0` or `1`.

/// Narrows a wire `float64` to an engine `f32`, rounding to nearest.
///
/// Values outside the `f32` range become infinities.
#[inline]
pub fn f64_to_f32(v: f64) -> f32 {
    v as f32
}

/// Narrows a wire `int64` to an engine `i32` by truncating to the low 32 bits.
#[inline]
pub fn i64_to_i32(v: i64) -> i32 {
    v as i32
}

/// Narrows a wire `int64` to an engine `bool`: non-zero is `true`.
#[inline]
pub fn i64_to_bool(v: i64) -> bool {
    v != 0
}

/// Widens an engine `f32` to a wire `float64`. Lossless.
#[inline]
pub fn f32_to_f64(v: f32) -> f64 {
    f64::from(v)
}

/// Widens an engine `i32` to a wire `int64`. Lossless.
#[inline]
pub fn i32_to_i64(v: i32) -> i64 {
    i64::from(v)
}

/// Widens an engine `bool` to a wire `int64` (`0` or `1`).
#[inline]
pub fn bool_to_i64(v: bool) -> i64 {
    i64::from(v)
}
