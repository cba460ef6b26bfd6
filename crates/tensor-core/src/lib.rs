// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor types shared by the graph engine and the execution runtime.
//!
//! This crate provides:
//! - [`DType`] and [`Shape`] — how an engine tensor slot is declared.
//! - [`TensorData`] — typed, owned element storage for an engine slot.
//! - [`Tensor`], [`ValueList`], [`ElementType`] — the wire representation
//!   exchanged with callers.
//! - [`narrow`] — the explicit element conversions between the two.
//!
//! # Design Goals
//! - No byte reinterpretation: storage is a typed enum, access is checked.
//! - Every precision change is a named function with tests.
//! - Clean error types via `thiserror`.

mod buffer;
mod dtype;
mod error;
pub mod narrow;
mod shape;
mod tensor;

pub use buffer::TensorData;
pub use dtype::DType;
pub use error::TensorError;
pub use shape::Shape;
pub use tensor::{ElementType, Tensor, ValueList};
