// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed, engine-native element storage.

use crate::{DType, TensorError};
use std::collections::TryReserveError;

/// Owned element storage for one engine tensor slot.
///
/// Each variant holds a flat, row-major buffer of the matching [`DType`].
/// Typed access goes through the `as_*` accessors, which fail rather than
/// reinterpret bytes when the variant does not match.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    Bool(Vec<bool>),
    U8(Vec<u8>),
    Str(Vec<String>),
}

impl TensorData {
    /// Creates a zero-filled buffer of `len` elements.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, TensorData};
    /// let d = TensorData::zeros(DType::Bool, 3);
    /// assert_eq!(d.len(), 3);
    /// assert_eq!(d.dtype(), DType::Bool);
    /// ```
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![0.0; len]),
            DType::I32 => Self::I32(vec![0; len]),
            DType::I64 => Self::I64(vec![0; len]),
            DType::Bool => Self::Bool(vec![false; len]),
            DType::U8 => Self::U8(vec![0; len]),
            DType::Str => Self::Str(vec![String::new(); len]),
        }
    }

    /// Like [`zeros`](Self::zeros), but reports a buffer the allocator
    /// refuses instead of aborting.
    ///
    /// # Errors
    /// [`TensorError::AllocationFailed`] if `len` elements cannot be reserved.
    pub fn try_zeros(dtype: DType, len: usize) -> Result<Self, TensorError> {
        let failed = |_: TryReserveError| TensorError::AllocationFailed { dtype, len };
        Ok(match dtype {
            DType::F32 => Self::F32(filled(0.0, len).map_err(failed)?),
            DType::I32 => Self::I32(filled(0, len).map_err(failed)?),
            DType::I64 => Self::I64(filled(0, len).map_err(failed)?),
            DType::Bool => Self::Bool(filled(false, len).map_err(failed)?),
            DType::U8 => Self::U8(filled(0, len).map_err(failed)?),
            DType::Str => Self::Str(filled(String::new(), len).map_err(failed)?),
        })
    }

    /// Returns the element type of this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::Bool(_) => DType::Bool,
            Self::U8(_) => DType::U8,
            Self::Str(_) => DType::Str,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interprets the buffer as `f32` values.
    pub fn as_f32(&self) -> Result<&[f32], TensorError> {
        match self {
            Self::F32(v) => Ok(v),
            other => Err(other.mismatch(DType::F32)),
        }
    }

    /// Interprets the buffer as mutable `f32` values.
    pub fn as_f32_mut(&mut self) -> Result<&mut [f32], TensorError> {
        match self {
            Self::F32(v) => Ok(v),
            other => Err(other.mismatch(DType::F32)),
        }
    }

    /// Replaces the contents with `values`, keeping the element type.
    ///
    /// Fails if `values` has a different type or length, so a slot's
    /// allocation can never be resized through this path.
    pub fn overwrite(&mut self, values: TensorData) -> Result<(), TensorError> {
        if values.dtype() != self.dtype() {
            return Err(TensorError::DTypeMismatch {
                expected: self.dtype(),
                actual: values.dtype(),
            });
        }
        if values.len() != self.len() {
            return Err(TensorError::ElementCountMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        *self = values;
        Ok(())
    }

    fn mismatch(&self, expected: DType) -> TensorError {
        TensorError::DTypeMismatch {
            expected,
            actual: self.dtype(),
        }
    }
}

fn filled<T: Clone>(value: T, len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, value);
    Ok(v)
}
