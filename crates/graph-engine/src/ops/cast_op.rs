// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element type conversion between numeric slots.

use super::{check_arity, Kernel};
use crate::{EngineTensor, KernelError};
use tensor_core::{DType, TensorData, TensorError};

/// `CAST`: converts one input to the dtype of its output slot.
///
/// Float to integer truncates toward zero and saturates; integer to
/// integer keeps the low bits; anything to `bool` is "non-zero".
#[derive(Debug, Default, Clone, Copy)]
pub struct Cast;

impl Cast {
    pub const NAME: &'static str = "CAST";
}

impl Kernel for Cast {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn eval(
        &self,
        inputs: &[&EngineTensor],
        outputs: &mut [EngineTensor],
    ) -> Result<(), KernelError> {
        check_arity(Self::NAME, "inputs", 1, inputs.len())?;
        check_arity(Self::NAME, "outputs", 1, outputs.len())?;

        let target = outputs[0].dtype();
        let converted = cast_data(inputs[0].data(), target)?;
        outputs[0].data_mut().overwrite(converted)?;
        Ok(())
    }
}

/// Converts a buffer to `target`, element by element.
///
/// # Errors
/// Returns [`TensorError::UnsupportedDType`] if either side is `Str` and
/// the other is not.
pub fn cast_data(src: &TensorData, target: DType) -> Result<TensorData, TensorError> {
    if src.dtype() == target {
        return Ok(src.clone());
    }
    Ok(match target {
        DType::F32 => TensorData::F32(as_f64s(src)?.into_iter().map(|v| v as f32).collect()),
        DType::I32 => TensorData::I32(as_i64s(src)?.into_iter().map(|v| v as i32).collect()),
        DType::I64 => TensorData::I64(as_i64s(src)?),
        DType::Bool => TensorData::Bool(as_f64s(src)?.into_iter().map(|v| v != 0.0).collect()),
        DType::U8 => TensorData::U8(as_i64s(src)?.into_iter().map(|v| v as u8).collect()),
        DType::Str => {
            return Err(TensorError::UnsupportedDType {
                op: "cast",
                dtype: target,
            })
        }
    })
}

fn as_f64s(src: &TensorData) -> Result<Vec<f64>, TensorError> {
    Ok(match src {
        TensorData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        TensorData::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        TensorData::I64(v) => v.iter().map(|&x| x as f64).collect(),
        TensorData::Bool(v) => v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect(),
        TensorData::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
        TensorData::Str(_) => return Err(unsupported(src)),
    })
}

fn as_i64s(src: &TensorData) -> Result<Vec<i64>, TensorError> {
    Ok(match src {
        TensorData::F32(v) => v.iter().map(|&x| x as i64).collect(),
        TensorData::I32(v) => v.iter().map(|&x| i64::from(x)).collect(),
        TensorData::I64(v) => v.clone(),
        TensorData::Bool(v) => v.iter().map(|&x| i64::from(x)).collect(),
        TensorData::U8(v) => v.iter().map(|&x| i64::from(x)).collect(),
        TensorData::Str(_) => return Err(unsupported(src)),
    })
}

fn unsupported(src: &TensorData) -> TensorError {
    TensorError::UnsupportedDType {
        op: "cast",
        dtype: src.dtype(),
    }
}
