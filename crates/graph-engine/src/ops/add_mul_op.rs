// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise binary arithmetic on `f32` tensors of equal shape.

use super::{check_arity, Kernel};
use crate::{EngineTensor, KernelError};
use tensor_core::{DType, TensorError};

/// `ADD`: `out[i] = a[i] + b[i]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Add;

impl Add {
    pub const NAME: &'static str = "ADD";
}

/// `MUL`: `out[i] = a[i] * b[i]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mul;

impl Mul {
    pub const NAME: &'static str = "MUL";
}

impl Kernel for Add {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn eval(
        &self,
        inputs: &[&EngineTensor],
        outputs: &mut [EngineTensor],
    ) -> Result<(), KernelError> {
        binary(Self::NAME, inputs, outputs, |a, b| a + b)
    }
}

impl Kernel for Mul {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn eval(
        &self,
        inputs: &[&EngineTensor],
        outputs: &mut [EngineTensor],
    ) -> Result<(), KernelError> {
        binary(Self::NAME, inputs, outputs, |a, b| a * b)
    }
}

fn binary(
    op: &'static str,
    inputs: &[&EngineTensor],
    outputs: &mut [EngineTensor],
    f: impl Fn(f32, f32) -> f32,
) -> Result<(), KernelError> {
    check_arity(op, "inputs", 2, inputs.len())?;
    check_arity(op, "outputs", 1, outputs.len())?;

    let (lhs, rhs) = (inputs[0], inputs[1]);
    for t in [lhs, rhs] {
        if t.dtype() != DType::F32 {
            return Err(TensorError::UnsupportedDType { op, dtype: t.dtype() }.into());
        }
    }
    for other in [rhs.shape(), outputs[0].shape()] {
        if lhs.shape() != other {
            return Err(TensorError::ShapeMismatch {
                op,
                lhs: lhs.shape().clone(),
                rhs: other.clone(),
            }
            .into());
        }
    }

    let a = lhs.data().as_f32()?;
    let b = rhs.data().as_f32()?;
    let dst = outputs[0].data_mut().as_f32_mut()?;
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = f(x, y);
    }
    Ok(())
}
