// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax over the last dimension.

use super::{check_arity, Kernel};
use crate::{EngineTensor, KernelError};
use tensor_core::{DType, TensorError};

/// `SOFTMAX`: `out[i] = exp(x[i] - max) / sum(exp(x - max))` per row of the
/// last dimension. Subtracting the row maximum keeps `exp` from overflowing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Softmax;

impl Softmax {
    pub const NAME: &'static str = "SOFTMAX";
}

impl Kernel for Softmax {
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

        let input = inputs[0];
        if input.dtype() != DType::F32 {
            return Err(TensorError::UnsupportedDType {
                op: Self::NAME,
                dtype: input.dtype(),
            }
            .into());
        }
        if input.shape() != outputs[0].shape() {
            return Err(TensorError::ShapeMismatch {
                op: Self::NAME,
                lhs: input.shape().clone(),
                rhs: outputs[0].shape().clone(),
            }
            .into());
        }

        // A scalar is its own single-element row.
        let row_len = input.shape().dims().last().copied().unwrap_or(1);
        if row_len == 0 {
            return Ok(());
        }

        let src = input.data().as_f32()?;
        let dst = outputs[0].data_mut().as_f32_mut()?;
        for (row_src, row_dst) in src.chunks(row_len).zip(dst.chunks_mut(row_len)) {
            let max_val = row_src.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            let mut sum = 0.0f32;
            for (d, &s) in row_dst.iter_mut().zip(row_src) {
                let e = (s - max_val).exp();
                *d = e;
                sum += e;
            }

            if sum > 0.0 {
                let inv_sum = 1.0 / sum;
                row_dst.iter_mut().for_each(|d| *d *= inv_sum);
            }
        }
        Ok(())
    }
}
