// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Gaussian Error Linear Unit (GELU) activation.

use super::{check_arity, Kernel};
use crate::{EngineTensor, KernelError};
use tensor_core::{DType, TensorError};

/// Coefficient `sqrt(2/π)`.
const SQRT_2_OVER_PI: f32 = 0.7978845608;

/// Cubic coefficient in the tanh approximation.
const GELU_COEFF: f32 = 0.044715;

/// `GELU`: element-wise activation using the tanh approximation
///
/// `GELU(x) ≈ 0.5 * x * (1 + tanh(sqrt(2/π) * (x + 0.044715 * x³)))`
#[derive(Debug, Default, Clone, Copy)]
pub struct Gelu;

impl Gelu {
    pub const NAME: &'static str = "GELU";
}

impl Kernel for Gelu {
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

        let src = input.data().as_f32()?;
        let dst = outputs[0].data_mut().as_f32_mut()?;
        for (d, &x) in dst.iter_mut().zip(src) {
            *d = gelu_scalar(x);
        }
        Ok(())
    }
}

#[inline(always)]
fn gelu_scalar(x: f32) -> f32 {
    let inner = SQRT_2_OVER_PI * (x + GELU_COEFF * x * x * x);
    0.5 * x * (1.0 + inner.tanh())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_util::{approx_eq, f32_tensor, slot};

    #[test]
    fn test_gelu_scalar_limits() {
        assert!(gelu_scalar(0.0).abs() < 1e-6);
        assert!((gelu_scalar(3.0) - 3.0).abs() < 0.01);
        assert!(gelu_scalar(-3.0).abs() < 0.01);
    }

    #[test]
    fn test_gelu_kernel() {
        let input = f32_tensor(vec![4], &[0.0, 1.0, -1.0, 2.0]);
        let mut out = [slot(DType::F32, vec![4])];
        Gelu.eval(&[&input], &mut out).unwrap();

        let r = out[0].data().as_f32().unwrap();
        assert!(approx_eq(r, &[0.0, 0.8412, -0.1588, 1.9545], 0.01));
    }

    #[test]
    fn test_gelu_shape_mismatch() {
        let input = f32_tensor(vec![3], &[0.0; 3]);
        let mut out = [slot(DType::F32, vec![4])];
        assert!(Gelu.eval(&[&input], &mut out).is_err());
    }
}
