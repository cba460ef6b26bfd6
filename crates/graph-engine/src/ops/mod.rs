// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Builtin kernels.
//!
//! Kernels write into output slots that the interpreter has already
//! allocated, so evaluating a node never grows the tensor table.

mod add_mul_op;
mod cast_op;
mod gelu_op;
mod identity_op;
mod softmax_op;

pub use add_mul_op::{Add, Mul};
pub use cast_op::{cast_data, Cast};
pub use gelu_op::Gelu;
pub use identity_op::Identity;
pub use softmax_op::Softmax;

use crate::{EngineTensor, KernelError};

/// One executable operation.
///
/// Implementations must be stateless with respect to a run: the same
/// kernel instance is shared by every interpreter resolved from one
/// [`OpResolver`](crate::OpResolver).
pub trait Kernel: Send + Sync {
    /// The op name nodes use to refer to this kernel.
    fn name(&self) -> &'static str;

    /// Reads `inputs` and writes `outputs`. Output slots arrive with their
    /// declared dtype and element count and must leave with the same.
    fn eval(&self, inputs: &[&EngineTensor], outputs: &mut [EngineTensor])
        -> Result<(), KernelError>;
}

/// Fails unless `actual == expected`.
pub(crate) fn check_arity(
    op: &'static str,
    role: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), KernelError> {
    if expected != actual {
        return Err(KernelError::Arity {
            op,
            role,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::{EngineTensor, TensorDef};
    use tensor_core::{DType, TensorData};

    pub fn f32_tensor(dims: Vec<usize>, values: &[f32]) -> EngineTensor {
        let mut t = EngineTensor::zeros(&TensorDef::new("t", DType::F32, dims)).unwrap();
        t.data_mut().overwrite(TensorData::F32(values.to_vec())).unwrap();
        t
    }

    pub fn slot(dtype: DType, dims: Vec<usize>) -> EngineTensor {
        EngineTensor::zeros(&TensorDef::new("out", dtype, dims)).unwrap()
    }

    pub fn approx_eq(a: &[f32], b: &[f32], tol: f32) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }
}
