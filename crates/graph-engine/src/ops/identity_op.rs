// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Copies its input to its output unchanged.

use super::{check_arity, Kernel};
use crate::{EngineTensor, KernelError};

/// `IDENTITY`: one input, one output of the same dtype and element count.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Identity {
    pub const NAME: &'static str = "IDENTITY";
}

impl Kernel for Identity {
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
        outputs[0].data_mut().overwrite(inputs[0].data().clone())?;
        Ok(())
    }
}
