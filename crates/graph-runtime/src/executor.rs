// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One interpreter bound to a shared contract.
//!
//! # Execute
//! Requests are checked completely before anything is written into the
//! interpreter. The first failing check decides the error:
//!
//! ```text
//! 1. requested output unknown        UNKNOWN_OUTPUT_ERROR
//! 2. no outputs requested            OUTPUT_MISSING_ERROR
//! 3. output requested twice          DUPLICATE_OUTPUT_ERROR
//! 4. input name unknown              UNKNOWN_INPUT_ERROR
//! 5. required input absent           INPUT_MISSING_ERROR
//! 6. per input, by name:
//!      string slot                   EXECUTION_ERROR
//!      element type incompatible     INPUT_TYPE_ERROR
//!      shape differs                 INPUT_SHAPE_ERROR
//!      shape/value count disagree    INPUT_FORMAT_ERROR
//! 7. decode, invoke, encode          EXECUTION_ERROR on any failure
//! ```

use crate::codec::{self, CodecError};
use crate::error::{ExecuteError, OK};
use crate::metrics::{MetricsSink, RequestMetrics, EXECUTE_RESULT};
use crate::GraphContract;
use graph_engine::Interpreter;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tensor_core::Tensor;

/// Runs requests against one exclusively owned interpreter.
///
/// An executor is not re-entrant; [`Model`](crate::Model) wraps each one in
/// a `Mutex`. Sibling executors share only the read-only contract.
pub struct GraphExecutor {
    contract: Arc<GraphContract>,
    interpreter: Interpreter,
    metrics_name: String,
    metrics: Arc<dyn MetricsSink>,
}

impl GraphExecutor {
    /// Binds an already prepared interpreter to `contract`.
    pub fn new(
        contract: Arc<GraphContract>,
        interpreter: Interpreter,
        metrics_name: impl Into<String>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            contract,
            interpreter,
            metrics_name: metrics_name.into(),
            metrics,
        }
    }

    pub fn contract(&self) -> &Arc<GraphContract> {
        &self.contract
    }

    /// Feeds `inputs`, runs the graph, and returns `requested_outputs` in
    /// the order given.
    ///
    /// A failed call returns no tensors and leaves the executor ready for
    /// the next call.
    pub fn execute(
        &mut self,
        inputs: &HashMap<String, Tensor>,
        requested_outputs: &[String],
    ) -> Result<Vec<Tensor>, ExecuteError> {
        let window = RequestMetrics::start(self.metrics.as_ref(), &self.metrics_name, EXECUTE_RESULT);
        let result = run(&self.contract, &mut self.interpreter, inputs, requested_outputs);

        match &result {
            Ok(outputs) => {
                tracing::debug!("execute returned {} outputs", outputs.len());
                window.finish(OK, true);
            }
            Err(e) => {
                tracing::warn!("execute rejected: {e}");
                window.finish(e.code(), false);
            }
        }
        result
    }
}

fn run(
    contract: &GraphContract,
    interpreter: &mut Interpreter,
    inputs: &HashMap<String, Tensor>,
    requested_outputs: &[String],
) -> Result<Vec<Tensor>, ExecuteError> {
    // ── Outputs ────────────────────────────────────────────────
    let output_slots = requested_outputs
        .iter()
        .map(|name| {
            contract
                .output_index(name)
                .ok_or_else(|| ExecuteError::UnknownOutput(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if requested_outputs.is_empty() {
        return Err(ExecuteError::OutputMissing);
    }

    let mut seen = HashSet::with_capacity(requested_outputs.len());
    if let Some(dup) = requested_outputs.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(ExecuteError::DuplicateOutput(dup.clone()));
    }

    // ── Inputs ─────────────────────────────────────────────────
    let mut unknown: Vec<&String> = inputs
        .keys()
        .filter(|name| contract.input_index(name).is_none())
        .collect();
    unknown.sort();
    if let Some(name) = unknown.first() {
        return Err(ExecuteError::UnknownInput((*name).clone()));
    }

    let mut bound = Vec::with_capacity(contract.num_inputs());
    for (name, slot) in contract.inputs() {
        let wire = inputs
            .get(name)
            .ok_or_else(|| ExecuteError::InputMissing(name.to_string()))?;
        bound.push((name, slot, wire));
    }

    for &(name, slot, wire) in &bound {
        let tensor = interpreter.tensor(slot)?;
        codec::check(wire, tensor).map_err(|e| input_error(name, e))?;
    }

    // ── Run ────────────────────────────────────────────────────
    for &(name, slot, wire) in &bound {
        codec::decode(wire, interpreter.tensor_mut(slot)?).map_err(|e| input_error(name, e))?;
    }

    interpreter.invoke()?;

    output_slots
        .into_iter()
        .map(|slot| {
            let tensor = interpreter.tensor(slot)?;
            codec::encode(tensor).map_err(|e| ExecuteError::Execution(e.to_string()))
        })
        .collect()
}

fn input_error(name: &str, e: CodecError) -> ExecuteError {
    let name = name.to_string();
    match e {
        CodecError::Incompatible { expected, actual } => ExecuteError::InputType {
            name,
            expected,
            actual,
        },
        CodecError::ShapeMismatch { expected, actual } => ExecuteError::InputShape {
            name,
            expected,
            actual,
        },
        CodecError::InvalidFormat { shape, values } => ExecuteError::InputFormat {
            name,
            shape,
            values,
        },
        other => ExecuteError::Execution(format!("input '{name}': {other}")),
    }
}
