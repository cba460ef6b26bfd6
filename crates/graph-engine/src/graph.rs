// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compiled graph definition: a tensor table plus an ordered node list.
//!
//! # Type-State Pattern
//!
//! ```text
//! GraphDef<Loaded>     — parsed, indices not yet checked.
//!       │  .validate()
//!       ▼
//! GraphDef<Validated>  — every index in range, ready for an interpreter.
//! ```
//!
//! Interpreters only accept `GraphDef<Validated>`, so index checks happen
//! once per loaded graph rather than once per executor.

use crate::GraphError;
use std::collections::HashSet;
use std::fmt;
use tensor_core::{DType, Shape};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been parsed but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── Table entries ──────────────────────────────────────────────────

/// Declaration of one tensor slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorDef {
    /// Unique name; graph inputs and outputs are addressed by it.
    pub name: String,
    /// Element type of the slot.
    pub dtype: DType,
    /// Fixed dimensions of the slot.
    pub dims: Shape,
}

impl TensorDef {
    pub fn new(name: impl Into<String>, dtype: DType, dims: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            dtype,
            dims: Shape::new(dims),
        }
    }

    /// Bytes needed to back this slot, or `None` if the count overflows.
    pub fn size_bytes(&self) -> Option<usize> {
        self.dims.size_bytes(self.dtype)
    }
}

/// One operation in execution order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDef {
    /// Op name, resolved against an [`OpResolver`](crate::OpResolver).
    pub op: String,
    /// Tensor indices read by the node.
    pub inputs: Vec<usize>,
    /// Tensor indices written by the node.
    pub outputs: Vec<usize>,
}

impl NodeDef {
    pub fn new(op: impl Into<String>, inputs: Vec<usize>, outputs: Vec<usize>) -> Self {
        Self {
            op: op.into(),
            inputs,
            outputs,
        }
    }
}

// ── GraphDef ───────────────────────────────────────────────────────

/// A compiled graph. `S` encodes the validation state at compile time.
#[derive(Debug, Clone)]
pub struct GraphDef<S: GraphState = Loaded> {
    /// Human-readable graph name.
    pub name: String,
    /// The tensor table, addressed by index.
    pub tensors: Vec<TensorDef>,
    /// Indices of tensors the caller fills before each run.
    pub inputs: Vec<usize>,
    /// Indices of tensors the caller reads after each run.
    pub outputs: Vec<usize>,
    /// Nodes in execution order.
    pub nodes: Vec<NodeDef>,
    _state: std::marker::PhantomData<S>,
}

impl GraphDef<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(
        name: impl Into<String>,
        tensors: Vec<TensorDef>,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
        nodes: Vec<NodeDef>,
    ) -> Self {
        Self {
            name: name.into(),
            tensors,
            inputs,
            outputs,
            nodes,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - At least one tensor is declared; names are non-empty and unique.
    /// - Every slot, and the table as a whole, has a byte size no larger
    ///   than `isize::MAX`.
    /// - Graph inputs and outputs are in range and not repeated.
    /// - Every node names an op and only references tensors in range.
    /// - No node writes one of its own inputs or a graph input.
    /// - No tensor is written by more than one node.
    pub fn validate(self) -> Result<GraphDef<Validated>, GraphError> {
        if self.tensors.is_empty() {
            return Err(GraphError::InvalidGraph(format!(
                "graph '{}' declares no tensors",
                self.name
            )));
        }

        let mut names = HashSet::new();
        for t in &self.tensors {
            if t.name.is_empty() {
                return Err(GraphError::InvalidTensor {
                    tensor: t.name.clone(),
                    detail: "empty name".into(),
                });
            }
            if !names.insert(t.name.as_str()) {
                return Err(GraphError::InvalidTensor {
                    tensor: t.name.clone(),
                    detail: "duplicate name".into(),
                });
            }
            if t.size_bytes().filter(|&b| b <= MAX_TABLE_BYTES).is_none() {
                return Err(GraphError::InvalidTensor {
                    tensor: t.name.clone(),
                    detail: format!("{} {} is too large to allocate", t.dtype, t.dims),
                });
            }
        }
        if self.total_tensor_bytes().filter(|&b| b <= MAX_TABLE_BYTES).is_none() {
            return Err(GraphError::InvalidGraph(format!(
                "graph '{}' tensor table is too large to allocate",
                self.name
            )));
        }

        let n = self.tensors.len();
        check_index_list("inputs", &self.inputs, n)?;
        check_index_list("outputs", &self.outputs, n)?;

        let graph_inputs: HashSet<usize> = self.inputs.iter().copied().collect();
        let mut written = HashSet::new();
        for (i, node) in self.nodes.iter().enumerate() {
            let invalid = |detail: String| GraphError::InvalidNode {
                node: i,
                op: node.op.clone(),
                detail,
            };

            if node.op.trim().is_empty() {
                return Err(invalid("missing op name".into()));
            }
            if let Some(&bad) = node.inputs.iter().chain(&node.outputs).find(|&&t| t >= n) {
                return Err(invalid(format!("tensor index {bad} out of range (have {n})")));
            }
            for &out in &node.outputs {
                if node.inputs.contains(&out) {
                    return Err(invalid(format!("output {out} aliases one of its inputs")));
                }
                if graph_inputs.contains(&out) {
                    return Err(invalid(format!("output {out} overwrites a graph input")));
                }
                if !written.insert(out) {
                    return Err(invalid(format!("tensor {out} is written by more than one node")));
                }
            }
        }

        if self.nodes.is_empty() {
            tracing::warn!("graph '{}' has no nodes; outputs are never written", self.name);
        }

        Ok(GraphDef {
            name: self.name,
            tensors: self.tensors,
            inputs: self.inputs,
            outputs: self.outputs,
            nodes: self.nodes,
            _state: std::marker::PhantomData,
        })
    }
}

/// Largest byte size a single allocation can have.
const MAX_TABLE_BYTES: usize = isize::MAX as usize;

fn check_index_list(role: &str, indices: &[usize], n: usize) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for &i in indices {
        if i >= n {
            return Err(GraphError::InvalidGraph(format!(
                "{role} index {i} out of range (have {n} tensors)"
            )));
        }
        if !seen.insert(i) {
            return Err(GraphError::InvalidGraph(format!("{role} lists tensor {i} twice")));
        }
    }
    Ok(())
}

impl<S: GraphState> GraphDef<S> {
    /// Total bytes an interpreter needs for the full tensor table, or
    /// `None` if the sum overflows. Always `Some` on a validated graph.
    pub fn total_tensor_bytes(&self) -> Option<usize> {
        self.tensors
            .iter()
            .try_fold(0usize, |acc, t| acc.checked_add(t.size_bytes()?))
    }
}

impl GraphDef<Validated> {
    /// Returns a tensor declaration by index.
    pub fn tensor(&self, index: usize) -> Option<&TensorDef> {
        self.tensors.get(index)
    }

    /// Returns `(name, index)` for every graph input, in declaration order.
    pub fn input_bindings(&self) -> Vec<(String, usize)> {
        self.bindings(&self.inputs)
    }

    /// Returns `(name, index)` for every graph output, in declaration order.
    pub fn output_bindings(&self) -> Vec<(String, usize)> {
        self.bindings(&self.outputs)
    }

    /// Returns a one-line summary of the graph.
    pub fn summary(&self) -> String {
        format!(
            "Graph '{}': {} tensors, {} nodes, {} inputs, {} outputs, {:.1} KB buffers",
            self.name,
            self.tensors.len(),
            self.nodes.len(),
            self.inputs.len(),
            self.outputs.len(),
            self.total_tensor_bytes().map_or(f64::INFINITY, |b| b as f64 / 1024.0),
        )
    }

    fn bindings(&self, indices: &[usize]) -> Vec<(String, usize)> {
        indices
            .iter()
            .map(|&i| (self.tensors[i].name.clone(), i))
            .collect()
    }
}

impl<S: GraphState> fmt::Display for GraphDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GraphDef '{}' ({} tensors):", self.name, self.tensors.len())?;
        for (i, t) in self.tensors.iter().enumerate() {
            writeln!(f, "  [{i}] {} {} {}", t.name, t.dtype, t.dims)?;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "  node {i}: {} {:?} -> {:?}", node.op, node.inputs, node.outputs)?;
        }
        Ok(())
    }
}
