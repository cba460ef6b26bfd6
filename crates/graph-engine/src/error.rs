// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph loading and interpreter execution.

use tensor_core::{DType, TensorError};

/// Errors that can occur when reading or validating a compiled graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The graph file could not be read.
    #[error("failed to read graph: {0}")]
    ReadError(#[from] std::io::Error),

    /// The graph JSON is malformed.
    #[error("failed to parse graph: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A tensor declaration is invalid.
    #[error("invalid tensor '{tensor}': {detail}")]
    InvalidTensor { tensor: String, detail: String },

    /// A node declaration is invalid.
    #[error("invalid node {node} ({op}): {detail}")]
    InvalidNode {
        node: usize,
        op: String,
        detail: String,
    },

    /// The graph as a whole is malformed.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

/// Errors raised by a kernel while evaluating one node.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// The node has the wrong number of inputs or outputs for this op.
    #[error("{op} expects {expected} {role}, got {actual}")]
    Arity {
        op: &'static str,
        role: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A tensor operation failed.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// Errors that can occur while preparing or running an interpreter.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A node names an op the resolver does not know.
    #[error("node {node}: unresolved op '{op}'")]
    UnresolvedOp { node: usize, op: String },

    /// The tensor table does not fit the memory budget.
    #[error("allocation of {requested} bytes exceeds budget of {budget} bytes")]
    AllocationFailed { requested: usize, budget: usize },

    /// `invoke` was called before `allocate_tensors` succeeded.
    #[error("tensors have not been allocated")]
    NotAllocated,

    /// `invoke` was called before `resolve_ops` succeeded.
    #[error("ops have not been resolved")]
    NotResolved,

    /// The interpreter has no tensors to run on.
    #[error("interpreter has no tensors")]
    NoTensors,

    /// A tensor index is outside the tensor table.
    #[error("tensor index {0} out of range")]
    TensorIndexOutOfRange(usize),

    /// A kernel produced data that does not fit its output slot.
    #[error("node {node}: output tensor {tensor} expects {expected}, kernel produced {actual}")]
    OutputTypeMismatch {
        node: usize,
        tensor: usize,
        expected: DType,
        actual: DType,
    },

    /// A kernel resized an output slot.
    #[error("node {node}: output tensor {tensor} holds {expected} elements, kernel produced {actual}")]
    OutputSizeMismatch {
        node: usize,
        tensor: usize,
        expected: usize,
        actual: usize,
    },

    /// A kernel failed.
    #[error("node {node} ({op}) failed: {source}")]
    Kernel {
        node: usize,
        op: String,
        #[source]
        source: KernelError,
    },
}
