// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph interpreter.
//!
//! An [`Interpreter`] owns one tensor table for one compiled graph. It is
//! prepared in two steps and then invoked any number of times:
//!
//! ```text
//! Interpreter::new(graph)
//!   .resolve_ops(&resolver)      — bind every node to a kernel
//!   .allocate_tensors(budget)    — back every slot with a zeroed buffer
//!   .invoke()                    — run nodes in order (repeatable)
//! ```
//!
//! The interpreter is not internally synchronized. Callers that share one
//! across threads must serialize access themselves.

use crate::ops::Kernel;
use crate::{EngineError, GraphDef, MemoryBudget, OpResolver, TensorDef, Validated};
use std::sync::Arc;
use tensor_core::{DType, Shape, TensorData, TensorError};

// ── EngineTensor ───────────────────────────────────────────────────

/// One allocated slot of the tensor table.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineTensor {
    name: String,
    shape: Shape,
    data: TensorData,
}

impl EngineTensor {
    /// Allocates a zero-filled slot matching a declaration. `Str` slots
    /// are filled with empty strings.
    ///
    /// # Errors
    /// [`TensorError::AllocationFailed`] if the element count overflows or
    /// the allocator refuses the buffer.
    pub fn zeros(def: &TensorDef) -> Result<Self, TensorError> {
        let len = def.dims.num_elements().ok_or(TensorError::AllocationFailed {
            dtype: def.dtype,
            len: usize::MAX,
        })?;
        Ok(Self {
            name: def.name.clone(),
            shape: def.dims.clone(),
            data: TensorData::try_zeros(def.dtype, len)?,
        })
    }

    /// Stand-in left in the table while a node holds the real slot.
    fn vacant() -> Self {
        Self {
            name: String::new(),
            shape: Shape::scalar(),
            data: TensorData::F32(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of elements the slot holds.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Mutable access to the slot's buffer. Use [`TensorData::overwrite`]
    /// to replace contents without changing the slot's type or size.
    pub fn data_mut(&mut self) -> &mut TensorData {
        &mut self.data
    }
}

// ── Interpreter ────────────────────────────────────────────────────

/// Executes one compiled graph over its own tensor table.
///
/// `Interpreter::default()` is an interpreter with no graph at all; every
/// [`invoke`](Self::invoke) on it fails with [`EngineError::NoTensors`].
#[derive(Default)]
pub struct Interpreter {
    graph: Option<Arc<GraphDef<Validated>>>,
    kernels: Vec<Arc<dyn Kernel>>,
    tensors: Vec<EngineTensor>,
    resolved: bool,
    allocated: bool,
}

impl Interpreter {
    /// Creates an interpreter for `graph`. Nothing is resolved or allocated yet.
    pub fn new(graph: Arc<GraphDef<Validated>>) -> Self {
        Self {
            graph: Some(graph),
            ..Self::default()
        }
    }

    /// Returns the graph this interpreter runs, if any.
    pub fn graph(&self) -> Option<&GraphDef<Validated>> {
        self.graph.as_deref()
    }

    /// Binds every node to a kernel from `resolver`.
    ///
    /// # Errors
    /// [`EngineError::UnresolvedOp`] for the first node whose op is unknown.
    pub fn resolve_ops(&mut self, resolver: &OpResolver) -> Result<(), EngineError> {
        let graph = self.graph.as_ref().ok_or(EngineError::NoTensors)?;

        let kernels = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                resolver.find(&node.op).ok_or_else(|| EngineError::UnresolvedOp {
                    node: i,
                    op: node.op.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("resolved {} nodes for graph '{}'", kernels.len(), graph.name);
        self.kernels = kernels;
        self.resolved = true;
        Ok(())
    }

    /// Allocates a zeroed buffer for every slot of the tensor table.
    ///
    /// # Errors
    /// [`EngineError::AllocationFailed`] if the table needs more bytes than
    /// `budget` allows, if its size overflows, or if the allocator refuses
    /// a buffer. The interpreter stays unallocated in that case.
    pub fn allocate_tensors(&mut self, budget: MemoryBudget) -> Result<(), EngineError> {
        let graph = self.graph.as_ref().ok_or(EngineError::NoTensors)?;

        let failed = |requested| EngineError::AllocationFailed {
            requested,
            budget: budget.as_bytes(),
        };
        let requested = graph.total_tensor_bytes().ok_or_else(|| failed(usize::MAX))?;
        if !budget.fits(requested) {
            return Err(failed(requested));
        }

        let tensors = graph
            .tensors
            .iter()
            .map(EngineTensor::zeros)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::warn!("allocation for graph '{}' refused: {e}", graph.name);
                failed(requested)
            })?;

        self.tensors = tensors;
        self.allocated = true;
        tracing::debug!(
            "allocated {} tensors ({} bytes, budget {budget}) for graph '{}'",
            self.tensors.len(),
            requested,
            graph.name,
        );
        Ok(())
    }

    /// Returns `true` once [`allocate_tensors`](Self::allocate_tensors) succeeded.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Number of allocated slots; zero before allocation.
    pub fn num_tensors(&self) -> usize {
        self.tensors.len()
    }

    /// Returns an allocated slot.
    pub fn tensor(&self, index: usize) -> Result<&EngineTensor, EngineError> {
        if !self.allocated {
            return Err(EngineError::NotAllocated);
        }
        self.tensors
            .get(index)
            .ok_or(EngineError::TensorIndexOutOfRange(index))
    }

    /// Returns an allocated slot for writing.
    pub fn tensor_mut(&mut self, index: usize) -> Result<&mut EngineTensor, EngineError> {
        if !self.allocated {
            return Err(EngineError::NotAllocated);
        }
        self.tensors
            .get_mut(index)
            .ok_or(EngineError::TensorIndexOutOfRange(index))
    }

    /// Runs every node once, in order.
    ///
    /// # Errors
    /// - [`EngineError::NoTensors`] if there is no graph.
    /// - [`EngineError::NotAllocated`] / [`EngineError::NotResolved`] if a
    ///   preparation step is missing.
    /// - [`EngineError::Kernel`] if a node fails. Earlier nodes' outputs
    ///   keep whatever they wrote.
    pub fn invoke(&mut self) -> Result<(), EngineError> {
        let graph = match &self.graph {
            Some(g) => Arc::clone(g),
            None => return Err(EngineError::NoTensors),
        };
        if !self.allocated {
            return Err(EngineError::NotAllocated);
        }
        if !self.resolved {
            return Err(EngineError::NotResolved);
        }
        if self.tensors.is_empty() {
            return Err(EngineError::NoTensors);
        }

        for (i, node) in graph.nodes.iter().enumerate() {
            let kernel = &self.kernels[i];
            tracing::trace!("node {i}: {} {:?} -> {:?}", node.op, node.inputs, node.outputs);

            // Validation guarantees outputs are distinct and disjoint from
            // inputs, so each output can be lifted out of the table.
            let mut outputs: Vec<EngineTensor> = node
                .outputs
                .iter()
                .map(|&t| std::mem::replace(&mut self.tensors[t], EngineTensor::vacant()))
                .collect();

            let result = {
                let inputs: Vec<&EngineTensor> =
                    node.inputs.iter().map(|&t| &self.tensors[t]).collect();
                kernel.eval(&inputs, &mut outputs)
            };

            let mut restore_err = None;
            for (&t, out) in node.outputs.iter().zip(outputs) {
                let def = &graph.tensors[t];
                let expected_len = def.dims.num_elements().unwrap_or(usize::MAX);
                if out.dtype() != def.dtype {
                    restore_err.get_or_insert(EngineError::OutputTypeMismatch {
                        node: i,
                        tensor: t,
                        expected: def.dtype,
                        actual: out.dtype(),
                    });
                    self.reset_slot(t, def);
                } else if out.num_elements() != expected_len {
                    restore_err.get_or_insert(EngineError::OutputSizeMismatch {
                        node: i,
                        tensor: t,
                        expected: expected_len,
                        actual: out.num_elements(),
                    });
                    self.reset_slot(t, def);
                } else {
                    self.tensors[t] = out;
                }
            }

            result.map_err(|source| EngineError::Kernel {
                node: i,
                op: node.op.clone(),
                source,
            })?;
            if let Some(err) = restore_err {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Puts a zeroed buffer back into slot `t` after a kernel returned a
    /// bad one. If even that fails the table is marked unallocated.
    fn reset_slot(&mut self, t: usize, def: &TensorDef) {
        match EngineTensor::zeros(def) {
            Ok(zeroed) => self.tensors[t] = zeroed,
            Err(e) => {
                tracing::warn!("slot {t} could not be reset: {e}");
                self.allocated = false;
            }
        }
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("graph", &self.graph.as_ref().map(|g| g.name.as_str()))
            .field("tensors", &self.tensors.len())
            .field("resolved", &self.resolved)
            .field("allocated", &self.allocated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KernelError, NodeDef};

    fn graph(tensors: Vec<TensorDef>, inputs: Vec<usize>, outputs: Vec<usize>, nodes: Vec<NodeDef>)
        -> Arc<GraphDef<Validated>> {
        Arc::new(GraphDef::new("test", tensors, inputs, outputs, nodes).validate().unwrap())
    }

    fn identity_graph() -> Arc<GraphDef<Validated>> {
        graph(
            vec![
                TensorDef::new("in", DType::F32, vec![1]),
                TensorDef::new("out", DType::F32, vec![1]),
            ],
            vec![0],
            vec![1],
            vec![NodeDef::new("IDENTITY", vec![0], vec![1])],
        )
    }

    fn ready(g: Arc<GraphDef<Validated>>) -> Interpreter {
        let mut interp = Interpreter::new(g);
        interp.resolve_ops(&OpResolver::builtin()).unwrap();
        interp.allocate_tensors(MemoryBudget::unlimited()).unwrap();
        interp
    }

    fn set_f32(interp: &mut Interpreter, index: usize, values: &[f32]) {
        interp
            .tensor_mut(index)
            .unwrap()
            .data_mut()
            .overwrite(TensorData::F32(values.to_vec()))
            .unwrap();
    }

    #[test]
    fn test_identity_repeated_invoke() {
        let mut interp = ready(identity_graph());

        set_f32(&mut interp, 0, &[0.5]);
        interp.invoke().unwrap();
        assert_eq!(interp.tensor(1).unwrap().data(), &TensorData::F32(vec![0.5]));

        set_f32(&mut interp, 0, &[0.75]);
        interp.invoke().unwrap();
        assert_eq!(interp.tensor(1).unwrap().data(), &TensorData::F32(vec![0.75]));
    }

    #[test]
    fn test_chained_nodes() {
        // y = softmax(a + b)
        let g = graph(
            vec![
                TensorDef::new("a", DType::F32, vec![2]),
                TensorDef::new("b", DType::F32, vec![2]),
                TensorDef::new("sum", DType::F32, vec![2]),
                TensorDef::new("y", DType::F32, vec![2]),
            ],
            vec![0, 1],
            vec![3],
            vec![
                NodeDef::new("ADD", vec![0, 1], vec![2]),
                NodeDef::new("SOFTMAX", vec![2], vec![3]),
            ],
        );
        let mut interp = ready(g);
        set_f32(&mut interp, 0, &[1.0, 0.0]);
        set_f32(&mut interp, 1, &[-1.0, 0.0]);
        interp.invoke().unwrap();

        let y = interp.tensor(3).unwrap().data().as_f32().unwrap();
        assert!((y[0] - 0.5).abs() < 1e-6 && (y[1] - 0.5).abs() < 1e-6);
        assert_eq!(interp.tensor(2).unwrap().name(), "sum");
    }

    #[test]
    fn test_default_interpreter_has_no_tensors() {
        let mut interp = Interpreter::default();
        assert!(matches!(interp.invoke(), Err(EngineError::NoTensors)));
        assert!(matches!(interp.tensor(0), Err(EngineError::NotAllocated)));
        assert!(interp.graph().is_none());
    }

    #[test]
    fn test_invoke_requires_preparation() {
        let mut interp = Interpreter::new(identity_graph());
        assert!(matches!(interp.invoke(), Err(EngineError::NotAllocated)));

        interp.allocate_tensors(MemoryBudget::unlimited()).unwrap();
        assert!(matches!(interp.invoke(), Err(EngineError::NotResolved)));
    }

    #[test]
    fn test_unresolved_op() {
        let mut interp = Interpreter::new(identity_graph());
        let err = interp.resolve_ops(&OpResolver::empty()).unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedOp { node: 0, .. }));
    }

    #[test]
    fn test_allocation_over_budget() {
        let mut interp = Interpreter::new(identity_graph());
        let err = interp.allocate_tensors(MemoryBudget::from_bytes(4)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AllocationFailed { requested: 8, budget: 4 }
        ));
        assert!(!interp.is_allocated());
        assert_eq!(interp.num_tensors(), 0);
    }

    #[test]
    fn test_allocation_overflow_is_an_error() {
        let mut g = (*identity_graph()).clone();
        g.tensors[0].dims = Shape::new(vec![1 << 62, 8]);
        let mut interp = Interpreter::new(Arc::new(g));
        let err = interp.allocate_tensors(MemoryBudget::unlimited()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AllocationFailed { requested: usize::MAX, .. }
        ));
        assert!(!interp.is_allocated());
    }

    #[test]
    fn test_unlimited_budget_reports_refused_allocation() {
        // 2^62 bytes validates but no allocator can provide it.
        let g = graph(
            vec![TensorDef::new("huge", DType::F32, vec![1 << 40, 1 << 20])],
            vec![0],
            vec![0],
            vec![],
        );
        let mut interp = Interpreter::new(g);
        let err = interp.allocate_tensors(MemoryBudget::unlimited()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AllocationFailed { requested, .. } if requested == 1 << 62
        ));
        assert!(!interp.is_allocated());
        assert_eq!(interp.num_tensors(), 0);
    }

    #[test]
    fn test_string_slots_allocate_empty() {
        let g = graph(
            vec![TensorDef::new("s", DType::Str, vec![2])],
            vec![0],
            vec![0],
            vec![],
        );
        let interp = ready(g);
        assert_eq!(
            interp.tensor(0).unwrap().data(),
            &TensorData::Str(vec![String::new(), String::new()])
        );
    }

    #[test]
    fn test_tensor_index_out_of_range() {
        let interp = ready(identity_graph());
        assert!(matches!(
            interp.tensor(7),
            Err(EngineError::TensorIndexOutOfRange(7))
        ));
    }

    #[test]
    fn test_kernel_failure_restores_slots() {
        let g = graph(
            vec![
                TensorDef::new("a", DType::I64, vec![1]),
                TensorDef::new("b", DType::I64, vec![1]),
                TensorDef::new("c", DType::I64, vec![1]),
            ],
            vec![0, 1],
            vec![2],
            vec![NodeDef::new("ADD", vec![0, 1], vec![2])],
        );
        let mut interp = ready(g);
        let err = interp.invoke().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Kernel {
                node: 0,
                source: KernelError::Tensor(_),
                ..
            }
        ));
        let out = interp.tensor(2).unwrap();
        assert_eq!(out.name(), "c");
        assert_eq!(out.dtype(), DType::I64);
    }

    #[derive(Debug)]
    struct Resizing;

    impl Kernel for Resizing {
        fn name(&self) -> &'static str {
            "RESIZE"
        }

        fn eval(&self, _: &[&EngineTensor], outputs: &mut [EngineTensor]) -> Result<(), KernelError> {
            *outputs[0].data_mut() = TensorData::F32(vec![1.0, 2.0, 3.0]);
            Ok(())
        }
    }

    #[test]
    fn test_kernel_resizing_output_is_rejected() {
        let g = graph(
            vec![
                TensorDef::new("in", DType::F32, vec![1]),
                TensorDef::new("out", DType::F32, vec![1]),
            ],
            vec![0],
            vec![1],
            vec![NodeDef::new("RESIZE", vec![0], vec![1])],
        );
        let mut resolver = OpResolver::empty();
        resolver.register(Arc::new(Resizing));

        let mut interp = Interpreter::new(g);
        interp.resolve_ops(&resolver).unwrap();
        interp.allocate_tensors(MemoryBudget::unlimited()).unwrap();

        assert!(matches!(
            interp.invoke(),
            Err(EngineError::OutputSizeMismatch { expected: 1, actual: 3, .. })
        ));
        assert_eq!(interp.tensor(1).unwrap().num_elements(), 1);
    }
}
