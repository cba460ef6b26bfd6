// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A loaded graph and the executors created from it.

use crate::error::{CreateExecutorError, ExecuteError, OK};
use crate::metrics::{MetricsSink, NullSink, RequestMetrics, CREATE_EXECUTOR_RESULT};
use crate::registry::{CloseSignal, ExecutorId, ExecutorRegistry, SharedExecutor};
use crate::{GraphContract, GraphExecutor};
use graph_engine::{GraphDef, Interpreter, MemoryBudget, OpResolver, Validated};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, MutexGuard, PoisonError};
use tensor_core::Tensor;

/// A loaded graph: the compiled definition, its contract, and every
/// executor created from it.
///
/// Dropping a `Model` drops all of its executors, whether or not their
/// connections have closed.
///
/// # Example
/// ```
/// use graph_engine::{GraphDef, NodeDef, TensorDef};
/// use graph_runtime::Model;
/// use std::collections::HashMap;
/// use tensor_core::{DType, Tensor};
///
/// let graph = GraphDef::new(
///     "copy",
///     vec![
///         TensorDef::new("in", DType::F32, vec![1]),
///         TensorDef::new("out", DType::F32, vec![1]),
///     ],
///     vec![0],
///     vec![1],
///     vec![NodeDef::new("IDENTITY", vec![0], vec![1])],
/// )
/// .validate()
/// .unwrap();
///
/// let model = Model::new(graph, "copy");
/// let (id, close) = model.create_executor().unwrap();
///
/// let inputs = HashMap::from([("in".to_string(), Tensor::float64(vec![1], vec![0.5]))]);
/// let out = model.executor(id).unwrap().execute(&inputs, &["out".to_string()]).unwrap();
/// assert_eq!(out, vec![Tensor::float64(vec![1], vec![0.5])]);
///
/// close.close();
/// assert_eq!(model.num_executors(), 0);
/// ```
pub struct Model {
    graph: Arc<GraphDef<Validated>>,
    contract: Arc<GraphContract>,
    resolver: Arc<OpResolver>,
    budget: MemoryBudget,
    metrics_name: String,
    metrics: Arc<dyn MetricsSink>,
    registry: Arc<ExecutorRegistry>,
}

impl Model {
    /// Wraps a validated graph with the builtin ops, an unlimited budget
    /// and no metrics.
    pub fn new(graph: GraphDef<Validated>, metrics_name: impl Into<String>) -> Self {
        let contract = Arc::new(GraphContract::from_graph(&graph));
        Self {
            graph: Arc::new(graph),
            contract,
            resolver: Arc::new(OpResolver::builtin()),
            budget: MemoryBudget::unlimited(),
            metrics_name: metrics_name.into(),
            metrics: Arc::new(NullSink),
            registry: ExecutorRegistry::new(),
        }
    }

    /// Resolves ops against `resolver` instead of the builtin set.
    pub fn with_resolver(mut self, resolver: Arc<OpResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Caps each executor's tensor allocation.
    pub fn with_budget(mut self, budget: MemoryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Reports events and timings to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn graph(&self) -> &GraphDef<Validated> {
        &self.graph
    }

    pub fn contract(&self) -> &Arc<GraphContract> {
        &self.contract
    }

    pub fn metrics_name(&self) -> &str {
        &self.metrics_name
    }

    /// Prepares a new interpreter and registers an executor for it.
    ///
    /// # Errors
    /// - [`CreateExecutorError::ModelInterpretation`] if an op cannot be
    ///   resolved.
    /// - [`CreateExecutorError::MemoryAllocation`] if the tensor table does
    ///   not fit the budget.
    ///
    /// No executor is registered on error.
    pub fn create_executor(&self) -> Result<(ExecutorId, CloseSignal), CreateExecutorError> {
        let window = RequestMetrics::start(
            self.metrics.as_ref(),
            &self.metrics_name,
            CREATE_EXECUTOR_RESULT,
        );

        match self.prepare_interpreter() {
            Ok(interpreter) => {
                let executor = GraphExecutor::new(
                    Arc::clone(&self.contract),
                    interpreter,
                    self.metrics_name.clone(),
                    Arc::clone(&self.metrics),
                );
                let (id, signal) = self.registry.register(executor);
                tracing::info!(
                    "created {id} for '{}' ({} live)",
                    self.metrics_name,
                    self.registry.len()
                );
                window.finish(OK, true);
                Ok((id, signal))
            }
            Err(e) => {
                tracing::warn!("cannot create executor for '{}': {e}", self.metrics_name);
                window.finish(e.code(), false);
                Err(e)
            }
        }
    }

    fn prepare_interpreter(&self) -> Result<Interpreter, CreateExecutorError> {
        let mut interpreter = Interpreter::new(Arc::clone(&self.graph));
        interpreter
            .resolve_ops(&self.resolver)
            .map_err(CreateExecutorError::ModelInterpretation)?;
        interpreter
            .allocate_tensors(self.budget)
            .map_err(CreateExecutorError::MemoryAllocation)?;
        Ok(interpreter)
    }

    /// Borrows a live executor. The returned reference cannot outlive the
    /// model.
    pub fn executor(&self, id: ExecutorId) -> Option<ExecutorRef<'_>> {
        self.registry.get(id).map(|inner| ExecutorRef {
            id,
            inner,
            _model: PhantomData,
        })
    }

    /// Removes an executor, as its connection closing would.
    pub fn close_executor(&self, id: ExecutorId) -> bool {
        self.registry.on_close(id)
    }

    /// Ids of every live executor, oldest first.
    pub fn executor_ids(&self) -> Vec<ExecutorId> {
        self.registry.ids()
    }

    pub fn num_executors(&self) -> usize {
        self.registry.len()
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        let n = self.registry.clear();
        if n > 0 {
            tracing::info!("dropping '{}' with {n} live executors", self.metrics_name);
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("graph", &self.graph.name)
            .field("metrics_name", &self.metrics_name)
            .field("budget", &self.budget)
            .field("executors", &self.registry.len())
            .finish()
    }
}

/// A borrowed handle to one executor of a [`Model`].
///
/// Holding the handle keeps the executor alive even if its connection
/// closes meanwhile, so an in-flight call always completes.
pub struct ExecutorRef<'m> {
    id: ExecutorId,
    inner: SharedExecutor,
    _model: PhantomData<&'m Model>,
}

impl ExecutorRef<'_> {
    pub fn id(&self) -> ExecutorId {
        self.id
    }

    /// Runs one request. Calls on the same executor are serialized.
    pub fn execute(
        &self,
        inputs: &HashMap<String, Tensor>,
        requested_outputs: &[String],
    ) -> Result<Vec<Tensor>, ExecuteError> {
        self.lock().execute(inputs, requested_outputs)
    }

    pub fn contract(&self) -> Arc<GraphContract> {
        Arc::clone(self.lock().contract())
    }

    fn lock(&self) -> MutexGuard<'_, GraphExecutor> {
        // A failed execute leaves the executor usable, so poisoning carries
        // no extra meaning here.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RecordingSink;
    use graph_engine::{NodeDef, TensorDef};
    use tensor_core::DType;

    fn identity_graph() -> GraphDef<Validated> {
        GraphDef::new(
            "identity",
            vec![
                TensorDef::new("in", DType::F32, vec![1]),
                TensorDef::new("out", DType::F32, vec![1]),
            ],
            vec![0],
            vec![1],
            vec![NodeDef::new("IDENTITY", vec![0], vec![1])],
        )
        .validate()
        .unwrap()
    }

    #[test]
    fn test_create_executor_records_metrics() {
        let sink = Arc::new(RecordingSink::default());
        let model = Model::new(identity_graph(), "id-model").with_metrics(sink.clone());
        let (_id, _sig) = model.create_executor().unwrap();

        assert_eq!(sink.outcomes(CREATE_EXECUTOR_RESULT), vec!["OK"]);
        assert_eq!(sink.events()[0].model, "id-model");
        assert_eq!(sink.timings().len(), 1);
    }

    #[test]
    fn test_oversized_table_is_allocation_error() {
        // Enlarged after validation so the byte count overflows.
        let mut graph = identity_graph();
        graph.tensors[0].dims = tensor_core::Shape::new(vec![1 << 62, 8]);
        let sink = Arc::new(RecordingSink::default());
        let model = Model::new(graph, "huge").with_metrics(sink.clone());

        let err = model.create_executor().unwrap_err();
        assert_eq!(err.code(), "MEMORY_ALLOCATION_ERROR");
        assert_eq!(sink.outcomes(CREATE_EXECUTOR_RESULT), vec!["MEMORY_ALLOCATION_ERROR"]);
        assert_eq!(model.num_executors(), 0);
    }

    #[test]
    fn test_refused_allocation_without_budget() {
        let graph = GraphDef::new(
            "huge",
            vec![TensorDef::new("x", DType::F32, vec![1 << 40, 1 << 20])],
            vec![0],
            vec![0],
            vec![],
        )
        .validate()
        .unwrap();
        let model = Model::new(graph, "huge");

        let err = model.create_executor().unwrap_err();
        assert_eq!(err.code(), "MEMORY_ALLOCATION_ERROR");
        assert_eq!(model.num_executors(), 0);
    }

    #[test]
    fn test_unresolved_op_is_interpretation_error() {
        let sink = Arc::new(RecordingSink::default());
        let model = Model::new(identity_graph(), "m")
            .with_resolver(Arc::new(OpResolver::empty()))
            .with_metrics(sink.clone());

        let err = model.create_executor().unwrap_err();
        assert_eq!(err.code(), "MODEL_INTERPRETATION_ERROR");
        assert_eq!(model.num_executors(), 0);
        assert_eq!(sink.outcomes(CREATE_EXECUTOR_RESULT), vec!["MODEL_INTERPRETATION_ERROR"]);
        assert!(sink.timings().is_empty());
    }

    #[test]
    fn test_budget_exceeded_is_allocation_error() {
        let model = Model::new(identity_graph(), "m").with_budget(MemoryBudget::from_bytes(4));
        let err = model.create_executor().unwrap_err();
        assert_eq!(err.code(), "MEMORY_ALLOCATION_ERROR");
        assert_eq!(model.num_executors(), 0);
    }

    #[test]
    fn test_executor_ref_survives_close() {
        let model = Model::new(identity_graph(), "m");
        let (id, sig) = model.create_executor().unwrap();
        let exec = model.executor(id).unwrap();
        assert!(sig.close());
        assert!(model.executor(id).is_none());

        // The borrowed handle still completes its call.
        let inputs = HashMap::from([("in".to_string(), Tensor::float64(vec![1], vec![2.0]))]);
        let out = exec.execute(&inputs, &["out".to_string()]).unwrap();
        assert_eq!(out, vec![Tensor::float64(vec![1], vec![2.0])]);
        assert_eq!(exec.id(), id);
        assert_eq!(exec.contract().output_index("out"), Some(1));
    }

    #[test]
    fn test_executors_share_contract() {
        let model = Model::new(identity_graph(), "m");
        let (a, _sa) = model.create_executor().unwrap();
        let (b, _sb) = model.create_executor().unwrap();
        let ca = model.executor(a).unwrap().contract();
        let cb = model.executor(b).unwrap().contract();
        assert!(Arc::ptr_eq(&ca, &cb));
        assert!(Arc::ptr_eq(&ca, model.contract()));
    }

    #[test]
    fn test_close_executor_by_id() {
        let model = Model::new(identity_graph(), "m");
        let (a, _sa) = model.create_executor().unwrap();
        let (b, _sb) = model.create_executor().unwrap();
        assert!(model.close_executor(a));
        assert!(!model.close_executor(a));
        assert_eq!(model.executor_ids(), vec![b]);
    }
}
