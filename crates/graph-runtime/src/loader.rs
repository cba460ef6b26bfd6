// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Turns configured model ids into ready [`Model`]s.

use crate::error::{ConfigError, LoadError, OK};
use crate::metrics::{MetricsSink, RequestMetrics, LOAD_MODEL_RESULT};
use crate::{Model, RuntimeConfig};
use graph_engine::{GraphDef, GraphError, GraphManifest, MemoryBudget, OpResolver, Validated};
use std::path::Path;
use std::sync::Arc;

/// Loads models named in a [`RuntimeConfig`].
///
/// # Example
/// ```no_run
/// use graph_runtime::{GraphLoader, RuntimeConfig};
/// use std::path::Path;
///
/// let config = RuntimeConfig::from_file(Path::new("runtime.toml")).unwrap();
/// let loader = GraphLoader::new(config).unwrap();
/// let model = loader.load("classifier").unwrap();
/// println!("{}", model.graph().summary());
/// ```
pub struct GraphLoader {
    config: RuntimeConfig,
    budget: MemoryBudget,
    resolver: Arc<OpResolver>,
    metrics: Arc<dyn MetricsSink>,
}

impl GraphLoader {
    /// Creates a loader with the builtin ops and the sink `config` asks for.
    ///
    /// # Errors
    /// [`ConfigError::Budget`] if the configured budget does not parse.
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        let budget = config.parse_budget()?;
        let metrics = config.create_metrics_sink();
        Ok(Self {
            config,
            budget,
            resolver: Arc::new(OpResolver::builtin()),
            metrics,
        })
    }

    /// Resolves ops of every loaded model against `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<OpResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Reports to `metrics` instead of the configured sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Loads the model configured under `model_id`.
    ///
    /// # Errors
    /// - [`LoadError::ModelSpec`] if no such model is configured.
    /// - [`LoadError::LoadModel`] if its graph file cannot be read, parsed
    ///   or validated.
    pub fn load(&self, model_id: &str) -> Result<Model, LoadError> {
        let metrics_name = self
            .config
            .metrics_name(model_id)
            .unwrap_or_else(|| model_id.to_string());
        let window = RequestMetrics::start(self.metrics.as_ref(), &metrics_name, LOAD_MODEL_RESULT);

        let result = match self.config.model_path(model_id) {
            Some(path) => self.build(&path, model_id, &metrics_name),
            None => Err(LoadError::ModelSpec(model_id.to_string())),
        };
        finish(window, &result);
        result
    }

    /// Loads a graph file directly, bypassing the configured model table.
    pub fn load_file(&self, path: &Path, metrics_name: &str) -> Result<Model, LoadError> {
        let window = RequestMetrics::start(self.metrics.as_ref(), metrics_name, LOAD_MODEL_RESULT);
        let result = self.build(path, metrics_name, metrics_name);
        finish(window, &result);
        result
    }

    fn build(&self, path: &Path, model_id: &str, metrics_name: &str) -> Result<Model, LoadError> {
        let graph = read_graph(path).map_err(|e| LoadError::LoadModel {
            model: model_id.to_string(),
            detail: format!("{}: {e}", path.display()),
        })?;
        tracing::info!("loaded {}", graph.summary());

        Ok(Model::new(graph, metrics_name)
            .with_budget(self.budget)
            .with_resolver(Arc::clone(&self.resolver))
            .with_metrics(Arc::clone(&self.metrics)))
    }
}

fn finish(window: RequestMetrics<'_>, result: &Result<Model, LoadError>) {
    match result {
        Ok(_) => window.finish(OK, true),
        Err(e) => {
            tracing::warn!("{e}");
            window.finish(e.code(), false);
        }
    }
}

/// Reads, parses and validates a graph file.
pub fn read_graph(path: &Path) -> Result<GraphDef<Validated>, GraphError> {
    GraphManifest::from_file(path)?.into_graph().validate()
}
