// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_dir = "./models"
//! memory_budget = "64M"
//! enable_metrics = true
//!
//! [models.classifier]
//! file = "classifier.json"
//! metrics_name = "Classifier"
//! ```

use crate::error::ConfigError;
use crate::metrics::{MetricsSink, NullSink, TracingSink};
use graph_engine::MemoryBudget;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the graph runtime.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Directory that model files are resolved against.
    pub model_dir: PathBuf,
    /// Per-executor allocation budget (human-readable, e.g., `"64M"`).
    pub memory_budget: String,
    /// Whether request events and timings are logged.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
    /// Loadable models, keyed by model id.
    #[serde(default)]
    pub models: BTreeMap<String, ModelEntry>,
}

/// One loadable model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelEntry {
    /// Graph file, relative to `model_dir` unless absolute.
    pub file: PathBuf,
    /// Name reported to metrics; defaults to the model id.
    pub metrics_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parses the memory budget string into a [`MemoryBudget`].
    pub fn parse_budget(&self) -> Result<MemoryBudget, ConfigError> {
        Ok(MemoryBudget::parse(&self.memory_budget)?)
    }

    /// Looks up a configured model.
    pub fn model(&self, id: &str) -> Option<&ModelEntry> {
        self.models.get(id)
    }

    /// Full path of a configured model's graph file.
    pub fn model_path(&self, id: &str) -> Option<PathBuf> {
        self.model(id).map(|entry| self.model_dir.join(&entry.file))
    }

    /// Name a configured model reports to metrics.
    pub fn metrics_name(&self, id: &str) -> Option<String> {
        self.model(id)
            .map(|entry| entry.metrics_name.clone().unwrap_or_else(|| id.to_string()))
    }

    /// Creates the metrics sink this config asks for.
    pub fn create_metrics_sink(&self) -> Arc<dyn MetricsSink> {
        if self.enable_metrics {
            Arc::new(TracingSink)
        } else {
            Arc::new(NullSink)
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models"),
            memory_budget: "64M".to_string(),
            enable_metrics: true,
            models: BTreeMap::new(),
        }
    }
}
