// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI helpers.

pub mod inspect;
pub mod run;

use anyhow::Context;
use graph_runtime::{GraphLoader, Model, RuntimeConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

/// Reads `--config`, or falls back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    match path {
        Some(p) => RuntimeConfig::from_file(p)
            .with_context(|| format!("failed to load config '{}'", p.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

/// Loads a model from either a graph file or a configured model id.
pub fn load_model(
    loader: &GraphLoader,
    graph: Option<PathBuf>,
    model: Option<String>,
) -> anyhow::Result<Model> {
    let loaded = match (graph, model) {
        (Some(path), _) => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "graph".to_string());
            loader.load_file(&path, &name)
        }
        (None, Some(id)) => loader.load(&id),
        (None, None) => anyhow::bail!("either --graph or --model is required"),
    };
    loaded.map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))
}
