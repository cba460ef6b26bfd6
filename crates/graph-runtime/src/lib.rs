// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-runtime
//!
//! The request-facing core of the graph execution service.
//!
//! - [`Model`] — a loaded graph; creates and owns its executors.
//! - [`GraphContract`] — the input/output names of a graph, shared by every
//!   executor of a model.
//! - [`GraphExecutor`] — one interpreter; validates, decodes, runs and
//!   encodes each request.
//! - [`ExecutorRegistry`] — live executors keyed by [`ExecutorId`]; a
//!   [`CloseSignal`] removes one when its connection closes.
//! - [`codec`] — wire tensor ⇄ engine slot conversion.
//! - [`GraphLoader`] / [`RuntimeConfig`] — configured model loading.
//! - [`metrics`] — outcome events and timing windows.
//!
//! # Ownership
//! ```text
//! Model ──owns──▶ ExecutorRegistry ──owns──▶ GraphExecutor ──owns──▶ Interpreter
//!   │                                           │
//!   └──Arc──▶ GraphContract ◀────────Arc────────┘
//! ```
//! Dropping the model drops every executor. Connections hold only ids.

pub mod codec;
mod config;
mod contract;
mod error;
mod executor;
mod loader;
pub mod metrics;
mod model;
mod registry;
mod request;

pub use config::{ModelEntry, RuntimeConfig};
pub use contract::GraphContract;
pub use error::{ConfigError, CreateExecutorError, ExecuteError, LoadError, OK};
pub use executor::GraphExecutor;
pub use loader::{read_graph, GraphLoader};
pub use model::{ExecutorRef, Model};
pub use registry::{CloseSignal, ExecutorId, ExecutorRegistry};
pub use request::{ExecuteRequest, ExecuteResponse};
