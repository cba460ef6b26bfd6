// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-engine
//!
//! A small interpreter for compiled tensor graphs.
//!
//! - [`GraphDef`] — a tensor table plus ordered nodes, with a
//!   **type-state pattern** (`Loaded` → `Validated`).
//! - [`GraphManifest`] — the JSON graph file format.
//! - [`ops`] — the [`Kernel`](ops::Kernel) trait and builtin kernels.
//! - [`OpResolver`] — op-name to kernel lookup.
//! - [`Interpreter`] — owns one tensor table and runs the nodes over it.
//! - [`MemoryBudget`] — caps what one interpreter may allocate.
//!
//! # Example
//! ```
//! use graph_engine::{GraphManifest, Interpreter, MemoryBudget, OpResolver};
//! use std::sync::Arc;
//! use tensor_core::TensorData;
//!
//! let json = r#"{
//!     "name": "copy",
//!     "tensors": [
//!         { "name": "x", "dtype": "f32", "dims": [2] },
//!         { "name": "y", "dtype": "f32", "dims": [2] }
//!     ],
//!     "inputs": [0],
//!     "outputs": [1],
//!     "nodes": [{ "op": "IDENTITY", "inputs": [0], "outputs": [1] }]
//! }"#;
//! let graph = GraphManifest::from_json(json).unwrap().into_graph().validate().unwrap();
//!
//! let mut interp = Interpreter::new(Arc::new(graph));
//! interp.resolve_ops(&OpResolver::builtin()).unwrap();
//! interp.allocate_tensors(MemoryBudget::from_mb(1)).unwrap();
//! interp.tensor_mut(0).unwrap().data_mut()
//!     .overwrite(TensorData::F32(vec![1.0, 2.0])).unwrap();
//! interp.invoke().unwrap();
//! assert_eq!(interp.tensor(1).unwrap().data(), &TensorData::F32(vec![1.0, 2.0]));
//! ```

mod budget;
mod error;
pub mod graph;
mod interpreter;
mod manifest;
pub mod ops;
mod resolver;

pub use budget::{BudgetError, MemoryBudget};
pub use error::{EngineError, GraphError, KernelError};
pub use graph::{GraphDef, GraphState, Loaded, NodeDef, TensorDef, Validated};
pub use interpreter::{EngineTensor, Interpreter};
pub use manifest::GraphManifest;
pub use resolver::OpResolver;
