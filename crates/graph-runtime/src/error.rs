// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types, one per caller-facing operation.
//!
//! Each operation can fail only in the ways its own enum names, and every
//! variant maps to a stable wire code through `code()`.

use graph_engine::{BudgetError, EngineError};
use std::path::PathBuf;
use tensor_core::{DType, ElementType, Shape};

/// The wire code reported for a successful operation.
pub const OK: &str = "OK";

/// Why a graph could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The requested model id is not configured.
    #[error("unknown model '{0}'")]
    ModelSpec(String),

    /// The graph file could not be read, parsed or validated.
    #[error("failed to load model '{model}': {detail}")]
    LoadModel { model: String, detail: String },
}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::ModelSpec(_) => "MODEL_SPEC_ERROR",
            LoadError::LoadModel { .. } => "LOAD_MODEL_ERROR",
        }
    }
}

/// Why an executor could not be created.
#[derive(Debug, thiserror::Error)]
pub enum CreateExecutorError {
    /// The engine could not bind the graph's ops.
    #[error("model interpretation failed: {0}")]
    ModelInterpretation(#[source] EngineError),

    /// The interpreter's tensor buffers could not be allocated.
    #[error("memory allocation failed: {0}")]
    MemoryAllocation(#[source] EngineError),
}

impl CreateExecutorError {
    pub fn code(&self) -> &'static str {
        match self {
            CreateExecutorError::ModelInterpretation(_) => "MODEL_INTERPRETATION_ERROR",
            CreateExecutorError::MemoryAllocation(_) => "MEMORY_ALLOCATION_ERROR",
        }
    }
}

/// Why an `execute` call was rejected or failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error("requested output '{0}' is not a graph output")]
    UnknownOutput(String),

    #[error("no outputs requested")]
    OutputMissing,

    #[error("output '{0}' requested more than once")]
    DuplicateOutput(String),

    #[error("input '{0}' is not a graph input")]
    UnknownInput(String),

    #[error("required input '{0}' is missing")]
    InputMissing(String),

    #[error("input '{name}': {actual} values cannot feed a {expected} tensor")]
    InputType {
        name: String,
        expected: DType,
        actual: ElementType,
    },

    #[error("input '{name}': shape {actual:?} does not match {expected}")]
    InputShape {
        name: String,
        expected: Shape,
        actual: Vec<i64>,
    },

    #[error("input '{name}': shape {shape:?} declares a different count than the {values} values supplied")]
    InputFormat {
        name: String,
        shape: Vec<i64>,
        values: usize,
    },

    /// The engine failed or produced something that cannot be returned.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl ExecuteError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecuteError::UnknownOutput(_) => "UNKNOWN_OUTPUT_ERROR",
            ExecuteError::OutputMissing => "OUTPUT_MISSING_ERROR",
            ExecuteError::DuplicateOutput(_) => "DUPLICATE_OUTPUT_ERROR",
            ExecuteError::UnknownInput(_) => "UNKNOWN_INPUT_ERROR",
            ExecuteError::InputMissing(_) => "INPUT_MISSING_ERROR",
            ExecuteError::InputType { .. } => "INPUT_TYPE_ERROR",
            ExecuteError::InputShape { .. } => "INPUT_SHAPE_ERROR",
            ExecuteError::InputFormat { .. } => "INPUT_FORMAT_ERROR",
            ExecuteError::Execution(_) => "EXECUTION_ERROR",
        }
    }
}

impl From<EngineError> for ExecuteError {
    fn from(e: EngineError) -> Self {
        ExecuteError::Execution(e.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialise error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid budget: {0}")]
    Budget(#[from] BudgetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_codes() {
        assert_eq!(ExecuteError::UnknownOutput("x".into()).code(), "UNKNOWN_OUTPUT_ERROR");
        assert_eq!(ExecuteError::OutputMissing.code(), "OUTPUT_MISSING_ERROR");
        assert_eq!(ExecuteError::DuplicateOutput("x".into()).code(), "DUPLICATE_OUTPUT_ERROR");
        assert_eq!(ExecuteError::UnknownInput("x".into()).code(), "UNKNOWN_INPUT_ERROR");
        assert_eq!(ExecuteError::InputMissing("x".into()).code(), "INPUT_MISSING_ERROR");
        assert_eq!(
            ExecuteError::InputType {
                name: "x".into(),
                expected: DType::F32,
                actual: ElementType::Int64,
            }
            .code(),
            "INPUT_TYPE_ERROR"
        );
        assert_eq!(
            ExecuteError::InputShape {
                name: "x".into(),
                expected: Shape::vector(1),
                actual: vec![1, 1],
            }
            .code(),
            "INPUT_SHAPE_ERROR"
        );
        assert_eq!(
            ExecuteError::InputFormat {
                name: "x".into(),
                shape: vec![1],
                values: 2,
            }
            .code(),
            "INPUT_FORMAT_ERROR"
        );
        assert_eq!(ExecuteError::from(EngineError::NoTensors).code(), "EXECUTION_ERROR");
    }

    #[test]
    fn test_load_and_create_codes() {
        assert_eq!(LoadError::ModelSpec("m".into()).code(), "MODEL_SPEC_ERROR");
        assert_eq!(
            LoadError::LoadModel {
                model: "m".into(),
                detail: "bad".into()
            }
            .code(),
            "LOAD_MODEL_ERROR"
        );
        assert_eq!(
            CreateExecutorError::ModelInterpretation(EngineError::NotResolved).code(),
            "MODEL_INTERPRETATION_ERROR"
        );
        assert_eq!(
            CreateExecutorError::MemoryAllocation(EngineError::NotAllocated).code(),
            "MEMORY_ALLOCATION_ERROR"
        );
    }

    #[test]
    fn test_messages() {
        let e = ExecuteError::InputShape {
            name: "in".into(),
            expected: Shape::vector(1),
            actual: vec![1, 1],
        };
        assert_eq!(e.to_string(), "input 'in': shape [1, 1] does not match [1]");
    }
}
