// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON request and response bodies for one execute call.
//!
//! ```json
//! { "inputs": { "in": { "shape": [1], "element_type": "float64", "values": [0.5] } },
//!   "outputs": ["out"] }
//! ```
//!
//! A response carries either `"OK"` and every requested tensor, or an error
//! code and none.

use crate::error::{ExecuteError, OK};
use crate::ExecutorRef;
use std::collections::HashMap;
use tensor_core::Tensor;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub inputs: HashMap<String, Tensor>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl ExecuteRequest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Runs the request on `executor` and wraps the result for the wire.
    pub fn run(&self, executor: &ExecutorRef<'_>) -> ExecuteResponse {
        ExecuteResponse::from(executor.execute(&self.inputs, &self.outputs))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecuteResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub outputs: Vec<Tensor>,
}

impl ExecuteResponse {
    pub fn is_ok(&self) -> bool {
        self.code == OK
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Result<Vec<Tensor>, ExecuteError>> for ExecuteResponse {
    fn from(result: Result<Vec<Tensor>, ExecuteError>) -> Self {
        match result {
            Ok(outputs) => Self {
                code: OK.to_string(),
                message: None,
                outputs,
            },
            Err(e) => Self {
                code: e.code().to_string(),
                message: Some(e.to_string()),
                outputs: Vec::new(),
            },
        }
    }
}
