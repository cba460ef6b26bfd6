// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON graph file parsing.
//!
//! A graph file describes the tensor table, which tensors are the graph's
//! inputs and outputs, and the nodes to run in order.
//!
//! # Format
//! ```json
//! {
//!   "name": "scale",
//!   "tensors": [
//!     { "name": "x",     "dtype": "f32", "dims": [1, 4] },
//!     { "name": "scale", "dtype": "f32", "dims": [1, 4] },
//!     { "name": "y",     "dtype": "f32", "dims": [1, 4] }
//!   ],
//!   "inputs": [0, 1],
//!   "outputs": [2],
//!   "nodes": [
//!     { "op": "MUL", "inputs": [0, 1], "outputs": [2] }
//!   ]
//! }
//! ```

use crate::{GraphDef, GraphError, Loaded, NodeDef, TensorDef};
use std::path::Path;

/// Serialized form of a compiled graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphManifest {
    /// Human-readable graph name.
    pub name: String,
    /// Tensor table.
    pub tensors: Vec<TensorDef>,
    /// Indices of graph inputs.
    pub inputs: Vec<usize>,
    /// Indices of graph outputs.
    pub outputs: Vec<usize>,
    /// Nodes in execution order.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

impl GraphManifest {
    /// Loads a graph file from disk.
    pub fn from_file(path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a graph from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serializes the graph back to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Converts into an unvalidated [`GraphDef`].
    pub fn into_graph(self) -> GraphDef<Loaded> {
        GraphDef::new(self.name, self.tensors, self.inputs, self.outputs, self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tensor_core::DType;

    const SAMPLE: &str = r#"{
        "name": "scale",
        "tensors": [
            { "name": "x",     "dtype": "f32", "dims": [1, 4] },
            { "name": "scale", "dtype": "f32", "dims": [1, 4] },
            { "name": "y",     "dtype": "f32", "dims": [1, 4] }
        ],
        "inputs": [0, 1],
        "outputs": [2],
        "nodes": [
            { "op": "MUL", "inputs": [0, 1], "outputs": [2] }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let m = GraphManifest::from_json(SAMPLE).unwrap();
        assert_eq!(m.name, "scale");
        assert_eq!(m.tensors.len(), 3);
        assert_eq!(m.tensors[0].dtype, DType::F32);
        assert_eq!(m.tensors[2].dims.dims(), &[1, 4]);
        assert_eq!(m.nodes[0].op, "MUL");
    }

    #[test]
    fn test_nodes_default_to_empty() {
        let json = r#"{
            "name": "passthrough",
            "tensors": [{ "name": "x", "dtype": "i64", "dims": [] }],
            "inputs": [0],
            "outputs": [0]
        }"#;
        let m = GraphManifest::from_json(json).unwrap();
        assert!(m.nodes.is_empty());
        assert!(m.into_graph().validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            GraphManifest::from_json("{ not json"),
            Err(GraphError::ParseError(_))
        ));
        let unknown_dtype = r#"{
            "name": "g",
            "tensors": [{ "name": "x", "dtype": "f16", "dims": [1] }],
            "inputs": [0],
            "outputs": [0]
        }"#;
        assert!(GraphManifest::from_json(unknown_dtype).is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let m = GraphManifest::from_file(file.path()).unwrap();
        let again = GraphManifest::from_json(&m.to_json_pretty().unwrap()).unwrap();
        assert_eq!(m, again);
    }

    #[test]
    fn test_from_file_missing() {
        let err = GraphManifest::from_file(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, GraphError::ReadError(_)));
    }
}
