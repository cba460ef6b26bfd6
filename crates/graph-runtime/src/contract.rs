// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The name-to-slot contract of a loaded graph.

use graph_engine::{GraphDef, Validated};
use std::collections::BTreeMap;

/// Which names a caller must supply and may request, and which engine
/// tensor slot each name is bound to.
///
/// Built once per loaded graph and shared read-only (behind an `Arc`) by
/// every executor of that graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphContract {
    required_inputs: BTreeMap<String, usize>,
    required_outputs: BTreeMap<String, usize>,
}

impl GraphContract {
    /// Creates a contract from explicit name bindings.
    pub fn new(
        required_inputs: impl IntoIterator<Item = (String, usize)>,
        required_outputs: impl IntoIterator<Item = (String, usize)>,
    ) -> Self {
        Self {
            required_inputs: required_inputs.into_iter().collect(),
            required_outputs: required_outputs.into_iter().collect(),
        }
    }

    /// Binds the graph's declared inputs and outputs by tensor name.
    pub fn from_graph(graph: &GraphDef<Validated>) -> Self {
        Self::new(graph.input_bindings(), graph.output_bindings())
    }

    /// Slot index of a required input.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.required_inputs.get(name).copied()
    }

    /// Slot index of a required output.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.required_outputs.get(name).copied()
    }

    /// Required inputs, sorted by name.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, usize)> {
        self.required_inputs.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Required outputs, sorted by name.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, usize)> {
        self.required_outputs.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn num_inputs(&self) -> usize {
        self.required_inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.required_outputs.len()
    }
}
