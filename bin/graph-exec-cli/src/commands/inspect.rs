// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `graph-exec inspect` command: display a graph's contract and tensor table.

use graph_runtime::{GraphLoader, RuntimeConfig};
use std::path::PathBuf;

pub fn execute(
    config: &RuntimeConfig,
    graph: Option<PathBuf>,
    model: Option<String>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             graph-exec · Graph Inspector             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let loader = GraphLoader::new(config.clone())?;
    let model = super::load_model(&loader, graph, model)?;
    let graph = model.graph();
    let contract = model.contract();

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", graph.summary());
    println!("  Budget: {}", config.memory_budget);
    println!();

    // ── Contract ───────────────────────────────────────────────
    println!("  Inputs:");
    for (name, index) in contract.inputs() {
        print_binding(graph.tensor(index), name, index);
    }
    println!("  Outputs:");
    for (name, index) in contract.outputs() {
        print_binding(graph.tensor(index), name, index);
    }
    println!();

    // ── Tensor Table ───────────────────────────────────────────
    println!(
        "  {:<4} {:<28} {:<6} {:<16} {:>10}",
        "Idx", "Name", "DType", "Shape", "Bytes",
    );
    println!("  {}", "-".repeat(68));
    for (i, t) in graph.tensors.iter().enumerate() {
        println!(
            "  {:<4} {:<28} {:<6} {:<16} {:>10}",
            i,
            truncate(&t.name, 28),
            t.dtype.as_str(),
            t.dims.to_string(),
            t.size_bytes().map_or_else(|| "overflow".to_string(), |b| b.to_string()),
        );
    }
    println!();

    // ── Nodes ──────────────────────────────────────────────────
    if graph.nodes.is_empty() {
        println!("  No nodes: outputs are read back as allocated.");
    } else {
        println!("  Nodes:");
        for (i, node) in graph.nodes.iter().enumerate() {
            println!(
                "   {:>3}: {:<10} {:?} -> {:?}",
                i, node.op, node.inputs, node.outputs,
            );
        }
    }
    println!();

    Ok(())
}

fn print_binding(def: Option<&graph_engine::TensorDef>, name: &str, index: usize) {
    match def {
        Some(t) => println!("   {name:<24} #{index:<4} {} {}", t.dtype, t.dims),
        None => println!("   {name:<24} #{index:<4} <missing>"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
