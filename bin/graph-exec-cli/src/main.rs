// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-exec
//!
//! Command-line interface for the graph execution runtime.
//!
//! ## Usage
//! ```bash
//! # Print a graph's contract and tensor table
//! graph-exec inspect --graph ./models/scale.json
//!
//! # Execute once with inline inputs
//! graph-exec run --graph ./models/scale.json \
//!     --input x=1.5,-2 --input scale=2,0.5 --output y
//!
//! # Execute a JSON request against a configured model
//! graph-exec --config runtime.toml run --model scale --request request.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "graph-exec",
    about = "Load, inspect and execute compiled tensor graphs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML runtime configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the graph comes from: a file, or a model id from the config.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct GraphSource {
    /// Path to a graph JSON file.
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Model id from the `[models]` table of `--config`.
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a graph's inputs, outputs, tensors and nodes.
    Inspect {
        #[command(flatten)]
        source: GraphSource,
    },

    /// Execute a graph once and print the response as JSON.
    Run {
        #[command(flatten)]
        source: GraphSource,

        /// Per-executor memory budget (e.g., "64M"). Overrides the config.
        #[arg(short = 'b', long)]
        memory_budget: Option<String>,

        /// Input as `name=v1,v2,...`; the shape is taken from the graph.
        #[arg(short, long = "input", value_name = "NAME=VALUES")]
        inputs: Vec<String>,

        /// Output name to return; repeat for several, in order.
        #[arg(short, long = "output", value_name = "NAME")]
        outputs: Vec<String>,

        /// JSON request file (`{"inputs": {...}, "outputs": [...]}`);
        /// replaces `--input` / `--output`.
        #[arg(short, long, conflicts_with_all = ["inputs", "outputs"])]
        request: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Inspect { source } => {
            commands::inspect::execute(&config, source.graph, source.model)
        }
        Commands::Run {
            source,
            memory_budget,
            inputs,
            outputs,
            request,
        } => commands::run::execute(
            config,
            commands::run::RunArgs {
                graph: source.graph,
                model: source.model,
                memory_budget,
                inputs,
                outputs,
                request,
            },
        ),
    }
}
