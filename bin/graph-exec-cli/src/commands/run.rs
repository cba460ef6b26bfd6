// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `graph-exec run` command: execute a graph once through the full
//! model → executor path and print the JSON response.

use anyhow::Context;
use graph_engine::TensorDef;
use graph_runtime::{ExecuteRequest, GraphLoader, Model, RuntimeConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tensor_core::{DType, Tensor};

/// Arguments for `graph-exec run`.
pub struct RunArgs {
    pub graph: Option<PathBuf>,
    pub model: Option<String>,
    pub memory_budget: Option<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub request: Option<PathBuf>,
}

pub fn execute(mut config: RuntimeConfig, args: RunArgs) -> anyhow::Result<()> {
    if let Some(budget) = args.memory_budget {
        config.memory_budget = budget;
    }
    let loader = GraphLoader::new(config)?;
    let model = super::load_model(&loader, args.graph, args.model)?;

    let request = match &args.request {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request '{}'", path.display()))?;
            ExecuteRequest::from_json(&json)
                .with_context(|| format!("invalid request JSON in '{}'", path.display()))?
        }
        None => build_request(&model, &args.inputs, &args.outputs)?,
    };

    let (id, close) = model
        .create_executor()
        .map_err(|e| anyhow::anyhow!("{e} ({})", e.code()))?;
    let executor = model
        .executor(id)
        .context("executor closed before it was used")?;

    tracing::info!(executor = %id, outputs = ?request.outputs, "Running request");
    let start = Instant::now();
    let response = request.run(&executor);
    let elapsed = start.elapsed();
    drop(executor);
    close.close();

    println!("{}", response.to_json()?);
    tracing::info!(code = %response.code, elapsed_us = elapsed.as_micros() as u64, "Request finished");

    if !response.is_ok() {
        anyhow::bail!(
            "execution failed: {}",
            response.message.as_deref().unwrap_or(response.code.as_str())
        );
    }
    Ok(())
}

/// Builds a request from `name=v1,v2` arguments. Shapes come from the
/// graph; with no `--output`, every contract output is requested.
fn build_request(
    model: &Model,
    inputs: &[String],
    outputs: &[String],
) -> anyhow::Result<ExecuteRequest> {
    let contract = model.contract();
    let mut tensors = HashMap::with_capacity(inputs.len());
    for arg in inputs {
        let (name, raw) = split_input(arg)?;
        let def = contract
            .input_index(name)
            .and_then(|i| model.graph().tensor(i));
        let tensor = parse_tensor(def, raw)
            .with_context(|| format!("failed to parse input '{name}'"))?;
        tensors.insert(name.to_string(), tensor);
    }

    let outputs = if outputs.is_empty() {
        contract.outputs().map(|(name, _)| name.to_string()).collect()
    } else {
        outputs.to_vec()
    };
    Ok(ExecuteRequest {
        inputs: tensors,
        outputs,
    })
}

fn split_input(arg: &str) -> anyhow::Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((name, values)) if !name.is_empty() => Ok((name, values)),
        _ => anyhow::bail!("expected NAME=VALUES, got '{arg}'"),
    }
}

/// Parses comma-separated values in the wire type matching the slot.
/// Names the graph doesn't know are sent as a flat float64 vector so
/// the runtime reports them.
fn parse_tensor(def: Option<&TensorDef>, raw: &str) -> anyhow::Result<Tensor> {
    let items: Vec<&str> = if raw.trim().is_empty() {
        Vec::new()
    } else {
        raw.split(',').map(str::trim).collect()
    };

    let Some(def) = def else {
        let values = parse_all(&items, |s| s.parse::<f64>().ok())?;
        return Ok(Tensor::float64(vec![items.len() as i64], values));
    };

    let shape = def.dims.to_wire();
    let tensor = match def.dtype {
        DType::F32 => Tensor::float64(shape, parse_all(&items, |s| s.parse().ok())?),
        DType::I32 | DType::I64 => Tensor::int64(shape, parse_all(&items, |s| s.parse().ok())?),
        DType::Bool => Tensor::int64(shape, parse_all(&items, parse_bool)?),
        DType::U8 => Tensor::uint8(shape, parse_all(&items, |s| s.parse().ok())?),
        DType::Str => Tensor::string(shape, items.iter().map(|s| s.to_string()).collect()),
    };
    Ok(tensor)
}

fn parse_bool(s: &str) -> Option<i64> {
    match s {
        "true" => Some(1),
        "false" => Some(0),
        other => other.parse().ok(),
    }
}

fn parse_all<T>(items: &[&str], parse: impl Fn(&str) -> Option<T>) -> anyhow::Result<Vec<T>> {
    items
        .iter()
        .map(|s| parse(s).ok_or_else(|| anyhow::anyhow!("invalid value '{s}'")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::ValueList;

    #[test]
    fn test_split_requires_name() {
        assert_eq!(split_input("x=1,2").unwrap(), ("x", "1,2"));
        assert_eq!(split_input("x=").unwrap(), ("x", ""));
        assert!(split_input("=1").is_err());
        assert!(split_input("x").is_err());
    }

    #[test]
    fn test_values_follow_slot_dtype() {
        let f = TensorDef::new("x", DType::F32, vec![1, 2]);
        assert_eq!(
            parse_tensor(Some(&f), "1.5, -2").unwrap(),
            Tensor::float64(vec![1, 2], vec![1.5, -2.0])
        );

        let b = TensorDef::new("m", DType::Bool, vec![3]);
        assert_eq!(
            parse_tensor(Some(&b), "true,0,false").unwrap(),
            Tensor::int64(vec![3], vec![1, 0, 0])
        );

        let u = TensorDef::new("p", DType::U8, vec![2]);
        let t = parse_tensor(Some(&u), "7,255").unwrap();
        assert_eq!(t.values, ValueList::Uint8(vec![7, 255]));
        assert!(parse_tensor(Some(&u), "256").is_err());
    }

    #[test]
    fn test_unknown_slot_is_flat_float64() {
        let t = parse_tensor(None, "1,2,3").unwrap();
        assert_eq!(t, Tensor::float64(vec![3], vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let f = TensorDef::new("x", DType::I64, vec![1]);
        assert!(parse_tensor(Some(&f), "abc").is_err());
    }
}
