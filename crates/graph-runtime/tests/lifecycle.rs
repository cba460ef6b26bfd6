// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Executor creation, closing, and model teardown.

use graph_engine::{GraphDef, NodeDef, TensorDef, Validated};
use graph_runtime::metrics::{RecordingSink, CREATE_EXECUTOR_RESULT};
use graph_runtime::Model;
use std::collections::HashMap;
use std::sync::Arc;
use tensor_core::{DType, Tensor};

fn identity_graph() -> GraphDef<Validated> {
    GraphDef::new(
        "identity",
        vec![
            TensorDef::new("in", DType::F32, vec![1]),
            TensorDef::new("out", DType::F32, vec![1]),
        ],
        vec![0],
        vec![1],
        vec![NodeDef::new("IDENTITY", vec![0], vec![1])],
    )
    .validate()
    .unwrap()
}

fn request(x: f64) -> HashMap<String, Tensor> {
    HashMap::from([("in".to_string(), Tensor::float64(vec![1], vec![x]))])
}

#[test]
fn test_closing_k_of_n_leaves_n_minus_k() {
    let model = Model::new(identity_graph(), "identity");
    let mut created: Vec<_> = (0..5).map(|_| model.create_executor().unwrap()).collect();
    assert_eq!(model.num_executors(), 5);

    // Close the 2nd and 4th.
    let (fourth, fourth_close) = created.remove(3);
    let (second, second_close) = created.remove(1);
    assert!(second_close.close());
    assert!(fourth_close.close());

    assert_eq!(model.num_executors(), 3);
    assert!(model.executor(second).is_none());
    assert!(model.executor(fourth).is_none());

    let remaining: Vec<_> = created.iter().map(|(id, _)| *id).collect();
    assert_eq!(model.executor_ids(), remaining);
    for id in remaining {
        let out = model
            .executor(id)
            .unwrap()
            .execute(&request(1.0), &["out".to_string()])
            .unwrap();
        assert_eq!(out, vec![Tensor::float64(vec![1], vec![1.0])]);
    }
}

#[test]
fn test_repeated_close_is_a_no_op() {
    let model = Model::new(identity_graph(), "identity");
    let (a, a_close) = model.create_executor().unwrap();
    let (b, _b_close) = model.create_executor().unwrap();

    assert!(a_close.close());
    assert!(!model.close_executor(a));
    assert_eq!(model.executor_ids(), vec![b]);
}

#[test]
fn test_dropping_model_drops_every_executor() {
    let sink = Arc::new(RecordingSink::default());
    let model = Model::new(identity_graph(), "identity").with_metrics(sink.clone());
    let signals: Vec<_> = (0..3).map(|_| model.create_executor().unwrap().1).collect();

    // Each executor holds a clone of the sink.
    assert_eq!(Arc::strong_count(&sink), 1 + 1 + 3);
    assert_eq!(sink.outcomes(CREATE_EXECUTOR_RESULT), vec!["OK", "OK", "OK"]);

    drop(model);
    assert_eq!(Arc::strong_count(&sink), 1);

    // Connections closing after the model is gone find nothing to remove.
    for signal in signals {
        assert!(!signal.close());
    }
}

#[test]
fn test_sibling_executors_run_concurrently() {
    let model = Model::new(identity_graph(), "identity");
    let ids: Vec<_> = (0..4).map(|_| model.create_executor().unwrap().0).collect();

    std::thread::scope(|scope| {
        for (n, &id) in ids.iter().enumerate() {
            let model = &model;
            scope.spawn(move || {
                let exec = model.executor(id).unwrap();
                for i in 0..100 {
                    let x = (n * 1000 + i) as f64;
                    let out = exec.execute(&request(x), &["out".to_string()]).unwrap();
                    assert_eq!(out, vec![Tensor::float64(vec![1], vec![x])]);
                }
            });
        }
    });
}

#[test]
fn test_shared_executor_calls_are_serialized() {
    let model = Model::new(identity_graph(), "identity");
    let (id, _close) = model.create_executor().unwrap();

    std::thread::scope(|scope| {
        for n in 0..4 {
            let model = &model;
            scope.spawn(move || {
                let exec = model.executor(id).unwrap();
                for i in 0..50 {
                    let x = (n * 100 + i) as f64;
                    let out = exec.execute(&request(x), &["out".to_string()]).unwrap();
                    assert_eq!(out, vec![Tensor::float64(vec![1], vec![x])]);
                }
            });
        }
    });
}
