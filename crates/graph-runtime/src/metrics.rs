// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request outcome and timing reporting.
//!
//! The runtime never emits telemetry itself. Each operation reports a
//! result event and, on success, the wall-clock time it took to a
//! [`MetricsSink`] owned by the embedding service.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Request name for loading a graph.
pub const LOAD_MODEL_RESULT: &str = "LoadModelResult";
/// Request name for creating an executor.
pub const CREATE_EXECUTOR_RESULT: &str = "CreateGraphExecutorResult";
/// Request name for one execute call.
pub const EXECUTE_RESULT: &str = "ExecuteResult";

/// Receives outcome events and timing windows.
pub trait MetricsSink: Send + Sync {
    /// Records the outcome code of one request.
    fn record_event(&self, model: &str, request: &str, outcome: &str);

    /// Records how long one successful request took.
    fn record_timing(&self, model: &str, request: &str, elapsed: Duration);
}

/// A timing window around one request.
///
/// # Example
/// ```
/// use graph_runtime::metrics::{RecordingSink, RequestMetrics, EXECUTE_RESULT};
///
/// let sink = RecordingSink::default();
/// let window = RequestMetrics::start(&sink, "demo", EXECUTE_RESULT);
/// window.finish("OK", true);
/// assert_eq!(sink.events().len(), 1);
/// assert_eq!(sink.timings().len(), 1);
/// ```
pub struct RequestMetrics<'a> {
    sink: &'a dyn MetricsSink,
    model: &'a str,
    request: &'static str,
    started: Instant,
}

impl<'a> RequestMetrics<'a> {
    /// Opens the timing window.
    pub fn start(sink: &'a dyn MetricsSink, model: &'a str, request: &'static str) -> Self {
        Self {
            sink,
            model,
            request,
            started: Instant::now(),
        }
    }

    /// Closes the window: always records the event, and the timing only
    /// when `success` is set.
    pub fn finish(self, outcome: &str, success: bool) {
        self.sink.record_event(self.model, self.request, outcome);
        if success {
            self.sink
                .record_timing(self.model, self.request, self.started.elapsed());
        }
    }
}

// ── Sinks ──────────────────────────────────────────────────────────

/// Logs every event and timing through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record_event(&self, model: &str, request: &str, outcome: &str) {
        tracing::info!(model, request, outcome, "request finished");
    }

    fn record_timing(&self, model: &str, request: &str, elapsed: Duration) {
        tracing::debug!(
            model,
            request,
            elapsed_us = elapsed.as_micros() as u64,
            "request timing"
        );
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record_event(&self, _: &str, _: &str, _: &str) {}
    fn record_timing(&self, _: &str, _: &str, _: Duration) {}
}

/// One recorded outcome event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub model: String,
    pub request: String,
    pub outcome: String,
}

/// Keeps everything in memory, for tests and for the CLI summary.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
    timings: Mutex<Vec<(String, Duration)>>,
}

impl RecordingSink {
    /// All events recorded so far, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        lock(&self.events).clone()
    }

    /// `(request, elapsed)` for every timing recorded so far.
    pub fn timings(&self) -> Vec<(String, Duration)> {
        lock(&self.timings).clone()
    }

    /// Outcome codes recorded for one request name, oldest first.
    pub fn outcomes(&self, request: &str) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter(|e| e.request == request)
            .map(|e| e.outcome.clone())
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn record_event(&self, model: &str, request: &str, outcome: &str) {
        lock(&self.events).push(RecordedEvent {
            model: model.to_string(),
            request: request.to_string(),
            outcome: outcome.to_string(),
        });
    }

    fn record_timing(&self, _model: &str, request: &str, elapsed: Duration) {
        lock(&self.timings).push((request.to_string(), elapsed));
    }
}

/// A panic while recording cannot leave a `Vec` half-pushed, so a poisoned
/// lock is still safe to use.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
