// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Live executors of one model, keyed by stable ids.
//!
//! The registry is the only owner of executors. A connection never holds
//! its executor; it holds an [`ExecutorId`] and a [`CloseSignal`]. Firing
//! the signal removes the slot, after which the id resolves to nothing.

use crate::GraphExecutor;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Stable identifier of one executor within its model.
///
/// Ids are never reused, so ordering by id is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecutorId(u64);

impl ExecutorId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executor-{}", self.0)
    }
}

pub(crate) type SharedExecutor = Arc<Mutex<GraphExecutor>>;

/// Insertion-ordered collection of live executors.
#[derive(Default)]
pub struct ExecutorRegistry {
    next_id: AtomicU64,
    executors: Mutex<BTreeMap<ExecutorId, SharedExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stores `executor` and returns its id plus the one-shot signal the
    /// owning connection fires when it closes.
    pub fn register(self: &Arc<Self>, executor: GraphExecutor) -> (ExecutorId, CloseSignal) {
        let id = ExecutorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, Arc::new(Mutex::new(executor)));
        tracing::debug!("registered {id}");

        let signal = CloseSignal {
            registry: Arc::downgrade(self),
            id,
        };
        (id, signal)
    }

    /// Removes exactly the executor `id`. Returns `false` if it was already
    /// gone, which is not an error.
    pub fn on_close(&self, id: ExecutorId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!("closed {id}");
        }
        removed
    }

    pub(crate) fn get(&self, id: ExecutorId) -> Option<SharedExecutor> {
        self.lock().get(&id).cloned()
    }

    /// Ids of every live executor, oldest first.
    pub fn ids(&self) -> Vec<ExecutorId> {
        self.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every executor.
    pub fn clear(&self) -> usize {
        let mut executors = self.lock();
        let n = executors.len();
        executors.clear();
        n
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ExecutorId, SharedExecutor>> {
        // Map operations cannot panic midway, so a poisoned map is intact.
        self.executors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("live", &self.ids())
            .finish()
    }
}

/// Fired once by the connection that owns an executor when it closes.
///
/// The signal holds only a weak reference: once the model is gone there is
/// nothing left to close and firing it does nothing.
#[must_use = "dropping a CloseSignal without firing it keeps the executor alive until its model is dropped"]
#[derive(Debug)]
pub struct CloseSignal {
    registry: Weak<ExecutorRegistry>,
    id: ExecutorId,
}

impl CloseSignal {
    pub fn id(&self) -> ExecutorId {
        self.id
    }

    /// Removes the executor. Returns `true` if this call removed it.
    pub fn close(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.on_close(self.id),
            None => false,
        }
    }
}
