// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Op-name to kernel lookup.

use crate::ops::{Add, Cast, Gelu, Identity, Kernel, Mul, Softmax};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps op names to kernel implementations.
///
/// A resolver is built once and shared; interpreters clone the `Arc`s of
/// the kernels their nodes need during [`Interpreter::resolve_ops`].
///
/// [`Interpreter::resolve_ops`]: crate::Interpreter::resolve_ops
#[derive(Clone, Default)]
pub struct OpResolver {
    kernels: HashMap<String, Arc<dyn Kernel>>,
}

impl OpResolver {
    /// An empty resolver that knows no ops.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A resolver with every builtin kernel registered.
    pub fn builtin() -> Self {
        let mut resolver = Self::empty();
        resolver.register(Arc::new(Identity));
        resolver.register(Arc::new(Cast));
        resolver.register(Arc::new(Add));
        resolver.register(Arc::new(Mul));
        resolver.register(Arc::new(Gelu));
        resolver.register(Arc::new(Softmax));
        resolver
    }

    /// Registers a kernel under its own name, replacing any previous one.
    pub fn register(&mut self, kernel: Arc<dyn Kernel>) -> &mut Self {
        let name = kernel.name().to_string();
        if self.kernels.insert(name.clone(), kernel).is_some() {
            tracing::debug!("replaced kernel for op '{name}'");
        }
        self
    }

    /// Looks up a kernel by op name.
    pub fn find(&self, op: &str) -> Option<Arc<dyn Kernel>> {
        self.kernels.get(op).cloned()
    }

    /// Returns all registered op names, sorted.
    pub fn op_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kernels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for OpResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpResolver")
            .field("ops", &self.op_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ops() {
        let r = OpResolver::builtin();
        assert_eq!(
            r.op_names(),
            vec!["ADD", "CAST", "GELU", "IDENTITY", "MUL", "SOFTMAX"]
        );
        assert_eq!(r.find("GELU").unwrap().name(), "GELU");
        assert!(r.find("gelu").is_none());
    }

    #[test]
    fn test_empty_resolver() {
        assert!(OpResolver::empty().find("IDENTITY").is_none());
    }

    #[test]
    fn test_register_custom() {
        let mut r = OpResolver::empty();
        r.register(Arc::new(Identity)).register(Arc::new(Mul));
        assert_eq!(r.op_names(), vec!["IDENTITY", "MUL"]);
        assert!(format!("{r:?}").contains("IDENTITY"));
    }
}
