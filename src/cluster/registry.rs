//! Registry of named community-detection bindings
//!
//! Each binding pairs an identifier with an opaque callable
//! `invoke(graph_copy, params) -> communities | error`. New algorithms are
//! added by registration; the orchestrator never changes.

use crate::cluster::{algorithms, Community};
use crate::graph::CommunityGraph;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Which pool an algorithm belongs to, selected by name-prefix convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// Runs against the original bipartite graph (`bipartite_*`)
    Bipartite,

    /// Runs against a weighted unipartite projection (`unipartite_*`)
    Unipartite,
}

impl GraphKind {
    /// Derive the pool from an algorithm name, if it carries a known prefix
    pub fn from_name(name: &str) -> Option<GraphKind> {
        if name.starts_with("bipartite_") {
            Some(GraphKind::Bipartite)
        } else if name.starts_with("unipartite_") {
            Some(GraphKind::Unipartite)
        } else {
            None
        }
    }
}

/// Tunable parameters handed to an algorithm invocation
#[derive(Debug, Clone)]
pub struct AlgorithmParams {
    /// Modularity resolution (gamma)
    pub resolution: f64,

    /// Iteration cap for convergence loops
    pub max_iter: usize,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
        }
    }
}

/// Signature every registered algorithm satisfies.
///
/// The graph is passed by value: each invocation owns an independent copy and
/// may mutate it freely without other invocations observing anything.
pub type AlgorithmFn =
    Box<dyn Fn(CommunityGraph, &AlgorithmParams) -> Result<Vec<Community>> + Send + Sync>;

/// A named algorithm binding with its parameter set
pub struct AlgorithmBinding {
    /// Pool derived from the name prefix
    pub kind: GraphKind,

    /// Parameters passed on every invocation
    pub params: AlgorithmParams,

    invoke: AlgorithmFn,
}

impl AlgorithmBinding {
    /// Run the algorithm against an owned graph copy
    pub fn invoke(&self, graph: CommunityGraph) -> Result<Vec<Community>> {
        (self.invoke)(graph, &self.params)
    }
}

/// Named algorithm bindings keyed by their registry name
pub struct AlgorithmRegistry {
    bindings: HashMap<String, AlgorithmBinding>,
}

impl AlgorithmRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a registry with the built-in algorithm bindings
    pub fn with_default_bindings() -> Self {
        let mut registry = Self::new();
        let defaults = AlgorithmParams::default();

        // Registration of names with a valid pool prefix cannot fail
        let register = |registry: &mut Self, name: &str, f: AlgorithmFn| {
            registry
                .register(name, defaults.clone(), f)
                .unwrap_or_else(|_| unreachable!("built-in name '{name}' carries a pool prefix"));
        };

        register(
            &mut registry,
            "bipartite_Label_Propagation",
            Box::new(algorithms::bipartite_label_propagation),
        );
        register(
            &mut registry,
            "bipartite_Connected_Components",
            Box::new(algorithms::bipartite_connected_components),
        );
        register(
            &mut registry,
            "unipartite_Louvain",
            Box::new(algorithms::unipartite_louvain),
        );
        register(
            &mut registry,
            "unipartite_Label_Propagation",
            Box::new(algorithms::unipartite_label_propagation),
        );
        register(
            &mut registry,
            "unipartite_Connected_Components",
            Box::new(algorithms::unipartite_connected_components),
        );

        registry
    }

    /// Register an algorithm under a `bipartite_*` or `unipartite_*` name
    pub fn register(
        &mut self,
        name: &str,
        params: AlgorithmParams,
        invoke: AlgorithmFn,
    ) -> Result<()> {
        let kind = GraphKind::from_name(name).ok_or_else(|| {
            anyhow!("algorithm name '{name}' lacks a bipartite_/unipartite_ prefix")
        })?;

        self.bindings.insert(
            name.to_string(),
            AlgorithmBinding {
                kind,
                params,
                invoke,
            },
        );

        Ok(())
    }

    /// Look up a binding by name
    pub fn get(&self, name: &str) -> Option<&AlgorithmBinding> {
        self.bindings.get(name)
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::with_default_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_selects_pool() {
        assert_eq!(
            GraphKind::from_name("bipartite_Foo"),
            Some(GraphKind::Bipartite)
        );
        assert_eq!(
            GraphKind::from_name("unipartite_Bar"),
            Some(GraphKind::Unipartite)
        );
        assert_eq!(GraphKind::from_name("mystery"), None);
    }

    #[test]
    fn default_registry_contains_both_pools() {
        let registry = AlgorithmRegistry::with_default_bindings();
        assert!(registry.contains("bipartite_Label_Propagation"));
        assert!(registry.contains("unipartite_Louvain"));
        assert_eq!(
            registry.get("unipartite_Louvain").unwrap().kind,
            GraphKind::Unipartite
        );
    }

    #[test]
    fn rejects_unprefixed_registration() {
        let mut registry = AlgorithmRegistry::new();
        let result = registry.register(
            "no_prefix",
            AlgorithmParams::default(),
            Box::new(|_, _| Ok(Vec::new())),
        );
        assert!(result.is_err());
    }
}
