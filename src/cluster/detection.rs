//! Multi-algorithm orchestration with per-invocation failure isolation

use crate::cluster::registry::{AlgorithmRegistry, GraphKind};
use crate::cluster::{DetectionOutcome, PartitionResult};
use crate::graph::CommunityGraph;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Invokes requested algorithms from a registry against one graph.
///
/// Invocations run strictly in sequence; each receives an independently
/// owned clone of the graph, and no failure in one invocation affects any
/// other.
pub struct Orchestrator<'a> {
    registry: &'a AlgorithmRegistry,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over a registry
    pub fn new(registry: &'a AlgorithmRegistry) -> Self {
        Self { registry }
    }

    /// Run every requested algorithm of the given pool against the graph.
    ///
    /// Requested names of the other pool are ignored here (they belong to a
    /// different batch); names of this pool missing from the registry are
    /// warned about once and produce no result.
    pub fn run_batch(
        &self,
        graph: &CommunityGraph,
        graph_label: &str,
        kind: GraphKind,
        requested: &[String],
    ) -> Vec<PartitionResult> {
        let mut results = Vec::new();
        let mut warned: HashSet<&str> = HashSet::new();

        for name in requested {
            if GraphKind::from_name(name) != Some(kind) {
                continue;
            }

            let Some(binding) = self.registry.get(name) else {
                if warned.insert(name.as_str()) {
                    log::warn!("Unknown algorithm '{name}'. Skipping.");
                }
                continue;
            };

            // The registry derives the pool from the prefix, so a binding can
            // never end up in the wrong batch
            debug_assert_eq!(binding.kind, kind);

            log::info!("Running {name} against {graph_label}");

            // Independent copy per invocation: algorithms must not observe
            // each other's mutations
            let copy = graph.clone();
            let outcome = match catch_unwind(AssertUnwindSafe(|| binding.invoke(copy))) {
                Ok(Ok(communities)) => DetectionOutcome::Communities(communities),
                Ok(Err(err)) => {
                    log::error!("Algorithm {name} failed on {graph_label}: {err}");
                    DetectionOutcome::Failed(err.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    log::error!("Algorithm {name} panicked on {graph_label}: {message}");
                    DetectionOutcome::Failed(message)
                }
            };

            results.push(PartitionResult {
                algorithm: name.clone(),
                graph: graph_label.to_string(),
                outcome,
            });
        }

        results
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "algorithm panicked".to_string()
    }
}
