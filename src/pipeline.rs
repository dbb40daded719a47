//! End-to-end detection pipeline
//!
//! `run_pipeline` is the single pure entry point a thin driver calls
//! repeatedly: load -> project -> orchestrate -> validate -> score ->
//! consolidate. It fails the run, never the process.

use crate::cluster::detection::Orchestrator;
use crate::cluster::metrics::MetricsEngine;
use crate::cluster::registry::{AlgorithmRegistry, GraphKind};
use crate::cluster::validation::{split_bipartite_communities, validate_communities};
use crate::cluster::{Community, PartitionResult};
use crate::data;
use crate::graph::{projection, CommunityGraph};
use crate::storage::Report;
use anyhow::Result;
use std::path::Path;

/// Run the full pipeline for one input file, producing one report per
/// original partition set.
pub fn run_pipeline(
    input: &Path,
    registry: &AlgorithmRegistry,
    engine: &MetricsEngine,
) -> Result<(Report, Report)> {
    let (graph, methods) = data::load_graph(input)?;

    let projection0 = projection::project(&graph, 0);
    let projection1 = projection::project(&graph, 1);

    let orchestrator = Orchestrator::new(registry);
    let bipartite_results =
        orchestrator.run_batch(&graph, "bipartite", GraphKind::Bipartite, &methods);
    let unipartite_results_0 =
        orchestrator.run_batch(&projection0, "projection_set0", GraphKind::Unipartite, &methods);
    let unipartite_results_1 =
        orchestrator.run_batch(&projection1, "projection_set1", GraphKind::Unipartite, &methods);

    let mut set0 = Report::new();
    let mut set1 = Report::new();

    consolidate_bipartite(&graph, engine, bipartite_results, &mut set0, &mut set1)?;
    consolidate_unipartite(&projection0, engine, unipartite_results_0, &mut set0);
    consolidate_unipartite(&projection1, engine, unipartite_results_1, &mut set1);

    Ok((set0, set1))
}

/// Validate, split and score bipartite-graph results.
///
/// Metrics are computed once over the unsplit clustering and attached to both
/// partition reports, matching the derived communities' shared origin.
fn consolidate_bipartite(
    graph: &CommunityGraph,
    engine: &MetricsEngine,
    results: Vec<PartitionResult>,
    set0: &mut Report,
    set1: &mut Report,
) -> Result<()> {
    for result in results {
        let Some(valid) = validated_communities(graph, &result) else {
            continue;
        };

        let (communities0, communities1) = split_bipartite_communities(graph, &valid)?;
        let metrics = engine.compute(graph, &valid);

        set0.insert(
            &result.algorithm,
            to_external_ids(graph, &communities0),
            metrics.clone(),
        );
        set1.insert(
            &result.algorithm,
            to_external_ids(graph, &communities1),
            metrics,
        );
    }

    Ok(())
}

/// Validate and score projection results into one partition report
fn consolidate_unipartite(
    projection: &CommunityGraph,
    engine: &MetricsEngine,
    results: Vec<PartitionResult>,
    report: &mut Report,
) {
    for result in results {
        let Some(valid) = validated_communities(projection, &result) else {
            continue;
        };

        let metrics = engine.compute(projection, &valid);
        report.insert(
            &result.algorithm,
            to_external_ids(projection, &valid),
            metrics,
        );
    }
}

/// Extract and validate a result's communities; failures were already logged
/// by the orchestrator, rejections are logged here. Either way the sibling
/// results proceed.
fn validated_communities(
    graph: &CommunityGraph,
    result: &PartitionResult,
) -> Option<Vec<Community>> {
    let communities = result.communities()?.to_vec();

    match validate_communities(graph, communities) {
        Ok(valid) => Some(valid),
        Err(err) => {
            log::error!(
                "Invalid clustering from {} on {}: {err}. Result excluded.",
                result.algorithm,
                result.graph
            );
            None
        }
    }
}

fn to_external_ids(graph: &CommunityGraph, communities: &[Community]) -> Vec<Vec<i64>> {
    communities
        .iter()
        .map(|community| {
            community
                .iter()
                .map(|&node| graph.node_id(node as usize))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::registry::AlgorithmParams;
    use anyhow::anyhow;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_input(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn mixed_community_result_is_dropped_while_siblings_proceed() {
        let mut registry = AlgorithmRegistry::new();
        registry
            .register(
                "bipartite_mixer",
                AlgorithmParams::default(),
                // One community spanning both partitions
                Box::new(|graph, _| Ok(vec![(0..graph.node_count as u32).collect()])),
            )
            .unwrap();
        registry
            .register(
                "bipartite_sides",
                AlgorithmParams::default(),
                Box::new(|graph, _| {
                    Ok(vec![
                        graph.partition_members(0).to_vec(),
                        graph.partition_members(1).to_vec(),
                    ])
                }),
            )
            .unwrap();

        let file = write_input("bipartite_mixer bipartite_sides\n1 2\n3 4\n1 3\n1 4\n2 3\n");
        let engine = MetricsEngine::with_default_metrics();
        let (set0, set1) = run_pipeline(file.path(), &registry, &engine).unwrap();

        assert!(set0.get("bipartite_mixer").is_none());
        assert!(set1.get("bipartite_mixer").is_none());
        assert_eq!(
            set0.get("bipartite_sides").unwrap().communities,
            vec![vec![1, 2]]
        );
        assert_eq!(
            set1.get("bipartite_sides").unwrap().communities,
            vec![vec![3, 4]]
        );
    }

    #[test]
    fn failing_algorithm_is_isolated_from_successful_sibling() {
        let mut registry = AlgorithmRegistry::new();
        registry
            .register(
                "unipartite_raises",
                AlgorithmParams::default(),
                Box::new(|_, _| Err(anyhow!("always fails"))),
            )
            .unwrap();
        registry
            .register(
                "unipartite_whole",
                AlgorithmParams::default(),
                Box::new(|graph, _| Ok(vec![(0..graph.node_count as u32).collect()])),
            )
            .unwrap();

        let file = write_input("unipartite_raises unipartite_whole\n1 2\n3 4\n1 3\n1 4\n2 3\n");
        let engine = MetricsEngine::with_default_metrics();
        let (set0, _) = run_pipeline(file.path(), &registry, &engine).unwrap();

        assert!(set0.get("unipartite_raises").is_none());
        let entry = set0.get("unipartite_whole").unwrap();
        assert_eq!(entry.communities, vec![vec![1, 2]]);
        assert_eq!(entry.metrics.community_count, 1);
    }

    #[test]
    fn empty_communities_are_excluded_from_the_count() {
        let mut registry = AlgorithmRegistry::new();
        registry
            .register(
                "unipartite_padded",
                AlgorithmParams::default(),
                Box::new(|graph, _| {
                    Ok(vec![
                        Vec::new(),
                        (0..graph.node_count as u32).collect(),
                        Vec::new(),
                    ])
                }),
            )
            .unwrap();

        let file = write_input("unipartite_padded\n1 2\n3 4\n1 3\n1 4\n2 3\n");
        let engine = MetricsEngine::with_default_metrics();
        let (set0, set1) = run_pipeline(file.path(), &registry, &engine).unwrap();

        assert_eq!(set0.get("unipartite_padded").unwrap().metrics.community_count, 1);
        assert_eq!(set1.get("unipartite_padded").unwrap().metrics.community_count, 1);
    }
}
