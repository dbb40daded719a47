//! Clustering quality metrics
//!
//! Each real-valued metric is the mean over communities of a per-community
//! score; `community_count` is the number of non-empty communities after
//! validation. Computation never mutates the graph or the communities.

use crate::cluster::Community;
use crate::graph::CommunityGraph;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashSet};

/// The fixed quality metrics computed per clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Mean of 2·m_c/n_c over communities
    AverageInternalDegree,

    /// Mean of m_c / (n_c(n_c-1)/2) over communities
    InternalEdgeDensity,

    /// Mean of community density relative to whole-graph density
    ScaledDensity,

    /// Mean of max internal degree / (n_c - 1) over communities
    HubDominance,

    /// Mean of boundary / (2·m_c + boundary) over communities
    Conductance,
}

impl MetricKind {
    /// All metrics, in the order they were reported by the original battery
    pub const ALL: [MetricKind; 5] = [
        MetricKind::AverageInternalDegree,
        MetricKind::InternalEdgeDensity,
        MetricKind::ScaledDensity,
        MetricKind::HubDominance,
        MetricKind::Conductance,
    ];

    /// Stable serialized name of the metric
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::AverageInternalDegree => "average_internal_degree",
            MetricKind::InternalEdgeDensity => "internal_edge_density",
            MetricKind::ScaledDensity => "scaled_density",
            MetricKind::HubDominance => "hub_dominance",
            MetricKind::Conductance => "conductance",
        }
    }

    /// Per-community score; singleton communities legitimately yield NaN for
    /// the density and dominance metrics, handled at serialization
    fn score(&self, graph_density: f64, stats: &CommunityStats) -> f64 {
        let n = stats.size as f64;
        let internal = stats.internal_edges as f64;
        let boundary = stats.boundary_edges as f64;

        match self {
            MetricKind::AverageInternalDegree => 2.0 * internal / n,
            MetricKind::InternalEdgeDensity => internal / (n * (n - 1.0) / 2.0),
            MetricKind::ScaledDensity => internal / (n * (n - 1.0) / 2.0) / graph_density,
            MetricKind::HubDominance => stats.max_internal_degree as f64 / (n - 1.0),
            MetricKind::Conductance => boundary / (2.0 * internal + boundary),
        }
    }
}

/// Edge structure of one community inside its graph
struct CommunityStats {
    size: usize,
    internal_edges: usize,
    boundary_edges: usize,
    max_internal_degree: usize,
}

fn community_stats(graph: &CommunityGraph, community: &Community) -> CommunityStats {
    let members: HashSet<u32> = community.iter().copied().collect();

    let mut internal_endpoints = 0;
    let mut boundary_edges = 0;
    let mut max_internal_degree = 0;

    for &node in community {
        let mut internal_degree = 0;
        for &neighbor in graph.neighbors(node as usize) {
            if members.contains(&neighbor) {
                internal_degree += 1;
            } else {
                boundary_edges += 1;
            }
        }
        internal_endpoints += internal_degree;
        max_internal_degree = max_internal_degree.max(internal_degree);
    }

    CommunityStats {
        size: community.len(),
        // Every internal edge was counted from both endpoints
        internal_edges: internal_endpoints / 2,
        boundary_edges,
        max_internal_degree,
    }
}

/// One computed metrics vector, immutable once created
#[derive(Debug, Clone)]
pub struct MetricsRecord {
    /// Metric name -> value
    pub values: BTreeMap<String, f64>,

    /// Number of non-empty communities in the clustering
    pub community_count: usize,
}

/// Computes the configured metric vector for validated clusterings
pub struct MetricsEngine {
    metrics: Vec<MetricKind>,
}

impl MetricsEngine {
    /// Create an engine computing the given metrics
    pub fn new(metrics: Vec<MetricKind>) -> Self {
        Self { metrics }
    }

    /// Create an engine computing the full fixed metric vector
    pub fn with_default_metrics() -> Self {
        Self::new(MetricKind::ALL.to_vec())
    }

    /// Compute the metric vector for one partition-wide clustering
    pub fn compute(&self, graph: &CommunityGraph, communities: &[Community]) -> MetricsRecord {
        let stats: Vec<CommunityStats> = communities
            .iter()
            .map(|community| community_stats(graph, community))
            .collect();
        let graph_density = graph.density();

        let mut values = BTreeMap::new();
        for metric in &self.metrics {
            let mean = stats
                .iter()
                .map(|community| metric.score(graph_density, community))
                .mean();
            values.insert(metric.name().to_string(), mean);
        }

        MetricsRecord {
            values,
            community_count: communities.len(),
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::with_default_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::projection;

    /// Projection of {1,2,5,6} from two complete 2x2 blocks: edges
    /// (1,2) and (5,6), each with weight 1.0
    fn projected_blocks() -> CommunityGraph {
        let mut builder = GraphBuilder::new();
        for id in [1, 2, 5, 6] {
            builder.declare_node(id, 0).unwrap();
        }
        for id in [3, 4, 7, 8] {
            builder.declare_node(id, 1).unwrap();
        }
        for (a, b) in [(1, 3), (1, 4), (2, 3), (2, 4), (5, 7), (5, 8), (6, 7), (6, 8)] {
            builder.add_edge(a, b).unwrap();
        }
        projection::project(&builder.build(), 0)
    }

    #[test]
    fn computes_the_full_metric_vector() {
        let graph = projected_blocks();
        let engine = MetricsEngine::with_default_metrics();
        let communities: Vec<Community> = vec![vec![0, 1], vec![2, 3]];

        let record = engine.compute(&graph, &communities);

        assert_eq!(record.community_count, 2);
        // Each community is a connected pair: one internal edge, no boundary
        assert!((record.values["average_internal_degree"] - 1.0).abs() < 1e-12);
        assert!((record.values["internal_edge_density"] - 1.0).abs() < 1e-12);
        assert!((record.values["hub_dominance"] - 1.0).abs() < 1e-12);
        assert!((record.values["conductance"] - 0.0).abs() < 1e-12);
        // Graph density is 2/6, community density 1.0
        assert!((record.values["scaled_density"] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn singleton_communities_yield_nan_densities() {
        let graph = projected_blocks();
        let engine = MetricsEngine::with_default_metrics();
        let record = engine.compute(&graph, &[vec![0]]);

        assert!(record.values["internal_edge_density"].is_nan());
        assert!(record.values["hub_dominance"].is_nan());
        assert_eq!(record.community_count, 1);
    }

    #[test]
    fn empty_clustering_has_zero_count() {
        let graph = projected_blocks();
        let engine = MetricsEngine::with_default_metrics();
        let record = engine.compute(&graph, &[]);

        assert_eq!(record.community_count, 0);
        assert!(record.values["conductance"].is_nan());
    }
}
