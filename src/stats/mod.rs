//! Descriptive graph statistics reporting
//!
//! Consumes only the graph model, independent of the detection pipeline:
//! whole-graph aggregates plus per-node degree, centralities, PageRank and
//! local clustering. The per-source BFS passes run on the rayon pool.

use crate::graph::CommunityGraph;
use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const ITERATION_CAP: usize = 100;
const CONVERGENCE_TOL: f64 = 1e-6;
const PAGERANK_DAMPING: f64 = 0.85;

/// Per-node descriptive record
#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    pub degree: usize,
    pub eigenvector_centrality: f64,
    pub betweenness_centrality: f64,
    pub closeness_centrality: f64,
    pub pagerank: f64,
    pub clustering_coefficient: f64,
}

/// Whole-graph aggregates
#[derive(Debug, Serialize)]
pub struct GraphLevelStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_assortativity: Option<f64>,
    pub average_degree: f64,
    pub set0_size: usize,
    pub set1_size: usize,
    pub set0_density: f64,
    pub avg_degree_set0: f64,
    pub avg_degree_set1: f64,
    pub avg_eigenvector_centrality_set0: f64,
    pub avg_eigenvector_centrality_set1: f64,
    pub avg_betweenness_centrality_set0: f64,
    pub avg_betweenness_centrality_set1: f64,
    pub avg_closeness_centrality_set0: f64,
    pub avg_closeness_centrality_set1: f64,
    pub avg_pagerank_set0: f64,
    pub avg_pagerank_set1: f64,
}

/// The full descriptive-statistics document
#[derive(Debug, Serialize)]
pub struct GraphStatsReport {
    pub graph_level: GraphLevelStats,
    pub set0: BTreeMap<String, NodeStats>,
    pub set1: BTreeMap<String, NodeStats>,
}

/// Compute the descriptive-statistics report for a bipartite graph
pub fn compute_graph_stats(graph: &CommunityGraph) -> GraphStatsReport {
    let n = graph.node_count;
    log::info!("Computing descriptive statistics for {} nodes", n);

    let eigenvector = eigenvector_centrality(graph);
    let betweenness = betweenness_centrality(graph);
    let closeness = closeness_centrality(graph);
    let pagerank = pagerank(graph);

    let per_node = |node: u32| -> (String, NodeStats) {
        let idx = node as usize;
        (
            graph.node_id(idx).to_string(),
            NodeStats {
                degree: graph.degree(idx),
                eigenvector_centrality: eigenvector[idx],
                betweenness_centrality: betweenness[idx],
                closeness_centrality: closeness[idx],
                pagerank: pagerank[idx],
                clustering_coefficient: local_clustering(graph, idx),
            },
        )
    };

    let set0: BTreeMap<String, NodeStats> = graph
        .partition_members(0)
        .iter()
        .map(|&node| per_node(node))
        .collect();
    let set1: BTreeMap<String, NodeStats> = graph
        .partition_members(1)
        .iter()
        .map(|&node| per_node(node))
        .collect();

    let degrees: Vec<f64> = (0..n).map(|node| graph.degree(node) as f64).collect();
    let set_mean = |values: &[f64], partition: u8| -> f64 {
        graph
            .partition_members(partition)
            .iter()
            .map(|&node| values[node as usize])
            .mean()
    };

    let graph_level = GraphLevelStats {
        num_nodes: n,
        num_edges: graph.edge_count(),
        density: graph.density(),
        degree_assortativity: degree_assortativity(graph),
        average_degree: degrees.iter().mean(),
        set0_size: graph.partition_members(0).len(),
        set1_size: graph.partition_members(1).len(),
        set0_density: graph.bipartite_density(),
        avg_degree_set0: set_mean(&degrees, 0),
        avg_degree_set1: set_mean(&degrees, 1),
        avg_eigenvector_centrality_set0: set_mean(&eigenvector, 0),
        avg_eigenvector_centrality_set1: set_mean(&eigenvector, 1),
        avg_betweenness_centrality_set0: set_mean(&betweenness, 0),
        avg_betweenness_centrality_set1: set_mean(&betweenness, 1),
        avg_closeness_centrality_set0: set_mean(&closeness, 0),
        avg_closeness_centrality_set1: set_mean(&closeness, 1),
        avg_pagerank_set0: set_mean(&pagerank, 0),
        avg_pagerank_set1: set_mean(&pagerank, 1),
    };

    GraphStatsReport {
        graph_level,
        set0,
        set1,
    }
}

/// Write the report as pretty-printed JSON
pub fn write_graph_stats(report: &GraphStatsReport, path: &Path) -> Result<()> {
    log::info!("Saving graph statistics to {}", path.display());

    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

    Ok(())
}

/// Eigenvector centrality via power iteration, L2-normalized
fn eigenvector_centrality(graph: &CommunityGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }

    let mut current = vec![1.0 / n as f64; n];

    for _ in 0..ITERATION_CAP {
        let mut next = vec![0.0; n];
        for node in 0..n {
            for &neighbor in graph.neighbors(node) {
                next[neighbor as usize] += current[node];
            }
        }

        let norm = next.iter().map(|value| value * value).sum::<f64>().sqrt();
        if norm == 0.0 {
            // Edgeless graph: centrality is identically zero
            return next;
        }
        for value in &mut next {
            *value /= norm;
        }

        let drift: f64 = next
            .iter()
            .zip(&current)
            .map(|(a, b)| (a - b).abs())
            .sum();
        current = next;
        if drift < CONVERGENCE_TOL * n as f64 {
            break;
        }
    }

    current
}

/// PageRank with uniform teleport and dangling-mass redistribution
fn pagerank(graph: &CommunityGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }

    let uniform = 1.0 / n as f64;
    let mut rank = vec![uniform; n];

    for _ in 0..ITERATION_CAP {
        let dangling: f64 = (0..n)
            .filter(|&node| graph.degree(node) == 0)
            .map(|node| rank[node])
            .sum();

        let mut next = vec![(1.0 - PAGERANK_DAMPING) * uniform; n];
        for node in 0..n {
            let degree = graph.degree(node);
            if degree == 0 {
                continue;
            }
            let share = PAGERANK_DAMPING * rank[node] / degree as f64;
            for &neighbor in graph.neighbors(node) {
                next[neighbor as usize] += share;
            }
        }
        for value in &mut next {
            *value += PAGERANK_DAMPING * dangling * uniform;
        }

        let drift: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if drift < CONVERGENCE_TOL * n as f64 {
            break;
        }
    }

    rank
}

/// Betweenness centrality (Brandes), normalized, BFS per source in parallel
fn betweenness_centrality(graph: &CommunityGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }

    let totals = (0..n)
        .into_par_iter()
        .map(|source| brandes_contribution(graph, source))
        .reduce(
            || vec![0.0; n],
            |mut acc, partial| {
                for (a, p) in acc.iter_mut().zip(&partial) {
                    *a += p;
                }
                acc
            },
        );

    // Undirected: every pair was accumulated from both endpoints; rescale by
    // the number of ordered node triples when defined
    let scale = if n > 2 {
        1.0 / ((n - 1) as f64 * (n - 2) as f64)
    } else {
        0.5
    };

    totals.into_iter().map(|value| value * scale).collect()
}

fn brandes_contribution(graph: &CommunityGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count;
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v as u32);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    let mut contribution = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            let v = v as usize;
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != source {
            contribution[w] = delta[w];
        }
    }

    contribution
}

/// Closeness centrality with the Wasserman-Faust reachable-fraction scaling
fn closeness_centrality(graph: &CommunityGraph) -> Vec<f64> {
    let n = graph.node_count;

    (0..n)
        .into_par_iter()
        .map(|source| {
            let dist = bfs_distances(graph, source);
            let mut total = 0i64;
            let mut reachable = 0i64;
            for (node, &d) in dist.iter().enumerate() {
                if node != source && d >= 0 {
                    total += d;
                    reachable += 1;
                }
            }

            if total > 0 {
                let r = reachable as f64;
                (r / total as f64) * (r / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect()
}

fn bfs_distances(graph: &CommunityGraph, source: usize) -> Vec<i64> {
    let mut dist = vec![-1i64; graph.node_count];
    let mut queue = VecDeque::new();
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Local clustering coefficient: closed neighbor pairs / possible pairs
fn local_clustering(graph: &CommunityGraph, node: usize) -> f64 {
    let neighbors = graph.neighbors(node);
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let mut links = 0usize;
    for i in 0..k {
        for j in (i + 1)..k {
            if graph.has_edge(neighbors[i] as usize, neighbors[j]) {
                links += 1;
            }
        }
    }

    2.0 * links as f64 / (k * (k - 1)) as f64
}

/// Pearson correlation of endpoint degrees; None when undefined
fn degree_assortativity(graph: &CommunityGraph) -> Option<f64> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for node in 0..graph.node_count {
        let degree = graph.degree(node) as f64;
        for &neighbor in graph.neighbors(node) {
            xs.push(degree);
            ys.push(graph.degree(neighbor as usize) as f64);
        }
    }

    if xs.is_empty() {
        return None;
    }

    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (&x, &y) in xs.iter().zip(&ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance_x += (x - mean_x).powi(2);
        variance_y += (y - mean_y).powi(2);
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None; // Degree-regular graph: correlation undefined
    }

    Some(covariance / (variance_x.sqrt() * variance_y.sqrt()))
}
