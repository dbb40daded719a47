//! Built-in community-detection bindings
//!
//! Every function here satisfies the registry contract: it takes an owned
//! graph copy plus a parameter set and returns a list of communities or an
//! error. The orchestrator treats them as opaque.

use crate::cluster::registry::AlgorithmParams;
use crate::cluster::Community;
use crate::graph::CommunityGraph;
use anyhow::Result;
use std::collections::BTreeMap;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Rank/size of each set (for union by rank)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure with each node its own set
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Union by rank: attach smaller tree under root of larger tree
        let rank_x = self.rank[root_x as usize];
        let rank_y = self.rank[root_y as usize];

        if rank_x > rank_y {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }
}

/// Weight of the adjacency entry at `pos` in `node`'s neighbor list;
/// unweighted graphs count 1.0 per edge
fn entry_weight(graph: &CommunityGraph, node: usize, pos: usize) -> f64 {
    graph.neighbor_weights(node).map_or(1.0, |w| w[pos])
}

/// Group nodes by an arbitrary label, in ascending label order
fn group_by_label<L: Ord + Copy>(labels: impl Iterator<Item = (u32, L)>) -> Vec<Community> {
    let mut groups: BTreeMap<L, Community> = BTreeMap::new();
    for (node, label) in labels {
        groups.entry(label).or_default().push(node);
    }
    groups.into_values().collect()
}

fn connected_component_labels(graph: &CommunityGraph) -> Vec<u32> {
    let mut sets = DisjointSets::new(graph.node_count);
    for node in 0..graph.node_count {
        for &neighbor in graph.neighbors(node) {
            sets.union(node as u32, neighbor);
        }
    }
    (0..graph.node_count as u32).map(|n| sets.find(n)).collect()
}

/// Connected components of a projected graph, one community per component
pub fn unipartite_connected_components(
    graph: CommunityGraph,
    _params: &AlgorithmParams,
) -> Result<Vec<Community>> {
    let labels = connected_component_labels(&graph);
    Ok(group_by_label(
        labels.into_iter().enumerate().map(|(n, l)| (n as u32, l)),
    ))
}

/// Connected components of the bipartite graph, each split per side so the
/// returned communities are partition-pure
pub fn bipartite_connected_components(
    graph: CommunityGraph,
    _params: &AlgorithmParams,
) -> Result<Vec<Community>> {
    let labels = connected_component_labels(&graph);
    Ok(group_by_label(labels.into_iter().enumerate().map(|(n, l)| {
        // Key by (component, side): a component never mixes sides in output
        (n as u32, (l, graph.partition_of(n)))
    })))
}

/// Weight-aware label propagation with deterministic tie-breaking
pub fn unipartite_label_propagation(
    graph: CommunityGraph,
    params: &AlgorithmParams,
) -> Result<Vec<Community>> {
    let labels = propagate_labels(&graph, params.max_iter);
    Ok(group_by_label(
        labels.into_iter().enumerate().map(|(n, l)| (n as u32, l)),
    ))
}

/// Two-mode label propagation; communities are (label, side) groups and
/// therefore partition-pure by construction
pub fn bipartite_label_propagation(
    graph: CommunityGraph,
    params: &AlgorithmParams,
) -> Result<Vec<Community>> {
    let labels = propagate_labels(&graph, params.max_iter);
    Ok(group_by_label(labels.into_iter().enumerate().map(|(n, l)| {
        (n as u32, (l, graph.partition_of(n)))
    })))
}

fn propagate_labels(graph: &CommunityGraph, max_iter: usize) -> Vec<u32> {
    let n = graph.node_count;
    let mut labels: Vec<u32> = (0..n as u32).collect();

    for _ in 0..max_iter {
        let mut changed = false;

        for node in 0..n {
            // Tally neighbor labels by edge weight; BTreeMap iteration makes
            // ties resolve to the smallest label
            let mut tallies: BTreeMap<u32, f64> = BTreeMap::new();
            for (pos, &neighbor) in graph.neighbors(node).iter().enumerate() {
                *tallies.entry(labels[neighbor as usize]).or_insert(0.0) +=
                    entry_weight(graph, node, pos);
            }

            let Some(best) = heaviest_label(&tallies) else {
                continue; // Isolated node keeps its own label
            };

            if labels[node] != best {
                labels[node] = best;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    labels
}

fn heaviest_label(tallies: &BTreeMap<u32, f64>) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for (&label, &weight) in tallies {
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((label, weight)),
        }
    }
    best.map(|(label, _)| label)
}

/// Weighted Louvain local-moving modularity optimization
pub fn unipartite_louvain(
    graph: CommunityGraph,
    params: &AlgorithmParams,
) -> Result<Vec<Community>> {
    let n = graph.node_count;
    if n == 0 {
        return Ok(Vec::new());
    }

    // Weighted degrees and total weight (2m)
    let mut weighted_degree = vec![0.0f64; n];
    for node in 0..n {
        for pos in 0..graph.degree(node) {
            weighted_degree[node] += entry_weight(&graph, node, pos);
        }
    }
    let two_m: f64 = weighted_degree.iter().sum();

    if two_m == 0.0 {
        // Edgeless graph: every node is its own community
        return Ok((0..n as u32).map(|node| vec![node]).collect());
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut sum_tot = weighted_degree.clone();

    for _ in 0..params.max_iter {
        let mut moved = false;

        for node in 0..n {
            // Weight from this node into each neighboring community
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for (pos, &neighbor) in graph.neighbors(node).iter().enumerate() {
                if neighbor as usize == node {
                    continue;
                }
                *links.entry(community[neighbor as usize]).or_insert(0.0) +=
                    entry_weight(&graph, node, pos);
            }

            let current = community[node];
            sum_tot[current] -= weighted_degree[node];

            let gain = |target: usize, link_weight: f64| {
                link_weight - params.resolution * weighted_degree[node] * sum_tot[target] / two_m
            };

            let mut best_community = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));

            for (&candidate, &link_weight) in &links {
                if candidate == current {
                    continue;
                }
                let candidate_gain = gain(candidate, link_weight);
                if candidate_gain > best_gain + 1e-12 {
                    best_gain = candidate_gain;
                    best_community = candidate;
                }
            }

            sum_tot[best_community] += weighted_degree[node];
            if best_community != current {
                community[node] = best_community;
                moved = true;
            }
        }

        if !moved {
            break;
        }
    }

    Ok(group_by_label(
        community
            .into_iter()
            .enumerate()
            .map(|(node, c)| (node as u32, c)),
    ))
}
