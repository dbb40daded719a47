//! Memory-efficient bipartite graph representation

use serde::{Deserialize, Serialize};

/// Compressed sparse representation of an undirected graph with a
/// two-partition node attribute.
///
/// The same structure backs both the original bipartite graph (every edge
/// crosses partitions, no weights) and its unipartite projections (all nodes
/// share one partition value, edges carry overlap weights).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: index where each node's adjacency begins
    /// offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Adjacency array: concatenated sorted neighbor lists, each undirected
    /// edge stored once per endpoint
    pub adjacency: Vec<u32>,

    /// Optional edge weights parallel to `adjacency` (projections only)
    pub weights: Option<Vec<f64>>,

    /// External integer id for each internal node index
    pub node_ids: Vec<i64>,

    /// Partition attribute (0 or 1) for each internal node index
    pub partitions: Vec<u8>,

    /// Derived index: internal node indices grouped by partition value
    members: [Vec<u32>; 2],
}

impl CommunityGraph {
    /// Assemble a graph from prebuilt CSR parts, deriving the per-partition
    /// member index.
    pub fn from_parts(
        node_ids: Vec<i64>,
        partitions: Vec<u8>,
        offsets: Vec<u32>,
        adjacency: Vec<u32>,
        weights: Option<Vec<f64>>,
    ) -> Self {
        let node_count = node_ids.len();
        let mut members = [Vec::new(), Vec::new()];
        for (idx, &p) in partitions.iter().enumerate() {
            members[p as usize].push(idx as u32);
        }

        Self {
            node_count,
            offsets,
            adjacency,
            weights,
            node_ids,
            partitions,
            members,
        }
    }

    /// Get the sorted neighbor list of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.adjacency[start..end]
    }

    /// Get the edge weights parallel to `neighbors(node)`, if this is a
    /// projected graph
    pub fn neighbor_weights(&self, node: usize) -> Option<&[f64]> {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        self.weights.as_ref().map(|w| &w[start..end])
    }

    /// Degree of a node
    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Check if there's an edge between src and dst
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.neighbors(src).binary_search(&dst).is_ok()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.len() / 2
    }

    /// Partition attribute of a node
    pub fn partition_of(&self, node: usize) -> u8 {
        self.partitions[node]
    }

    /// External id of a node
    pub fn node_id(&self, node: usize) -> i64 {
        self.node_ids[node]
    }

    /// Internal node indices belonging to the given partition
    pub fn partition_members(&self, partition: u8) -> &[u32] {
        &self.members[partition as usize]
    }

    /// Density of the graph as a simple undirected graph: 2m / (n(n-1))
    pub fn density(&self) -> f64 {
        let n = self.node_count;
        if n <= 1 {
            return 0.0;
        }
        (2 * self.edge_count()) as f64 / (n * (n - 1)) as f64
    }

    /// Bipartite density of one partition side: m / (|set0| * |set1|)
    pub fn bipartite_density(&self) -> f64 {
        let n0 = self.members[0].len();
        let n1 = self.members[1].len();
        if n0 == 0 || n1 == 0 {
            return 0.0;
        }
        self.edge_count() as f64 / (n0 * n1) as f64
    }

    /// Whether this graph is a unipartite projection (carries edge weights)
    pub fn is_projection(&self) -> bool {
        self.weights.is_some()
    }

    /// Re-check the bipartite invariant: every edge joins nodes of
    /// differing partition attribute
    pub fn all_edges_cross_partitions(&self) -> bool {
        for node in 0..self.node_count {
            let p = self.partitions[node];
            for &neighbor in self.neighbors(node) {
                if self.partitions[neighbor as usize] == p {
                    return false;
                }
            }
        }
        true
    }
}
