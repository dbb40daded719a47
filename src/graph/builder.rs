//! Graph construction module

use crate::graph::CommunityGraph;
use std::collections::HashMap;
use thiserror::Error;

/// Structural violations caught while assembling a bipartite graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} is declared in both partitions")]
    ConflictingPartition(i64),

    #[error("edge references undeclared node {0}")]
    UnknownNode(i64),

    #[error("edge {0} -- {1} does not cross partitions")]
    SamePartitionEdge(i64, i64),
}

/// Builder for incrementally constructing a bipartite CommunityGraph
pub struct GraphBuilder {
    /// Number of nodes
    node_count: usize,

    /// Mapping from external ids to node indices
    id_to_index: HashMap<i64, u32>,

    /// External node ids
    node_ids: Vec<i64>,

    /// Partition attribute per node
    partitions: Vec<u8>,

    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            node_count: 0,
            id_to_index: HashMap::new(),
            node_ids: Vec::new(),
            partitions: Vec::new(),
            adjacency_lists: Vec::new(),
        }
    }

    /// Declare a node with its partition attribute.
    ///
    /// Re-declaring an id within the same partition is a no-op; declaring it
    /// in the other partition violates the node-set check.
    pub fn declare_node(&mut self, id: i64, partition: u8) -> Result<u32, GraphError> {
        if let Some(&idx) = self.id_to_index.get(&id) {
            if self.partitions[idx as usize] != partition {
                return Err(GraphError::ConflictingPartition(id));
            }
            return Ok(idx);
        }

        let idx = self.node_count as u32;
        self.id_to_index.insert(id, idx);
        self.node_ids.push(id);
        self.partitions.push(partition);
        self.adjacency_lists.push(Vec::new());
        self.node_count += 1;

        Ok(idx)
    }

    /// Add an undirected edge between two declared nodes.
    ///
    /// Both endpoints must already be declared and must sit in different
    /// partitions; duplicate edges collapse silently.
    pub fn add_edge(&mut self, a: i64, b: i64) -> Result<(), GraphError> {
        let a_idx = *self.id_to_index.get(&a).ok_or(GraphError::UnknownNode(a))?;
        let b_idx = *self.id_to_index.get(&b).ok_or(GraphError::UnknownNode(b))?;

        // Self-loops fall out of the same check: a node shares its own partition
        if self.partitions[a_idx as usize] == self.partitions[b_idx as usize] {
            return Err(GraphError::SamePartitionEdge(a, b));
        }

        if self.adjacency_lists[a_idx as usize].contains(&b_idx) {
            return Ok(()); // Multi-edges collapse
        }

        self.adjacency_lists[a_idx as usize].push(b_idx);
        self.adjacency_lists[b_idx as usize].push(a_idx);

        Ok(())
    }

    /// Build the compressed graph
    pub fn build(mut self) -> CommunityGraph {
        // Count total adjacency entries
        let entry_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();

        // Create offsets array
        let mut offsets = Vec::with_capacity(self.node_count + 1);
        offsets.push(0);

        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            offsets.push(offset);
        }

        // Create adjacency array, sorted for binary search
        let mut adjacency = Vec::with_capacity(entry_count);
        for list in &mut self.adjacency_lists {
            list.sort_unstable();
            adjacency.extend_from_slice(list);
        }

        CommunityGraph::from_parts(self.node_ids, self.partitions, offsets, adjacency, None)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
