//! Overlap-weighted unipartite projection

use crate::graph::CommunityGraph;
use std::collections::BTreeMap;

/// Project one partition of a bipartite graph onto a weighted unipartite
/// graph.
///
/// Two nodes of the target partition are connected when they share at least
/// one neighbor in the opposite partition; the edge weight is the overlap
/// coefficient of their neighbor sets, |N(u) ∩ N(v)| / min(|N(u)|, |N(v)|).
pub fn project(graph: &CommunityGraph, partition: u8) -> CommunityGraph {
    let members = graph.partition_members(partition);

    log::info!(
        "Projecting partition {} ({} nodes) from bipartite graph",
        partition,
        members.len()
    );

    // Old index -> projected index. Members are in ascending index order, so
    // the mapping is monotonic and sorted adjacency carries over.
    let mut old_to_new = BTreeMap::new();
    for (new_idx, &old_idx) in members.iter().enumerate() {
        old_to_new.insert(old_idx, new_idx as u32);
    }

    let mut offsets = Vec::with_capacity(members.len() + 1);
    offsets.push(0u32);
    let mut adjacency = Vec::new();
    let mut weights = Vec::new();

    for &u in members {
        // Shared-neighbor counts keyed by old index; BTreeMap keeps the
        // adjacency sorted and the weight order reproducible.
        let mut overlap: BTreeMap<u32, u32> = BTreeMap::new();

        for &mid in graph.neighbors(u as usize) {
            for &v in graph.neighbors(mid as usize) {
                if v != u {
                    *overlap.entry(v).or_insert(0) += 1;
                }
            }
        }

        let deg_u = graph.degree(u as usize);
        for (&v, &shared) in &overlap {
            let deg_v = graph.degree(v as usize);
            let weight = shared as f64 / deg_u.min(deg_v) as f64;
            adjacency.push(old_to_new[&v]);
            weights.push(weight);
        }

        offsets.push(adjacency.len() as u32);
    }

    let node_ids: Vec<i64> = members.iter().map(|&m| graph.node_id(m as usize)).collect();
    let partitions = vec![partition; members.len()];

    let projected =
        CommunityGraph::from_parts(node_ids, partitions, offsets, adjacency, Some(weights));

    log::info!(
        "Projection of partition {} has {} edges",
        partition,
        projected.edge_count()
    );

    projected
}
