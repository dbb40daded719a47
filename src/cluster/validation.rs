//! Partition-purity validation and bipartite community splitting

use crate::cluster::Community;
use crate::graph::CommunityGraph;
use thiserror::Error;

/// A community mixed nodes from both partitions; the whole result is rejected
#[derive(Debug, Error)]
#[error("community {index} mixes nodes from both partitions")]
pub struct MixedCommunity {
    /// Index of the offending community after empty-community filtering
    pub index: usize,
}

/// The bipartite split found a community with members on both sides, which
/// the purity gate should have rejected already
#[derive(Debug, Error)]
#[error("bipartite community {index} would split into two non-empty halves")]
pub struct SplitInvariant {
    /// Index of the offending community
    pub index: usize,
}

/// Drop empty communities, then verify that every remaining community is
/// partition-pure.
///
/// For projections this re-checks a tautology; for bipartite-graph results it
/// is the primary correctness gate. A single mixed community rejects the whole
/// result.
pub fn validate_communities(
    graph: &CommunityGraph,
    communities: Vec<Community>,
) -> Result<Vec<Community>, MixedCommunity> {
    let kept: Vec<Community> = communities
        .into_iter()
        .filter(|community| !community.is_empty())
        .collect();

    for (index, community) in kept.iter().enumerate() {
        let first = graph.partition_of(community[0] as usize);
        if community
            .iter()
            .any(|&node| graph.partition_of(node as usize) != first)
        {
            return Err(MixedCommunity { index });
        }
    }

    Ok(kept)
}

/// Route each validated bipartite community to its partition's report.
///
/// Purity validation guarantees no community actually straddles the split;
/// a community that somehow does is an invariant violation surfaced as an
/// error, never silently divided.
pub fn split_bipartite_communities(
    graph: &CommunityGraph,
    communities: &[Community],
) -> Result<(Vec<Community>, Vec<Community>), SplitInvariant> {
    let mut set0 = Vec::new();
    let mut set1 = Vec::new();

    for (index, community) in communities.iter().enumerate() {
        let (half0, half1): (Community, Community) = community
            .iter()
            .partition(|&&node| graph.partition_of(node as usize) == 0);

        match (half0.is_empty(), half1.is_empty()) {
            (false, true) => set0.push(half0),
            (true, false) => set1.push(half1),
            (false, false) => return Err(SplitInvariant { index }),
            (true, true) => {} // Empty communities were filtered upstream
        }
    }

    Ok((set0, set1))
}
