//! Text-format loading for bipartite graph inputs
//!
//! Input layout: line 1 = whitespace-separated algorithm names, line 2 =
//! integer ids of partition 0, line 3 = integer ids of partition 1, every
//! remaining line one "a b" edge.

use crate::graph::builder::{GraphBuilder, GraphError};
use crate::graph::CommunityGraph;
use itertools::Itertools;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced while reading a graph input file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read graph input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed graph input: {0}")]
    Format(String),

    #[error("graph is not bipartite: {0}")]
    Bipartiteness(String),
}

impl From<GraphError> for LoadError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownNode(_) => LoadError::Format(err.to_string()),
            GraphError::ConflictingPartition(_) | GraphError::SamePartitionEdge(_, _) => {
                LoadError::Bipartiteness(err.to_string())
            }
        }
    }
}

/// Parse a graph input file into a bipartite graph and the ordered list of
/// requested algorithm names.
pub fn load_graph(path: &Path) -> Result<(CommunityGraph, Vec<String>), LoadError> {
    log::info!("Reading graph input: {}", path.display());

    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();

    let methods: Vec<String> = lines
        .next()
        .ok_or_else(|| LoadError::Format("missing algorithm-name line".into()))?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let set0 = parse_id_line(lines.next(), 0)?;
    let set1 = parse_id_line(lines.next(), 1)?;

    let mut builder = GraphBuilder::new();
    for id in set0 {
        builder.declare_node(id, 0)?;
    }
    for id in set1 {
        builder.declare_node(id, 1)?;
    }

    // Edge lines start at line 4 of the file
    for (offset, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (a, b) = parse_edge_line(line, offset + 4)?;
        builder.add_edge(a, b)?;
    }

    let graph = builder.build();

    // Re-validate the constructed graph, mirroring the declared partitions
    if !graph.all_edges_cross_partitions() {
        return Err(LoadError::Bipartiteness(
            "an edge joins nodes of the same partition".into(),
        ));
    }

    log::info!(
        "Loaded bipartite graph with {} + {} nodes, {} edges; requested algorithms: {}",
        graph.partition_members(0).len(),
        graph.partition_members(1).len(),
        graph.edge_count(),
        methods.iter().join(" ")
    );

    Ok((graph, methods))
}

fn parse_id_line(line: Option<&str>, partition: u8) -> Result<Vec<i64>, LoadError> {
    let line = line.ok_or_else(|| {
        LoadError::Format(format!("missing id line for partition {partition}"))
    })?;

    line.split_whitespace()
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                LoadError::Format(format!(
                    "invalid node id '{token}' in partition {partition} line"
                ))
            })
        })
        .collect()
}

fn parse_edge_line(line: &str, line_number: usize) -> Result<(i64, i64), LoadError> {
    let ids: Vec<i64> = line
        .split_whitespace()
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                LoadError::Format(format!("invalid node id '{token}' on line {line_number}"))
            })
        })
        .collect::<Result<_, _>>()?;

    match ids.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(LoadError::Format(format!(
            "expected two node ids on line {line_number}, found {}",
            ids.len()
        ))),
    }
}
