//! End-to-end pipeline tests against the default registry

use bipartite_community_analyzer::cluster::metrics::MetricsEngine;
use bipartite_community_analyzer::cluster::registry::AlgorithmRegistry;
use bipartite_community_analyzer::config::Config;
use bipartite_community_analyzer::data;
use bipartite_community_analyzer::graph::projection;
use bipartite_community_analyzer::pipeline::run_pipeline;
use bipartite_community_analyzer::storage;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const INPUT: &str = "\
bipartite_Connected_Components bipartite_Label_Propagation \
unipartite_Louvain unipartite_Label_Propagation unipartite_Connected_Components
1 2 5 6
3 4 7 8
1 3
1 4
2 3
2 4
5 7
5 8
6 7
6 8
";

fn write_input(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("INPUT.txt");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn full_run_produces_consistent_reports_per_partition() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), INPUT);

    let registry = AlgorithmRegistry::with_default_bindings();
    let engine = MetricsEngine::with_default_metrics();
    let (set0, set1) = run_pipeline(&input, &registry, &engine).unwrap();

    // Every requested algorithm produced an entry in both reports
    assert_eq!(set0.len(), 5);
    assert_eq!(set1.len(), 5);

    // The two disconnected blocks are recovered on both sides by every
    // default binding
    for name in [
        "bipartite_Connected_Components",
        "bipartite_Label_Propagation",
        "unipartite_Louvain",
        "unipartite_Label_Propagation",
        "unipartite_Connected_Components",
    ] {
        let entry0 = set0.get(name).unwrap();
        assert_eq!(entry0.communities, vec![vec![1, 2], vec![5, 6]], "{name}");
        let entry1 = set1.get(name).unwrap();
        assert_eq!(entry1.communities, vec![vec![3, 4], vec![7, 8]], "{name}");
        assert_eq!(entry0.metrics.community_count, entry1.metrics.community_count);
    }

    // Bipartite entries carry the metrics of the unsplit clustering
    let bipartite = set0.get("bipartite_Connected_Components").unwrap();
    assert_eq!(bipartite.metrics.community_count, 4);
    let unipartite = set0.get("unipartite_Louvain").unwrap();
    assert_eq!(unipartite.metrics.community_count, 2);
}

#[test]
fn written_reports_are_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), INPUT);
    let config = Config::default();

    let registry = AlgorithmRegistry::with_default_bindings();
    let engine = MetricsEngine::with_default_metrics();

    let (path0, path1) = storage::report_paths(&input, dir.path(), &config);
    assert_eq!(path0.file_name().unwrap(), "INPUT_set0_results.json");

    let (first0, first1) = run_pipeline(&input, &registry, &engine).unwrap();
    storage::write_report(&first0, &path0).unwrap();
    storage::write_report(&first1, &path1).unwrap();
    let bytes0 = fs::read(&path0).unwrap();
    let bytes1 = fs::read(&path1).unwrap();

    let (second0, second1) = run_pipeline(&input, &registry, &engine).unwrap();
    storage::write_report(&second0, &path0).unwrap();
    storage::write_report(&second1, &path1).unwrap();

    assert_eq!(bytes0, fs::read(&path0).unwrap());
    assert_eq!(bytes1, fs::read(&path1).unwrap());

    // The document parses back with the expected shape
    let value: serde_json::Value = serde_json::from_slice(&bytes0).unwrap();
    let entry = &value["unipartite_Louvain"];
    assert!(entry["communities"].is_array());
    assert_eq!(entry["metrics"]["community_count"], serde_json::json!(2));
    assert!(entry["metrics"]["conductance"].is_number());
}

#[test]
fn worked_projection_example_round_trips_through_the_loader() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "unipartite_Louvain\n1 2\n3 4\n1 3\n1 4\n2 3\n");

    let (graph, methods) = data::load_graph(&input).unwrap();
    assert_eq!(methods, vec!["unipartite_Louvain"]);
    assert!(graph.all_edges_cross_partitions());

    // Projection weights from the worked example: both sides get one edge
    // of weight 1.0
    let p0 = projection::project(&graph, 0);
    assert_eq!(p0.edge_count(), 1);
    assert_eq!(p0.neighbor_weights(0).unwrap(), &[1.0]);

    let p1 = projection::project(&graph, 1);
    assert_eq!(p1.edge_count(), 1);
    assert_eq!(p1.neighbor_weights(0).unwrap(), &[1.0]);
}

#[test]
fn unreadable_input_fails_the_run_without_panicking() {
    let registry = AlgorithmRegistry::with_default_bindings();
    let engine = MetricsEngine::with_default_metrics();

    let result = run_pipeline(Path::new("/no/such/file"), &registry, &engine);
    assert!(result.is_err());
}

#[test]
fn stats_report_writes_for_the_same_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), INPUT);
    let config = Config::default();

    let (graph, _) = data::load_graph(&input).unwrap();
    let report = bipartite_community_analyzer::stats::compute_graph_stats(&graph);
    let path = storage::stats_path(&input, dir.path(), &config);
    bipartite_community_analyzer::stats::write_graph_stats(&report, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(value["graph_level"]["num_nodes"], serde_json::json!(8));
    assert_eq!(value["graph_level"]["num_edges"], serde_json::json!(8));
    assert!(value["set0"]["1"]["pagerank"].is_number());
    assert_eq!(value["set1"]["3"]["degree"], serde_json::json!(2));
}
