//! Results persistence module
//!
//! Serializes the consolidated per-partition reports to a canonical JSON
//! layout: top-level keys are algorithm names, each entry carrying the
//! community arrays and the metric vector.

use crate::cluster::metrics::MetricsRecord;
use crate::config::Config;
use anyhow::Result;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One algorithm's consolidated entry in a partition report
#[derive(Debug, Clone)]
pub struct ReportEntry {
    /// Communities as sorted external node ids
    pub communities: Vec<Vec<i64>>,

    /// Quality metrics of the clustering
    pub metrics: MetricsRecord,
}

/// Consolidated report for one partition set, keyed by algorithm name
#[derive(Debug, Default)]
pub struct Report {
    entries: BTreeMap<String, ReportEntry>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one algorithm's communities and metrics.
    ///
    /// Community members are sorted ascending and the community list is put
    /// in a canonical order, so identical input serializes byte-identically.
    pub fn insert(
        &mut self,
        algorithm: &str,
        mut communities: Vec<Vec<i64>>,
        metrics: MetricsRecord,
    ) {
        for community in &mut communities {
            community.sort_unstable();
        }
        communities.sort();

        self.entries.insert(
            algorithm.to_string(),
            ReportEntry {
                communities,
                metrics,
            },
        );
    }

    /// Look up one algorithm's entry
    pub fn get(&self, algorithm: &str) -> Option<&ReportEntry> {
        self.entries.get(algorithm)
    }

    /// Number of algorithm entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report carries no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the report as a JSON document.
    ///
    /// Non-finite metric values are omitted field-wise with a logged warning;
    /// they never reach the output.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();

        for (algorithm, entry) in &self.entries {
            let mut metrics = Map::new();
            for (name, &value) in &entry.metrics.values {
                if value.is_finite() {
                    metrics.insert(name.clone(), json!(value));
                } else {
                    log::warn!("Omitting non-finite metric '{name}' for {algorithm}");
                }
            }
            metrics.insert(
                "community_count".to_string(),
                json!(entry.metrics.community_count),
            );

            root.insert(
                algorithm.clone(),
                json!({
                    "communities": entry.communities,
                    "metrics": Value::Object(metrics),
                }),
            );
        }

        Value::Object(root)
    }
}

/// Derive the two report paths from the input filename
pub fn report_paths(input: &Path, output_dir: &Path, config: &Config) -> (PathBuf, PathBuf) {
    let stem = input_stem(input);
    (
        output_dir.join(format!("{stem}{}", config.set0_suffix)),
        output_dir.join(format!("{stem}{}", config.set1_suffix)),
    )
}

/// Derive the descriptive-statistics report path from the input filename
pub fn stats_path(input: &Path, output_dir: &Path, config: &Config) -> PathBuf {
    output_dir.join(format!("{}{}", input_stem(input), config.stats_suffix))
}

fn input_stem(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("INPUT")
}

/// Write one report as pretty-printed JSON, opened and closed in one scope
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    log::info!(
        "Saving {} algorithm entries to {}",
        report.len(),
        path.display()
    );

    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(&report.to_json())?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(values: &[(&str, f64)], community_count: usize) -> MetricsRecord {
        MetricsRecord {
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<BTreeMap<_, _>>(),
            community_count,
        }
    }

    #[test]
    fn serialization_is_idempotent() {
        let mut report = Report::new();
        report.insert(
            "unipartite_Louvain",
            vec![vec![4, 2], vec![9]],
            record(&[("conductance", 0.25)], 2),
        );

        let first = serde_json::to_string_pretty(&report.to_json()).unwrap();
        let second = serde_json::to_string_pretty(&report.to_json()).unwrap();
        assert_eq!(first, second);

        // Members were canonicalized ascending
        let value = report.to_json();
        assert_eq!(
            value["unipartite_Louvain"]["communities"],
            serde_json::json!([[2, 4], [9]])
        );
    }

    #[test]
    fn non_finite_metrics_are_omitted_not_fatal() {
        let mut report = Report::new();
        report.insert(
            "bipartite_X",
            vec![vec![1]],
            record(
                &[
                    ("conductance", f64::NAN),
                    ("hub_dominance", f64::INFINITY),
                    ("internal_edge_density", 0.5),
                ],
                1,
            ),
        );

        let value = report.to_json();
        let metrics = value["bipartite_X"]["metrics"].as_object().unwrap();
        assert!(!metrics.contains_key("conductance"));
        assert!(!metrics.contains_key("hub_dominance"));
        assert_eq!(metrics["internal_edge_density"], serde_json::json!(0.5));
        assert_eq!(metrics["community_count"], serde_json::json!(1));
    }

    #[test]
    fn paths_derive_from_input_stem() {
        let config = Config::default();
        let (p0, p1) = report_paths(
            Path::new("/data/INPUT.txt"),
            Path::new("results"),
            &config,
        );
        assert_eq!(p0, Path::new("results/INPUT_set0_results.json"));
        assert_eq!(p1, Path::new("results/INPUT_set1_results.json"));
        assert_eq!(
            stats_path(Path::new("/data/INPUT.txt"), Path::new("results"), &config),
            Path::new("results/INPUT_graph_metrics.json")
        );
    }
}
