//! Configuration management for the analyzer

/// Output naming configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Suffix appended to the input stem for the partition-0 report
    pub set0_suffix: String,

    /// Suffix appended to the input stem for the partition-1 report
    pub set1_suffix: String,

    /// Suffix appended to the input stem for the descriptive-stats report
    pub stats_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            set0_suffix: "_set0_results.json".to_string(),
            set1_suffix: "_set1_results.json".to_string(),
            stats_suffix: "_graph_metrics.json".to_string(),
        }
    }
}
