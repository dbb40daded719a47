use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

mod cluster;
mod config;
mod data;
mod graph;
mod pipeline;
mod stats;
mod storage;

use cluster::metrics::MetricsEngine;
use cluster::registry::AlgorithmRegistry;

#[derive(Parser, Debug)]
#[clap(
    name = "bipartite-community-analyzer",
    about = "Community detection over bipartite graphs and their weighted projections"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Output directory for results
    #[clap(long, default_value = "analysis_results")]
    output_dir: String,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the detection pipeline and write the per-partition reports
    Cluster {
        /// Path to the graph input file
        input: String,
    },

    /// Write the descriptive graph-statistics report
    Info {
        /// Path to the graph input file
        input: String,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads for the stats reporter's BFS passes
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    // Create output directory
    std::fs::create_dir_all(&args.output_dir)?;
    let output_dir = Path::new(&args.output_dir);
    let config = config::Config::default();

    match &args.command {
        Command::Cluster { input } => {
            let input = Path::new(input);
            log::info!("Starting community detection for {}", input.display());

            let registry = AlgorithmRegistry::with_default_bindings();
            let engine = MetricsEngine::with_default_metrics();

            let (report0, report1) = pipeline::run_pipeline(input, &registry, &engine)?;

            let (path0, path1) = storage::report_paths(input, output_dir, &config);
            storage::write_report(&report0, &path0)?;
            storage::write_report(&report1, &path1)?;
        }
        Command::Info { input } => {
            let input = Path::new(input);
            log::info!("Computing graph statistics for {}", input.display());

            let (graph, _) = data::load_graph(input)?;
            let report = stats::compute_graph_stats(&graph);
            stats::write_graph_stats(&report, &storage::stats_path(input, output_dir, &config))?;
        }
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
