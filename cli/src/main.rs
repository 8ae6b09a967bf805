//! fmea-graph CLI - score a transaction CSV and print the FMEA summary.

use anyhow::Context;
use clap::Parser;
use fmea_graph_core_rs::{
    export::write_dot, top_risks, FmeaConfig, GraphSnapshot, Pipeline, PipelineRun, RowErrorPolicy,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// FMEA risk scoring over a transaction graph
#[derive(Parser, Debug)]
#[command(name = "fmea-graph", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./fmea.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RPN at or above which a transaction is High Risk
    #[arg(long, global = true)]
    threshold: Option<u32>,

    /// Read at most this many data rows
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Bad row handling: skip or abort
    #[arg(long, global = true)]
    on_row_error: Option<RowErrorPolicy>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Score a CSV and print the summary report
    Run {
        /// Transaction CSV
        input: PathBuf,

        /// Also list the N highest-RPN transactions
        #[arg(long)]
        top: Option<usize>,
    },
    /// Score a CSV and write the graph as JSON and/or DOT
    Export {
        /// Transaction CSV
        input: PathBuf,

        /// JSON snapshot output path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Graphviz DOT output path
        #[arg(long)]
        dot: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over the flags
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<FmeaConfig> {
    let mut config = FmeaConfig::load(cli.config.as_deref()).context("Configuration error")?;

    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(limit) = cli.limit {
        config.ingest.row_limit = Some(limit);
    }
    if let Some(policy) = cli.on_row_error {
        config.ingest.on_row_error = policy;
    }

    config.validate().context("Configuration error")?;
    Ok(config)
}

fn run_pipeline(config: FmeaConfig, input: &Path) -> anyhow::Result<PipelineRun> {
    Pipeline::new(config)
        .run_csv(input)
        .with_context(|| format!("Failed to score {}", input.display()))
}

fn print_top(run: &PipelineRun, k: usize) {
    println!();
    println!("Top {} transactions by RPN:", k);
    for node in top_risks(&run.graph, k) {
        if let Some(risk) = node.risk() {
            println!(
                "  {:>8}  amount={:<12.2} RPN={:<4} S={} O={} D={}  {}",
                node.id(),
                node.amount(),
                risk.rpn,
                risk.severity,
                risk.occurrence,
                risk.detection,
                risk.failure_mode
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    match &cli.command {
        Commands::Run { input, top } => {
            let run = run_pipeline(config, input)?;
            println!("{}", run.report);
            if !run.rejections.is_empty() {
                println!("Rejected Rows: {}", run.rejections.len());
            }
            if let Some(k) = top {
                print_top(&run, *k);
            }
        }
        Commands::Export { input, json, dot } => {
            if json.is_none() && dot.is_none() {
                anyhow::bail!("Nothing to export: pass --json and/or --dot");
            }

            let run = run_pipeline(config, input)?;

            if let Some(path) = json {
                let snapshot = GraphSnapshot::capture(&run.graph);
                snapshot
                    .write_json(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), fingerprint = %snapshot.fingerprint()?, "JSON snapshot written");
            }
            if let Some(path) = dot {
                write_dot(&run.graph, path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "DOT graph written");
            }

            println!("{}", run.report);
        }
    }

    Ok(())
}
