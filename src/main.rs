//! Callgraph Trace CLI
//!
//! Replays recorded operation start/end events through the call graph
//! recorder and exports the aggregated metrics.

use anyhow::Result;
use callgraph_metrics::commands::{execute_replay, list_metrics, ReplayArgs};
use callgraph_metrics::utils::config::{DEFAULT_NUMBER_FORMAT, EVENT_LOG_VERSION};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Callgraph Trace - call-graph metrics for nested operation traces
#[derive(Parser, Debug)]
#[command(name = "callgraph-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an event log and export aggregated metrics
    Replay {
        /// Event log JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the CSV report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number format for values: G, F<n> or E<n>
        #[arg(long, default_value = DEFAULT_NUMBER_FORMAT)]
        format: String,

        /// Deepest allowed call nesting
        #[arg(long, env = "CALLGRAPH_MAX_DEPTH")]
        max_depth: Option<usize>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// List the metrics carried by an event log
    Metrics {
        /// Event log JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Replay {
            input,
            output,
            format,
            max_depth,
            summary,
        } => {
            let args = ReplayArgs {
                input,
                output_csv: output,
                number_format: format,
                max_depth,
                print_summary: summary,
            };
            execute_replay(args)?;
        }

        Commands::Metrics { input } => {
            for metric in list_metrics(&input)? {
                println!("{}", metric);
            }
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Callgraph Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Event Log Schema: v{}", EVENT_LOG_VERSION);
}
