//! Calltree Studio CLI
//!
//! Decodes profiling agent call streams into filtered call lists and
//! merged hotspot call trees.

use anyhow::Result;
use calltree_studio::commands::{
    execute_calls, execute_tree, parse_time_bound, validate_window, CallsArgs, TreeArgs,
};
use calltree_studio::utils::config::{MAX_CALL_FORMAT, MIN_CALL_FORMAT, SCHEMA_VERSION};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Calltree Studio - call-stream decoding and hotspot aggregation
#[derive(Parser, Debug)]
#[command(name = "calltree")]
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
    /// Decode a calls stream into a filtered call list
    Calls {
        /// Path to the binary calls stream
        #[arg(short, long)]
        input: PathBuf,

        /// Dictionary dump (one name per line, line number = id)
        #[arg(short, long)]
        dict: Option<PathBuf>,

        /// Lower time bound (epoch millis or RFC3339)
        #[arg(long)]
        from: Option<String>,

        /// Upper time bound (epoch millis or RFC3339)
        #[arg(long)]
        to: Option<String>,

        /// Minimum call duration in millis
        #[arg(long, default_value = "0")]
        min_duration: u32,

        /// Maximum call duration in millis
        #[arg(long)]
        max_duration: Option<u32>,

        /// Filter query (`+mandatory -excluded keyword $param=value`)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Output path for the JSON call list
        #[arg(short, long, default_value = "calls.json")]
        output: PathBuf,

        /// Print a scan summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Aggregate one or more calls streams into a hotspot tree
    Tree {
        /// Paths to binary calls streams (one per fragment)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Dictionary dump (one name per line, line number = id)
        #[arg(short, long)]
        dict: Option<PathBuf>,

        /// Lower time bound (epoch millis or RFC3339)
        #[arg(long)]
        from: Option<String>,

        /// Upper time bound (epoch millis or RFC3339)
        #[arg(long)]
        to: Option<String>,

        /// Minimum call duration in millis
        #[arg(long, default_value = "0")]
        min_duration: u32,

        /// Maximum call duration in millis
        #[arg(long)]
        max_duration: Option<u32>,

        /// Filter query (`+mandatory -excluded keyword $param=value`)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Output path for the JSON tree
        #[arg(short, long, default_value = "tree.json")]
        output: PathBuf,

        /// Output path for an SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Calls {
            input,
            dict,
            from,
            to,
            min_duration,
            max_duration,
            query,
            output,
            summary,
        } => {
            let from = from.as_deref().map(parse_time_bound).transpose()?;
            let to = to.as_deref().map(parse_time_bound).transpose()?;
            validate_window(from, to)?;
            execute_calls(CallsArgs {
                input,
                dictionary: dict,
                from,
                to,
                min_duration,
                max_duration,
                query,
                output,
                print_summary: summary,
            })?;
        }

        Commands::Tree {
            input,
            dict,
            from,
            to,
            min_duration,
            max_duration,
            query,
            output,
            flamegraph,
            title,
            width,
        } => {
            let from = from.as_deref().map(parse_time_bound).transpose()?;
            let to = to.as_deref().map(parse_time_bound).transpose()?;
            validate_window(from, to)?;
            execute_tree(TreeArgs {
                inputs: input,
                dictionary: dict,
                from,
                to,
                min_duration,
                max_duration,
                query,
                output,
                flamegraph,
                title,
                width,
            })?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display schema information
fn display_schema(show_details: bool) {
    println!("Calltree Studio Output Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!(
        "Supported calls stream formats: {}-{}",
        MIN_CALL_FORMAT, MAX_CALL_FORMAT
    );
    println!();

    if show_details {
        println!("Call list document:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  parsed: number           - Records materialized while scanning");
        println!("  matched: number          - Records passing all filters");
        println!("  calls: array             - Call rows");
        println!("    time: number           - Call start, epoch millis");
        println!("    method: string         - Resolved method name");
        println!("    duration: number       - Call duration in millis");
        println!("    params: object         - Parameter name -> values");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!();
        println!("Tree document:");
        println!("  version: string          - Schema version");
        println!("  start_time/end_time      - Observed time bounds");
        println!("  root: object             - Recursive hotspot nodes");
        println!("    name, total_time, self_time, count, child_count");
        println!("    suspension_time, tags[], children[]");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
fn display_version() {
    println!("Calltree Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Output Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-stream decoding and hotspot call-tree aggregation.");
}
