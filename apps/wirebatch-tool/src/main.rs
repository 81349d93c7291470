//! CLI tool for building and inspecting write batch files.
//!
//! Provides commands for:
//! - Building a batch file from a line-oriented script
//! - Dumping a batch file as human-readable records

mod dump;
mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use wirebatch_core::BatchConfig;

/// Command-line arguments for the batch tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with batch configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a script of operations into a batch file
    Build {
        /// Script file, one operation per line
        script: PathBuf,

        /// Output batch file
        #[arg(short, long)]
        output: PathBuf,

        /// Sequence number written to the header
        #[arg(long, default_value_t = 0)]
        sequence: u64,
    },
    /// Decode a batch file and print its records
    Dump {
        /// Batch file
        input: PathBuf,

        /// Width of the timestamp suffix on keys
        #[arg(long)]
        timestamp_size: Option<usize>,

        /// Number of known column families
        #[arg(long)]
        column_families: Option<u32>,

        /// Skip the header count check
        #[arg(long)]
        no_verify: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<BatchConfig> {
    let Some(path) = path else {
        return Ok(BatchConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Build {
            script,
            output,
            sequence,
        } => {
            let source = fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let mut batch = script::build(&source, config)?;
            batch.set_sequence(sequence);
            fs::write(&output, batch.data())
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(
                records = batch.count(),
                bytes = batch.size_in_bytes(),
                output = %output.display(),
                "batch written"
            );
        }
        Command::Dump {
            input,
            timestamp_size,
            column_families,
            no_verify,
        } => {
            if let Some(size) = timestamp_size {
                config.timestamp_size = size;
            }
            if column_families.is_some() {
                config.column_families = column_families;
            }
            if no_verify {
                config.verify_count = false;
            }
            let data =
                fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
            let stdout = std::io::stdout();
            dump::dump(data, config, &mut stdout.lock())?;
        }
    }

    Ok(())
}
