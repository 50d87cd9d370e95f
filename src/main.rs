//! mstream CLI - Command line interface for merkle_stream
//!
//! Computes block-level Merkle checksums of files or stdin.

use clap::{Parser, Subcommand};
use merkle_stream::{Digest, HashAlgorithm, MerkleHasher, StreamConfig};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "mstream")]
#[command(about = "Incremental block-level Merkle checksums for byte streams")]
#[command(version)]
struct Cli {
    /// Merkle block length in bytes
    #[arg(short, long)]
    block_length: Option<usize>,

    /// Leaf hash algorithm
    #[arg(short, long)]
    algorithm: Option<HashAlgorithm>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the root checksum of a file (stdin if omitted)
    Sum {
        /// Input file
        file: Option<PathBuf>,
    },

    /// List every leaf with its byte range and checksum
    Leaves {
        /// Input file
        file: Option<PathBuf>,
    },

    /// Check a file against an expected root checksum
    Verify {
        /// Input file
        file: Option<PathBuf>,
        /// Expected root checksum (hex)
        #[arg(short, long)]
        root: String,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "merkle_stream={},mstream={}",
            log_level, log_level
        )))
        .with_writer(io::stderr)
        .init();

    let config =
        StreamConfig::load(cli.config.as_deref())?.with_overrides(cli.block_length, cli.algorithm);
    config.validate()?;
    debug!(?config, "effective configuration");

    match cli.command {
        Commands::Sum { file } => {
            let mut hasher = hash_input(&config, file.as_deref())?;
            let root = hasher.sum(&[])?;
            let stats = hasher.stats();
            output(
                &cli.format,
                &serde_json::json!({
                    "root": root.map(|d| d.to_hex()),
                    "leaves": stats.leaves,
                    "size": stats.total_bytes,
                    "block_length": config.block_length,
                    "algorithm": config.algorithm,
                }),
            );
        }

        Commands::Leaves { file } => {
            let hasher = hash_input(&config, file.as_deref())?;
            let tree = hasher.into_tree()?;
            let items: Vec<_> = tree
                .leaves()
                .iter()
                .enumerate()
                .map(|(i, leaf)| -> merkle_stream::Result<serde_json::Value> {
                    let range = tree.block_range(i)?;
                    Ok(serde_json::json!({
                        "index": i,
                        "start": range.start,
                        "end": range.end,
                        "checksum": leaf.checksum().to_hex(),
                    }))
                })
                .collect::<merkle_stream::Result<_>>()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "count": items.len(),
                    "leaves": items
                }),
            );
        }

        Commands::Verify { file, root } => {
            let expected = Digest::from_hex(&root)
                .map_err(|e| merkle_stream::Error::InvalidDigest(format!("{}: {}", root, e)))?;
            let mut hasher = hash_input(&config, file.as_deref())?;
            let actual = hasher.sum(&[])?;
            let matches = actual.as_ref() == Some(&expected);
            output(
                &cli.format,
                &serde_json::json!({
                    "status": if matches { "ok" } else { "mismatch" },
                    "expected": expected.to_hex(),
                    "actual": actual.map(|d| d.to_hex()),
                }),
            );
            if !matches {
                std::process::exit(1);
            }
        }

        Commands::Config => {
            output(&cli.format, &serde_json::to_value(&config)?);
        }
    }

    Ok(())
}

/// Stream a file (or stdin) through a fresh accumulator
fn hash_input(config: &StreamConfig, file: Option<&Path>) -> anyhow::Result<MerkleHasher> {
    let mut hasher = config.build()?;
    let mut reader: Box<dyn Read> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            anyhow::anyhow!("Failed to open {}: {}", path.display(), e)
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let copied = io::copy(&mut reader, &mut hasher)?;
    debug!(bytes = copied, leaves = hasher.leaf_count(), "input consumed");
    Ok(hasher)
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", value);
        }
        OutputFormat::Text => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            );
        }
    }
}
