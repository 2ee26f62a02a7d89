//! Tandem CLI
//!
//! Replays cross-ledger request logs against a configured wallet and computes
//! transaction fingerprints.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{
    fingerprint::{self, FingerprintArgs},
    replay::{self, ReplayArgs},
};

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Tandem - mirrored multisig wallet tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON request log to a fresh wallet and print the outcome
    Replay(ReplayArgs),

    /// Print the fingerprint of a transaction
    Fingerprint(FingerprintArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay(args) => replay::run(&args),
        Commands::Fingerprint(args) => fingerprint::run(&args),
    }
}
