//! CLI argument parsing for fgb-stress

use clap::Parser;
use std::path::PathBuf;

/// Concurrent load harness for the fgb ledger
#[derive(Parser, Debug, Clone)]
#[command(name = "fgb-stress")]
#[command(about = "Hammer a shared ledger from many threads and verify conservation")]
#[command(version)]
pub struct Cli {
    /// TOML config file (flags below override it)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of accounts
    #[arg(long)]
    pub accounts: Option<usize>,

    /// Maximum balance per account
    #[arg(long)]
    pub max_amount: Option<i64>,

    /// Worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Operations per worker thread
    #[arg(long)]
    pub ops: Option<usize>,

    /// Amount deposited into every account before the run
    #[arg(long)]
    pub initial_deposit: Option<i64>,

    /// Upper bound of a single random operation amount
    #[arg(long)]
    pub max_op_amount: Option<i64>,

    /// Base RNG seed (random if not given)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
