//! fgb-stress binary
//!
//! Builds a ledger, runs a random concurrent workload against it and exits
//! non-zero if any ledger invariant was broken.

mod cli;
mod config;
mod workload;

use anyhow::{bail, Result};
use cli::Cli;
use config::StressConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use workload::WorkloadReport;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = StressConfig::from_cli(&cli)?;
    tracing::debug!("Effective config: {:?}", config);

    let report = workload::run(&config)?;
    print_report(&report, cli.json)?;

    if !report.is_consistent() {
        bail!("{} invariant violation(s)", report.violations.len());
    }
    Ok(())
}

fn print_report(report: &WorkloadReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} ops on {} accounts by {} threads in {} ms ({:.0} ops/s, seed {})",
        report.operations,
        report.accounts,
        report.threads,
        report.elapsed_ms,
        report.ops_per_sec,
        report.seed
    );
    println!(
        "total: initial {} + deposited {} - withdrawn {} = {} (final {})",
        report.initial_total,
        report.deposited,
        report.withdrawn,
        report.expected_total,
        report.final_total
    );
    let stats = &report.stats;
    println!(
        "transfers: {} ok, {} underflow, {} overflow, {} invalid",
        stats.transfer.ok,
        stats.transfer.underflow,
        stats.transfer.overflow,
        stats.transfer.invalid_argument
    );
    if report.is_consistent() {
        println!("all invariants held");
    } else {
        for violation in &report.violations {
            println!("VIOLATION: {}", violation);
        }
    }
    Ok(())
}
