//! Random concurrent workload and invariant checks

use crate::config::StressConfig;
use anyhow::{Context, Result};
use fgb_ledger::{AccountIndex, Amount, Ledger, LedgerError, StatsSnapshot, Total};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::thread;
use std::time::Instant;

/// Operation kinds, in [`crate::config::OpMix::weights`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Balance,
    Deposit,
    Withdraw,
    Transfer,
    Total,
}

const ACTIONS: [Action; 5] = [
    Action::Balance,
    Action::Deposit,
    Action::Withdraw,
    Action::Transfer,
    Action::Total,
];

/// Unexpected errors kept verbatim per run; the rest are only counted
const MAX_UNEXPECTED_KEPT: usize = 16;

/// What one worker saw and changed
#[derive(Debug, Default)]
struct WorkerTally {
    deposited: Total,
    withdrawn: Total,
    min_total: Option<Total>,
    max_total: Option<Total>,
    unexpected_count: u64,
    unexpected: Vec<String>,
}

impl WorkerTally {
    /// Note an error no well-formed random call should produce
    fn unexpected(&mut self, op: &str, err: &LedgerError) {
        self.unexpected_count += 1;
        if self.unexpected.len() < MAX_UNEXPECTED_KEPT {
            self.unexpected.push(format!("{}: {}", op, err));
        }
    }

    fn observe_total(&mut self, total: Total) {
        self.min_total = Some(self.min_total.map_or(total, |m| m.min(total)));
        self.max_total = Some(self.max_total.map_or(total, |m| m.max(total)));
    }

    fn merge(&mut self, other: WorkerTally) {
        self.deposited += other.deposited;
        self.withdrawn += other.withdrawn;
        if let Some(total) = other.min_total {
            self.observe_total(total);
        }
        if let Some(total) = other.max_total {
            self.observe_total(total);
        }
        self.unexpected_count += other.unexpected_count;
        let room = MAX_UNEXPECTED_KEPT.saturating_sub(self.unexpected.len());
        self.unexpected.extend(other.unexpected.into_iter().take(room));
    }
}

/// Result of one harness run
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    /// Accounts in the ledger
    pub accounts: usize,
    /// Worker threads
    pub threads: usize,
    /// Operations issued across all workers
    pub operations: u64,
    /// Seed the workers were derived from
    pub seed: u64,
    /// Wall time of the concurrent phase
    pub elapsed_ms: u128,
    /// Operations per second during the concurrent phase
    pub ops_per_sec: f64,
    /// Total after seeding, before workers start
    pub initial_total: Total,
    /// Sum of successful deposits
    pub deposited: Total,
    /// Sum of successful withdrawals
    pub withdrawn: Total,
    /// `initial_total + deposited - withdrawn`
    pub expected_total: Total,
    /// Total after all workers joined
    pub final_total: Total,
    /// Smallest total observed by a worker mid-run
    pub min_observed_total: Option<Total>,
    /// Largest total observed by a worker mid-run
    pub max_observed_total: Option<Total>,
    /// Broken invariants, empty on a clean run
    pub violations: Vec<String>,
    /// Ledger outcome counters
    pub stats: StatsSnapshot,
}

impl WorkloadReport {
    /// True when every invariant held
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Build a ledger from `config`, drive it, and check the invariants
pub fn run(config: &StressConfig) -> Result<WorkloadReport> {
    let ledger = Ledger::with_config(&config.ledger)?;
    let accounts = ledger.account_count();
    let seed = config.seed.unwrap_or_else(rand::random);

    if config.initial_deposit > 0 {
        for index in 0..accounts {
            ledger.deposit(index, config.initial_deposit)?;
        }
    }
    let initial_total = ledger.total_balance();
    let weights = WeightedIndex::new(config.mix.weights())?;

    tracing::info!(
        accounts,
        threads = config.threads,
        ops_per_thread = config.ops_per_thread,
        seed,
        "starting workload"
    );

    let start = Instant::now();
    let tally = thread::scope(|scope| {
        let workers: Vec<_> = (0..config.threads)
            .map(|t| {
                let ledger = &ledger;
                let weights = &weights;
                let rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                scope.spawn(move || worker(ledger, config, weights, rng))
            })
            .collect();

        let mut tally = WorkerTally::default();
        for handle in workers {
            match handle.join() {
                Ok(worker_tally) => tally.merge(worker_tally),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        tally
    });
    let elapsed = start.elapsed();

    let operations = config
        .total_operations()
        .context("threads * ops_per_thread overflows the operation count")?;
    let expected_total = initial_total + tally.deposited - tally.withdrawn;
    let final_total = ledger.total_balance();
    let balances = ledger.snapshot();
    let violations = check_invariants(&ledger, &balances, expected_total, final_total, &tally);

    for violation in &violations {
        tracing::error!("invariant violated: {}", violation);
    }

    let secs = elapsed.as_secs_f64();
    Ok(WorkloadReport {
        accounts,
        threads: config.threads,
        operations,
        seed,
        elapsed_ms: elapsed.as_millis(),
        ops_per_sec: if secs > 0.0 { operations as f64 / secs } else { 0.0 },
        initial_total,
        deposited: tally.deposited,
        withdrawn: tally.withdrawn,
        expected_total,
        final_total,
        min_observed_total: tally.min_total,
        max_observed_total: tally.max_total,
        violations,
        stats: ledger.stats(),
    })
}

fn worker(
    ledger: &Ledger,
    config: &StressConfig,
    weights: &WeightedIndex<u32>,
    mut rng: StdRng,
) -> WorkerTally {
    let accounts = ledger.account_count();
    let mut tally = WorkerTally::default();

    for _ in 0..config.ops_per_thread {
        let action = ACTIONS[weights.sample(&mut rng)];
        if accounts == 0 {
            if action == Action::Total {
                tally.observe_total(ledger.total_balance());
            }
            continue;
        }

        let index: AccountIndex = rng.gen_range(0..accounts);
        let amount = rng.gen_range(1..=config.max_op_amount);
        match action {
            Action::Balance => {
                if let Err(e) = ledger.balance_of(index) {
                    tally.unexpected("balance_of", &e);
                }
            }
            Action::Deposit => match ledger.deposit(index, amount) {
                Ok(_) => tally.deposited += Total::from(amount),
                Err(LedgerError::Overflow { .. }) => {}
                Err(e) => tally.unexpected("deposit", &e),
            },
            Action::Withdraw => match ledger.withdraw(index, amount) {
                Ok(_) => tally.withdrawn += Total::from(amount),
                Err(LedgerError::Underflow { .. }) => {}
                Err(e) => tally.unexpected("withdraw", &e),
            },
            Action::Transfer => {
                let to = rng.gen_range(0..accounts);
                match ledger.transfer(index, to, amount) {
                    Ok(())
                    | Err(LedgerError::Underflow { .. })
                    | Err(LedgerError::Overflow { .. })
                    | Err(LedgerError::SameAccount(_)) => {}
                    Err(e) => tally.unexpected("transfer", &e),
                }
            }
            Action::Total => tally.observe_total(ledger.total_balance()),
        }
    }

    tally
}

fn check_invariants(
    ledger: &Ledger,
    balances: &[Amount],
    expected_total: Total,
    final_total: Total,
    tally: &WorkerTally,
) -> Vec<String> {
    let max = ledger.max_amount();
    let mut violations = vec![];

    if final_total != expected_total {
        violations.push(format!(
            "final total {} != expected {}",
            final_total, expected_total
        ));
    }

    let snapshot_total: Total = balances.iter().map(|b| Total::from(*b)).sum();
    if snapshot_total != final_total {
        violations.push(format!(
            "snapshot sums to {} but total_balance is {}",
            snapshot_total, final_total
        ));
    }

    for (index, balance) in balances.iter().enumerate() {
        if !(0..=max).contains(balance) {
            violations.push(format!("account {} balance {} outside 0..={}", index, balance, max));
        }
    }

    let ceiling = Total::from(max) * balances.len() as Total;
    if let Some(low) = tally.min_total.filter(|t| *t < 0) {
        violations.push(format!("observed total {} outside 0..={}", low, ceiling));
    }
    if let Some(high) = tally.max_total.filter(|t| *t > ceiling) {
        violations.push(format!("observed total {} outside 0..={}", high, ceiling));
    }

    if tally.unexpected_count > 0 {
        violations.push(format!(
            "{} unexpected ledger error(s): {}",
            tally.unexpected_count,
            tally.unexpected.join("; ")
        ));
    }

    violations
}
