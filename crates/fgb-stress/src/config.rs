//! Configuration types for fgb-stress

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use fgb_ledger::{Amount, LedgerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Ledger under test
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Operations per worker thread
    #[serde(default = "default_ops_per_thread")]
    pub ops_per_thread: usize,
    /// Deposited into every account before workers start
    #[serde(default = "default_initial_deposit")]
    pub initial_deposit: Amount,
    /// Upper bound of a single random operation amount
    #[serde(default = "default_max_op_amount")]
    pub max_op_amount: Amount,
    /// Base RNG seed; worker `t` uses `seed + t`
    #[serde(default)]
    pub seed: Option<u64>,
    /// Relative operation frequencies
    #[serde(default)]
    pub mix: OpMix,
}

/// Relative weights of each operation in the random mix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpMix {
    /// `balance_of`
    #[serde(default = "default_light_weight")]
    pub balance: u32,
    /// `deposit`
    #[serde(default = "default_update_weight")]
    pub deposit: u32,
    /// `withdraw`
    #[serde(default = "default_update_weight")]
    pub withdraw: u32,
    /// `transfer`
    #[serde(default = "default_transfer_weight")]
    pub transfer: u32,
    /// `total_balance`
    #[serde(default = "default_light_weight")]
    pub total: u32,
}

fn default_threads() -> usize {
    8
}

fn default_ops_per_thread() -> usize {
    100_000
}

fn default_initial_deposit() -> Amount {
    1_000
}

fn default_max_op_amount() -> Amount {
    500
}

fn default_light_weight() -> u32 {
    1
}

fn default_update_weight() -> u32 {
    2
}

fn default_transfer_weight() -> u32 {
    4
}

impl Default for OpMix {
    fn default() -> Self {
        Self {
            balance: default_light_weight(),
            deposit: default_update_weight(),
            withdraw: default_update_weight(),
            transfer: default_transfer_weight(),
            total: default_light_weight(),
        }
    }
}

impl OpMix {
    /// Weights in `[balance, deposit, withdraw, transfer, total]` order
    pub fn weights(&self) -> [u32; 5] {
        [
            self.balance,
            self.deposit,
            self.withdraw,
            self.transfer,
            self.total,
        ]
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            threads: default_threads(),
            ops_per_thread: default_ops_per_thread(),
            initial_deposit: default_initial_deposit(),
            max_op_amount: default_max_op_amount(),
            seed: None,
            mix: OpMix::default(),
        }
    }
}

impl StressConfig {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Build the effective config: file (or defaults), then CLI flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(accounts) = cli.accounts {
            config.ledger.accounts = accounts;
        }
        if let Some(max_amount) = cli.max_amount {
            config.ledger.max_amount = max_amount;
        }
        if let Some(threads) = cli.threads {
            config.threads = threads;
        }
        if let Some(ops) = cli.ops {
            config.ops_per_thread = ops;
        }
        if let Some(initial_deposit) = cli.initial_deposit {
            config.initial_deposit = initial_deposit;
        }
        if let Some(max_op_amount) = cli.max_op_amount {
            config.max_op_amount = max_op_amount;
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// Operations issued across all workers, `None` if it overflows
    pub fn total_operations(&self) -> Option<u64> {
        let threads = u64::try_from(self.threads).ok()?;
        let ops = u64::try_from(self.ops_per_thread).ok()?;
        threads.checked_mul(ops)
    }

    /// Reject configs the harness cannot run
    pub fn validate(&self) -> Result<()> {
        self.ledger.validate()?;
        if self.threads == 0 {
            bail!("threads must be at least 1");
        }
        if self.total_operations().is_none() {
            bail!(
                "{} threads * {} ops_per_thread overflows the operation count",
                self.threads,
                self.ops_per_thread
            );
        }
        if self.initial_deposit < 0 || self.initial_deposit > self.ledger.max_amount {
            bail!(
                "initial_deposit {} outside 0..={}",
                self.initial_deposit,
                self.ledger.max_amount
            );
        }
        if self.max_op_amount <= 0 {
            bail!("max_op_amount must be positive");
        }
        if self.mix.weights().iter().all(|w| *w == 0) {
            bail!("operation mix has no positive weight");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = StressConfig::default();
        assert_eq!(config.threads, 8);
        assert_eq!(config.ops_per_thread, 100_000);
        assert_eq!(config.mix.weights(), [1, 2, 2, 4, 1]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            threads = 3
            seed = 42

            [ledger]
            accounts = 5

            [mix]
            transfer = 10
        "#;
        let config: StressConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.threads, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.ledger.accounts, 5);
        assert_eq!(config.ledger.max_amount, fgb_ledger::DEFAULT_MAX_AMOUNT);
        assert_eq!(config.mix.transfer, 10);
        assert_eq!(config.mix.deposit, 2);
        assert_eq!(config.ops_per_thread, 100_000);
    }

    #[test]
    fn test_config_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "threads = 2\nops_per_thread = 10\n[ledger]\naccounts = 3").unwrap();

        let config = StressConfig::load(file.path()).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.ops_per_thread, 10);
        assert_eq!(config.ledger.accounts, 3);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = StressConfig::load(Path::new("/nonexistent/fgb.toml")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "threads = 2\n[ledger]\naccounts = 3\nmax_amount = 100").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "fgb-stress",
            "--config",
            &path,
            "--threads",
            "6",
            "--seed",
            "9",
            "--initial-deposit",
            "50",
            "--max-op-amount",
            "25",
        ]);
        let config = StressConfig::from_cli(&cli).unwrap();
        assert_eq!(config.threads, 6);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.initial_deposit, 50);
        assert_eq!(config.max_op_amount, 25);
        assert_eq!(config.ledger.accounts, 3);
        assert_eq!(config.ledger.max_amount, 100);
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = StressConfig::default();
        config.threads = 0;
        assert!(config.validate().is_err());

        let mut config = StressConfig::default();
        config.initial_deposit = config.ledger.max_amount + 1;
        assert!(config.validate().is_err());

        let mut config = StressConfig::default();
        config.max_op_amount = 0;
        assert!(config.validate().is_err());

        let mut config = StressConfig::default();
        config.mix = OpMix {
            balance: 0,
            deposit: 0,
            withdraw: 0,
            transfer: 0,
            total: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_operation_count_overflow() {
        let mut config = StressConfig::default();
        config.threads = usize::MAX;
        config.ops_per_thread = 2;
        assert_eq!(config.total_operations(), None);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overflows the operation count"));

        config.threads = 4;
        assert_eq!(config.total_operations(), Some(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_huge_amounts_validate() {
        let cli = Cli::parse_from([
            "fgb-stress",
            "--accounts",
            "1",
            "--max-amount",
            &i64::MAX.to_string(),
            "--max-op-amount",
            &i64::MAX.to_string(),
        ]);
        let config = StressConfig::from_cli(&cli).unwrap();
        assert_eq!(config.ledger.max_amount, Amount::MAX);
        assert_eq!(config.max_op_amount, Amount::MAX);
    }
}
