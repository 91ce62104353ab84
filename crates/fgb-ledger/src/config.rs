//! Ledger configuration

use crate::error::{LedgerError, LedgerResult};
use crate::Amount;
use serde::{Deserialize, Serialize};

/// Default maximum balance of a single account (10^15)
pub const DEFAULT_MAX_AMOUNT: Amount = 1_000_000_000_000_000;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Number of accounts, fixed for the ledger's lifetime
    #[serde(default = "default_accounts")]
    pub accounts: usize,
    /// Maximum balance any single account may hold
    #[serde(default = "default_max_amount")]
    pub max_amount: Amount,
}

fn default_accounts() -> usize {
    16
}

fn default_max_amount() -> Amount {
    DEFAULT_MAX_AMOUNT
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            accounts: default_accounts(),
            max_amount: default_max_amount(),
        }
    }
}

impl LedgerConfig {
    /// Config with `accounts` accounts and the default maximum
    pub fn with_accounts(accounts: usize) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    /// Check the config describes a usable ledger
    pub fn validate(&self) -> LedgerResult<()> {
        if self.max_amount <= 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "max_amount must be positive, got {}",
                self.max_amount
            )));
        }
        Ok(())
    }
}
