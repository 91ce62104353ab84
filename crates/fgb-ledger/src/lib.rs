//! # fgb-ledger
//!
//! Fine-grained locking multi-account ledger.
//!
//! This crate provides:
//! - A fixed set of accounts, each guarded by its own mutex
//! - Balance queries, deposits and withdrawals on a single account
//! - Atomic transfers between two accounts
//! - A consistent whole-ledger total
//!
//! ## Locking protocol
//!
//! ```text
//! transfer(3, 1)        transfer(1, 3)        total_balance()
//!   lock 1                lock 1                lock 0, 1, .., N-1
//!   lock 3                lock 3                sum
//!   debit 3, credit 1     debit 1, credit 3     unlock N-1, .., 0
//! ```
//!
//! Guards are always taken in ascending account index, whatever role the
//! account plays in the operation.
//!
//! ## Usage
//!
//! ```
//! use fgb_ledger::Ledger;
//!
//! let ledger = Ledger::new(2);
//! ledger.deposit(0, 100)?;
//! ledger.transfer(0, 1, 30)?;
//! assert_eq!(ledger.balance_of(1)?, 30);
//! assert_eq!(ledger.total_balance(), 100);
//! # Ok::<(), fgb_ledger::LedgerError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod config;
mod error;
mod ledger;
mod stats;

pub use config::{LedgerConfig, DEFAULT_MAX_AMOUNT};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use stats::{OpStats, Operation, StatsSnapshot};

/// Currency amount
pub type Amount = i64;

/// Sum of many amounts; wide enough for any number of full accounts
pub type Total = i128;

/// Position of an account in the ledger, `0..account_count()`
pub type AccountIndex = usize;
