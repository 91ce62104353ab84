//! Ledger error types

use crate::{AccountIndex, Amount};
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a ledger failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The call itself is malformed
    InvalidArgument,
    /// Not enough funds in the source account
    Underflow,
    /// Destination would exceed the maximum balance
    Overflow,
}

/// Ledger errors
///
/// Every failure is reported before any balance is touched, so an `Err`
/// always means the ledger is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero or negative
    #[error("invalid amount: {0}")]
    InvalidAmount(Amount),

    /// Transfer source and destination are the same account
    #[error("transfer from account {0} to itself")]
    SameAccount(AccountIndex),

    /// Index outside `0..count`
    #[error("no such account: {index} (ledger has {count})")]
    NoSuchAccount {
        /// Requested index
        index: AccountIndex,
        /// Number of accounts in the ledger
        count: usize,
    },

    /// Withdrawal or transfer larger than the current balance
    #[error("underflow: account {index} has {balance}, requested {amount}")]
    Underflow {
        /// Source account
        index: AccountIndex,
        /// Balance at the time of the check
        balance: Amount,
        /// Requested amount
        amount: Amount,
    },

    /// Deposit or transfer would push a balance past the maximum
    #[error("overflow: account {index} has {balance}, adding {amount} exceeds {max}")]
    Overflow {
        /// Destination account
        index: AccountIndex,
        /// Balance at the time of the check
        balance: Amount,
        /// Requested amount
        amount: Amount,
        /// Maximum balance
        max: Amount,
    },

    /// Rejected ledger configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount(_)
            | LedgerError::SameAccount(_)
            | LedgerError::NoSuchAccount { .. }
            | LedgerError::InvalidConfig(_) => ErrorKind::InvalidArgument,
            LedgerError::Underflow { .. } => ErrorKind::Underflow,
            LedgerError::Overflow { .. } => ErrorKind::Overflow,
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
