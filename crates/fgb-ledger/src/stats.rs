//! Per-operation outcome counters

use crate::error::{ErrorKind, LedgerError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Single-account balance query
    BalanceOf,
    /// Whole-ledger sum
    TotalBalance,
    /// Deposit into one account
    Deposit,
    /// Withdrawal from one account
    Withdraw,
    /// Two-account transfer
    Transfer,
}

impl Operation {
    /// All operations, in counter order
    pub const ALL: [Operation; 5] = [
        Operation::BalanceOf,
        Operation::TotalBalance,
        Operation::Deposit,
        Operation::Withdraw,
        Operation::Transfer,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Default)]
struct OpCounters {
    ok: AtomicU64,
    invalid_argument: AtomicU64,
    underflow: AtomicU64,
    overflow: AtomicU64,
}

impl OpCounters {
    fn load(&self) -> OpStats {
        OpStats {
            ok: self.ok.load(Ordering::Relaxed),
            invalid_argument: self.invalid_argument.load(Ordering::Relaxed),
            underflow: self.underflow.load(Ordering::Relaxed),
            overflow: self.overflow.load(Ordering::Relaxed),
        }
    }
}

/// Counters for every operation.
///
/// Relaxed atomics, updated after the guards are dropped. A snapshot taken
/// while operations run is approximate.
#[derive(Default)]
pub(crate) struct LedgerStats {
    ops: [OpCounters; 5],
}

impl LedgerStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one call
    pub(crate) fn record<T>(&self, op: Operation, result: &Result<T, LedgerError>) {
        let counters = &self.ops[op.slot()];
        let counter = match result {
            Ok(_) => &counters.ok,
            Err(e) => match e.kind() {
                ErrorKind::InvalidArgument => &counters.invalid_argument,
                ErrorKind::Underflow => &counters.underflow,
                ErrorKind::Overflow => &counters.overflow,
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ok(&self, op: Operation) {
        self.ops[op.slot()].ok.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            balance_of: self.ops[Operation::BalanceOf.slot()].load(),
            total_balance: self.ops[Operation::TotalBalance.slot()].load(),
            deposit: self.ops[Operation::Deposit.slot()].load(),
            withdraw: self.ops[Operation::Withdraw.slot()].load(),
            transfer: self.ops[Operation::Transfer.slot()].load(),
        }
    }
}

/// Outcome counts for one operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OpStats {
    /// Successful calls
    pub ok: u64,
    /// Calls rejected as malformed
    pub invalid_argument: u64,
    /// Calls rejected for insufficient funds
    pub underflow: u64,
    /// Calls rejected for exceeding the maximum balance
    pub overflow: u64,
}

impl OpStats {
    /// Every call, successful or not
    pub fn total(&self) -> u64 {
        self.ok + self.failed()
    }

    /// Rejected calls
    pub fn failed(&self) -> u64 {
        self.invalid_argument + self.underflow + self.overflow
    }
}

/// Point-in-time copy of the ledger's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// `balance_of` outcomes
    pub balance_of: OpStats,
    /// `total_balance` outcomes
    pub total_balance: OpStats,
    /// `deposit` outcomes
    pub deposit: OpStats,
    /// `withdraw` outcomes
    pub withdraw: OpStats,
    /// `transfer` outcomes
    pub transfer: OpStats,
}

impl StatsSnapshot {
    /// Counters for `op`
    pub fn get(&self, op: Operation) -> OpStats {
        match op {
            Operation::BalanceOf => self.balance_of,
            Operation::TotalBalance => self.total_balance,
            Operation::Deposit => self.deposit,
            Operation::Withdraw => self.withdraw,
            Operation::Transfer => self.transfer,
        }
    }

    /// Calls across all operations
    pub fn total_calls(&self) -> u64 {
        Operation::ALL.iter().map(|op| self.get(*op).total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let stats = LedgerStats::new();
        stats.record(Operation::Deposit, &Ok::<_, LedgerError>(10));
        stats.record::<()>(Operation::Deposit, &Err(LedgerError::InvalidAmount(0)));
        stats.record::<()>(
            Operation::Withdraw,
            &Err(LedgerError::Underflow {
                index: 0,
                balance: 0,
                amount: 5,
            }),
        );
        stats.record_ok(Operation::TotalBalance);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.deposit.ok, 1);
        assert_eq!(snapshot.deposit.invalid_argument, 1);
        assert_eq!(snapshot.deposit.total(), 2);
        assert_eq!(snapshot.withdraw.underflow, 1);
        assert_eq!(snapshot.total_balance.ok, 1);
        assert_eq!(snapshot.transfer, OpStats::default());
        assert_eq!(snapshot.total_calls(), 4);
    }

    #[test]
    fn test_get_matches_fields() {
        let stats = LedgerStats::new();
        stats.record_ok(Operation::Transfer);
        stats.record_ok(Operation::Transfer);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get(Operation::Transfer).ok, 2);
        assert_eq!(snapshot.get(Operation::BalanceOf).ok, 0);
    }
}
