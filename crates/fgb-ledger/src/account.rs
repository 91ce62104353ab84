//! A single guarded balance cell

use crate::Amount;
use parking_lot::{Mutex, MutexGuard};

/// One account: a balance behind its own mutex.
///
/// The account does no validation. Callers check limits while holding the
/// guard, then mutate under that same guard.
#[derive(Debug, Default)]
pub(crate) struct Account {
    balance: Mutex<Amount>,
}

/// Exclusive access to one account's balance
pub(crate) struct AccountGuard<'a> {
    balance: MutexGuard<'a, Amount>,
}

impl Account {
    /// New account with a zero balance
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the account is free and take its guard
    pub(crate) fn lock(&self) -> AccountGuard<'_> {
        AccountGuard {
            balance: self.balance.lock(),
        }
    }

    #[cfg(test)]
    pub(crate) fn balance_is_locked(&self) -> bool {
        self.balance.is_locked()
    }
}

impl AccountGuard<'_> {
    /// Current balance
    pub(crate) fn read(&self) -> Amount {
        *self.balance
    }

    /// Add `delta` (possibly negative) to the balance
    pub(crate) fn mutate(&mut self, delta: Amount) {
        *self.balance += delta;
    }
}
