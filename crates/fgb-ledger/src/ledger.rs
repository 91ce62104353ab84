//! Ledger: fixed accounts plus the locking protocol over them

use crate::account::{Account, AccountGuard};
use crate::config::{LedgerConfig, DEFAULT_MAX_AMOUNT};
use crate::error::{LedgerError, LedgerResult};
use crate::stats::{LedgerStats, Operation, StatsSnapshot};
use crate::{AccountIndex, Amount, Total};

/// Multi-account ledger with per-account locking.
///
/// Single-account operations hold one guard. `transfer` holds two, taken in
/// ascending index order. `total_balance` and `snapshot` hold every guard,
/// taken in ascending index order and released in descending order. No
/// other acquisition order exists, so concurrent callers cannot deadlock.
pub struct Ledger {
    /// Accounts by index, never resized
    accounts: Box<[Account]>,
    /// Maximum balance of any single account
    max_amount: Amount,
    /// Outcome counters
    stats: LedgerStats,
}

impl Ledger {
    /// Create a ledger of `accounts` empty accounts with the default maximum
    pub fn new(accounts: usize) -> Self {
        Self::build(accounts, DEFAULT_MAX_AMOUNT)
    }

    /// Create a ledger from config
    ///
    /// Fails if `max_amount` is not positive.
    pub fn with_config(config: &LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::build(config.accounts, config.max_amount))
    }

    fn build(count: usize, max_amount: Amount) -> Self {
        let accounts = (0..count).map(|_| Account::new()).collect();
        tracing::debug!(accounts = count, max_amount, "ledger created");

        Self {
            accounts,
            max_amount,
            stats: LedgerStats::new(),
        }
    }

    /// Number of accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Maximum balance of any single account
    pub fn max_amount(&self) -> Amount {
        self.max_amount
    }

    /// Current balance of account `index`
    pub fn balance_of(&self, index: AccountIndex) -> LedgerResult<Amount> {
        let result = self.account(index).map(|account| account.lock().read());
        self.finish(Operation::BalanceOf, result)
    }

    /// Sum of all balances at a single consistent instant
    pub fn total_balance(&self) -> Total {
        let guards = self.lock_all();
        let total = guards.iter().map(|guard| Total::from(guard.read())).sum();
        release_all(guards);
        self.stats.record_ok(Operation::TotalBalance);
        total
    }

    /// Every balance, captured at a single consistent instant
    ///
    /// Takes the same locks as [`Ledger::total_balance`] but is not counted
    /// in [`Ledger::stats`].
    pub fn snapshot(&self) -> Vec<Amount> {
        let guards = self.lock_all();
        let balances = guards.iter().map(AccountGuard::read).collect();
        release_all(guards);
        balances
    }

    /// Add `amount` to account `index`, returning the new balance
    pub fn deposit(&self, index: AccountIndex, amount: Amount) -> LedgerResult<Amount> {
        let result = self.try_deposit(index, amount);
        self.finish(Operation::Deposit, result)
    }

    /// Take `amount` from account `index`, returning the new balance
    pub fn withdraw(&self, index: AccountIndex, amount: Amount) -> LedgerResult<Amount> {
        let result = self.try_withdraw(index, amount);
        self.finish(Operation::Withdraw, result)
    }

    /// Move `amount` from account `from` to account `to` atomically
    pub fn transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
    ) -> LedgerResult<()> {
        let result = self.try_transfer(from, to, amount);
        self.finish(Operation::Transfer, result)
    }

    /// Outcome counters so far
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn try_deposit(&self, index: AccountIndex, amount: Amount) -> LedgerResult<Amount> {
        check_amount(amount)?;
        let mut guard = self.account(index)?.lock();
        self.check_credit(index, guard.read(), amount)?;
        guard.mutate(amount);
        Ok(guard.read())
    }

    fn try_withdraw(&self, index: AccountIndex, amount: Amount) -> LedgerResult<Amount> {
        check_amount(amount)?;
        let mut guard = self.account(index)?.lock();
        check_debit(index, guard.read(), amount)?;
        guard.mutate(-amount);
        Ok(guard.read())
    }

    fn try_transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
    ) -> LedgerResult<()> {
        check_amount(amount)?;
        if from == to {
            return Err(LedgerError::SameAccount(from));
        }
        let source = self.account(from)?;
        let dest = self.account(to)?;

        // Lower index first, whichever side it is.
        let (mut source_guard, mut dest_guard) = if from < to {
            let source_guard = source.lock();
            (source_guard, dest.lock())
        } else {
            let dest_guard = dest.lock();
            (source.lock(), dest_guard)
        };

        check_debit(from, source_guard.read(), amount)?;
        self.check_credit(to, dest_guard.read(), amount)?;
        source_guard.mutate(-amount);
        dest_guard.mutate(amount);
        Ok(())
    }

    fn account(&self, index: AccountIndex) -> LedgerResult<&Account> {
        self.accounts.get(index).ok_or(LedgerError::NoSuchAccount {
            index,
            count: self.accounts.len(),
        })
    }

    /// Guards for every account, acquired in ascending index order
    fn lock_all(&self) -> Vec<AccountGuard<'_>> {
        self.accounts.iter().map(Account::lock).collect()
    }

    fn check_credit(
        &self,
        index: AccountIndex,
        balance: Amount,
        amount: Amount,
    ) -> LedgerResult<()> {
        // `balance <= max_amount` holds, so the subtraction cannot wrap.
        if amount > self.max_amount || balance > self.max_amount - amount {
            return Err(LedgerError::Overflow {
                index,
                balance,
                amount,
                max: self.max_amount,
            });
        }
        Ok(())
    }

    fn finish<T>(&self, op: Operation, result: LedgerResult<T>) -> LedgerResult<T> {
        self.stats.record(op, &result);
        if let Err(e) = &result {
            tracing::trace!(?op, kind = ?e.kind(), "rejected: {}", e);
        }
        result
    }
}

fn check_amount(amount: Amount) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

fn check_debit(index: AccountIndex, balance: Amount, amount: Amount) -> LedgerResult<()> {
    if amount > balance {
        return Err(LedgerError::Underflow {
            index,
            balance,
            amount,
        });
    }
    Ok(())
}

/// Drop guards highest index first
fn release_all(mut guards: Vec<AccountGuard<'_>>) {
    while let Some(guard) = guards.pop() {
        drop(guard);
    }
}
