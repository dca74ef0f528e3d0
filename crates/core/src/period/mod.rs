//! Accounting periods.
//!
//! A period is a calendar month that owns the transactions and balance events
//! dated in or next to it. Periods form one contiguous run; the earliest open
//! ones are closed in order, and closing writes balance checkpoints for the
//! following period.

pub mod checkpoint;
pub mod service;
pub mod types;

use fundledger_shared::types::{AccountingPeriodId, BalanceEventId, TransactionId};

use crate::events::BalanceEvent;
use crate::transaction::Transaction;

pub use checkpoint::AccountBalanceCheckpoint;
pub use service::AccountingPeriodService;
pub use types::{AccountingPeriod, PeriodKey};

/// Storage for accounting periods and everything they own.
pub trait AccountingPeriodRepository {
    /// Looks up a period by id.
    fn find_period(&self, id: AccountingPeriodId) -> Option<AccountingPeriod>;

    /// Every period, oldest first.
    fn all_periods(&self) -> Vec<AccountingPeriod>;

    /// Looks up a balance event in whichever period owns it.
    fn find_balance_event(&self, id: BalanceEventId) -> Option<BalanceEvent>;

    /// Looks up a transaction in whichever period owns it.
    fn find_transaction(&self, id: TransactionId) -> Option<Transaction>;

    /// Inserts or replaces a period.
    fn save_period(&mut self, period: AccountingPeriod);

    /// Removes a period.
    fn delete_period(&mut self, id: AccountingPeriodId);

    /// Looks up the period for a month.
    fn find_period_by_key(&self, key: PeriodKey) -> Option<AccountingPeriod> {
        self.all_periods().into_iter().find(|period| period.key() == key)
    }

    /// The chronologically latest period.
    fn latest_period(&self) -> Option<AccountingPeriod> {
        self.all_periods().into_iter().max_by_key(AccountingPeriod::key)
    }

    /// The period directly after `key`.
    fn next_period(&self, key: PeriodKey) -> Option<AccountingPeriod> {
        self.find_period_by_key(key.next())
    }

    /// The period directly before `key`.
    fn previous_period(&self, key: PeriodKey) -> Option<AccountingPeriod> {
        self.find_period_by_key(key.previous())
    }

    /// Open periods, oldest first.
    fn open_periods(&self) -> Vec<AccountingPeriod> {
        let mut open: Vec<AccountingPeriod> = self
            .all_periods()
            .into_iter()
            .filter(AccountingPeriod::is_open)
            .collect();
        open.sort_by_key(AccountingPeriod::key);
        open
    }
}
