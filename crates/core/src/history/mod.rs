//! Per-account balance history.
//!
//! One row per event applied to an account, keyed by (date, sequence), each
//! holding the balance right after the event. Point-in-time queries read a
//! single row instead of replaying events; inserting, editing or removing an
//! event in the past rewrites every later row.

pub mod cascade;
pub mod service;
pub mod types;

#[cfg(test)]
mod cascade_props;

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, BalanceEventId};

pub use cascade::{ReplayStep, replay_forward};
pub use service::AccountBalanceHistoryService;
pub use types::{AccountBalanceHistory, HistoryChangeSet, HistoryKey};

/// Storage for balance history rows.
pub trait AccountBalanceHistoryRepository {
    /// 1 + the highest sequence on `date` for the account, or 1.
    fn next_sequence(&self, account_id: AccountId, date: NaiveDate) -> u32;

    /// Latest row strictly before `key`.
    fn find_latest_before(&self, account_id: AccountId, key: HistoryKey) -> Option<AccountBalanceHistory>;

    /// Rows at or after `key`, ascending.
    fn find_from(&self, account_id: AccountId, key: HistoryKey) -> Vec<AccountBalanceHistory>;

    /// The row produced by `event_id`.
    fn find_by_event(&self, account_id: AccountId, event_id: BalanceEventId) -> Option<AccountBalanceHistory>;

    /// Every row of the account, ascending.
    fn find_all_for_account(&self, account_id: AccountId) -> Vec<AccountBalanceHistory>;

    /// Writes a batch of changes for one account.
    fn apply_changes(&mut self, changes: HistoryChangeSet);

    /// The account's most recent row.
    fn find_latest(&self, account_id: AccountId) -> Option<AccountBalanceHistory> {
        self.find_all_for_account(account_id).pop()
    }
}
