//! In-memory implementation of every ledger repository.
//!
//! Periods are kept ordered by month and history rows ordered by
//! (date, sequence) per account, so range lookups never sort on read.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use fundledger_core::account::AccountRepository;
use fundledger_core::fund::{Fund, FundRepository};
use fundledger_core::history::AccountBalanceHistoryRepository;
use fundledger_core::period::AccountingPeriodRepository;
use fundledger_core::{
    Account, AccountBalanceHistory, AccountingPeriod, BalanceEvent, HistoryChangeSet, HistoryKey, PeriodKey,
    Transaction,
};
use fundledger_shared::types::{
    AccountBalanceHistoryId, AccountId, AccountingPeriodId, BalanceEventId, FundId, TransactionId,
};
use tracing::trace;

/// Ledger data held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    funds: BTreeMap<FundId, Fund>,
    accounts: BTreeMap<AccountId, Account>,
    periods: BTreeMap<PeriodKey, AccountingPeriod>,
    period_keys: HashMap<AccountingPeriodId, PeriodKey>,
    history: HashMap<AccountId, Vec<AccountBalanceHistory>>,
    history_accounts: HashMap<AccountBalanceHistoryId, AccountId>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of history rows across every account.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history_accounts.len()
    }

    fn rows(&self, account_id: AccountId) -> &[AccountBalanceHistory] {
        self.history.get(&account_id).map_or(&[], Vec::as_slice)
    }

    /// Index of the first row at or after `key`.
    fn partition(rows: &[AccountBalanceHistory], key: HistoryKey) -> usize {
        rows.partition_point(|row| row.key() < key)
    }
}

impl FundRepository for InMemoryStore {
    fn find_fund(&self, id: FundId) -> Option<Fund> {
        self.funds.get(&id).cloned()
    }

    fn find_fund_by_name(&self, name: &str) -> Option<Fund> {
        self.funds.values().find(|fund| fund.name == name).cloned()
    }

    fn all_funds(&self) -> Vec<Fund> {
        self.funds.values().cloned().collect()
    }

    fn add_fund(&mut self, fund: Fund) {
        self.funds.insert(fund.id, fund);
    }
}

impl AccountRepository for InMemoryStore {
    fn find_account(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).cloned()
    }

    fn find_account_by_name(&self, name: &str) -> Option<Account> {
        self.accounts
            .values()
            .find(|account| account.name == name)
            .cloned()
    }

    fn all_accounts(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    fn add_account(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }
}

impl AccountingPeriodRepository for InMemoryStore {
    fn find_period(&self, id: AccountingPeriodId) -> Option<AccountingPeriod> {
        self.period_keys
            .get(&id)
            .and_then(|key| self.periods.get(key))
            .cloned()
    }

    fn all_periods(&self) -> Vec<AccountingPeriod> {
        self.periods.values().cloned().collect()
    }

    fn find_balance_event(&self, id: BalanceEventId) -> Option<BalanceEvent> {
        self.periods
            .values()
            .find_map(|period| period.find_event(id))
            .cloned()
    }

    fn find_transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.periods
            .values()
            .find_map(|period| period.find_transaction(id))
            .cloned()
    }

    fn save_period(&mut self, period: AccountingPeriod) {
        self.period_keys.insert(period.id, period.key());
        self.periods.insert(period.key(), period);
    }

    fn delete_period(&mut self, id: AccountingPeriodId) {
        if let Some(key) = self.period_keys.remove(&id) {
            self.periods.remove(&key);
        }
    }

    fn find_period_by_key(&self, key: PeriodKey) -> Option<AccountingPeriod> {
        self.periods.get(&key).cloned()
    }

    fn latest_period(&self) -> Option<AccountingPeriod> {
        self.periods.values().next_back().cloned()
    }

    fn open_periods(&self) -> Vec<AccountingPeriod> {
        self.periods
            .values()
            .filter(|period| period.is_open())
            .cloned()
            .collect()
    }
}

impl AccountBalanceHistoryRepository for InMemoryStore {
    fn next_sequence(&self, account_id: AccountId, date: NaiveDate) -> u32 {
        self.rows(account_id)
            .iter()
            .filter(|row| row.date == date)
            .map(|row| row.sequence)
            .max()
            .map_or(1, |sequence| sequence + 1)
    }

    fn find_latest_before(&self, account_id: AccountId, key: HistoryKey) -> Option<AccountBalanceHistory> {
        let rows = self.rows(account_id);
        Self::partition(rows, key)
            .checked_sub(1)
            .map(|index| rows[index].clone())
    }

    fn find_from(&self, account_id: AccountId, key: HistoryKey) -> Vec<AccountBalanceHistory> {
        let rows = self.rows(account_id);
        rows[Self::partition(rows, key)..].to_vec()
    }

    fn find_by_event(&self, account_id: AccountId, event_id: BalanceEventId) -> Option<AccountBalanceHistory> {
        self.rows(account_id)
            .iter()
            .find(|row| row.event_id == event_id)
            .cloned()
    }

    fn find_all_for_account(&self, account_id: AccountId) -> Vec<AccountBalanceHistory> {
        self.rows(account_id).to_vec()
    }

    fn apply_changes(&mut self, changes: HistoryChangeSet) {
        let written = changes.len();
        let mut touched: Vec<AccountId> = Vec::new();

        for id in changes.deleted {
            if let Some(account_id) = self.history_accounts.remove(&id)
                && let Some(rows) = self.history.get_mut(&account_id)
            {
                rows.retain(|row| row.id != id);
                touched.push(account_id);
            }
        }
        for updated in changes.updated {
            if let Some(row) = self
                .history
                .get_mut(&updated.account_id)
                .and_then(|rows| rows.iter_mut().find(|row| row.id == updated.id))
            {
                touched.push(updated.account_id);
                *row = updated;
            }
        }
        for added in changes.added {
            self.history_accounts.insert(added.id, added.account_id);
            touched.push(added.account_id);
            self.history.entry(added.account_id).or_default().push(added);
        }

        touched.sort();
        touched.dedup();
        for account_id in touched {
            if let Some(rows) = self.history.get_mut(&account_id) {
                rows.sort_by_key(AccountBalanceHistory::key);
            }
            trace!(account_id = %account_id, written, "balance history written");
        }
    }

    fn find_latest(&self, account_id: AccountId) -> Option<AccountBalanceHistory> {
        self.rows(account_id).last().cloned()
    }
}
