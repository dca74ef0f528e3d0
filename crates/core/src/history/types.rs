//! Balance history rows.

use chrono::NaiveDate;
use fundledger_shared::types::{AccountBalanceHistoryId, AccountId, BalanceEventId, FundAmount};
use serde::{Deserialize, Serialize};

use crate::account::AccountType;
use crate::balance::AccountBalance;

/// Position of a row in an account's history. Orders by date, then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryKey {
    /// Row date.
    pub date: NaiveDate,
    /// Dense per-(account, date) ordinal starting at 1.
    pub sequence: u32,
}

impl HistoryKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(date: NaiveDate, sequence: u32) -> Self {
        Self { date, sequence }
    }

    /// Key sorting before every row dated `date`.
    #[must_use]
    pub const fn start_of(date: NaiveDate) -> Self {
        Self { date, sequence: 0 }
    }
}

impl std::fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.date, self.sequence)
    }
}

/// Snapshot of an account's balance right after one event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceHistory {
    /// Unique identifier.
    pub id: AccountBalanceHistoryId,
    /// The account.
    pub account_id: AccountId,
    /// The event that produced this snapshot.
    pub event_id: BalanceEventId,
    /// Row date.
    pub date: NaiveDate,
    /// Row sequence on `date`.
    pub sequence: u32,
    /// Posted amount per fund.
    pub fund_balances: Vec<FundAmount>,
    /// Pending debit amount per fund.
    pub pending_debits: Vec<FundAmount>,
    /// Pending credit amount per fund.
    pub pending_credits: Vec<FundAmount>,
}

impl AccountBalanceHistory {
    /// Creates a row holding `balance` at `key`.
    #[must_use]
    pub fn from_balance(event_id: BalanceEventId, key: HistoryKey, balance: &AccountBalance) -> Self {
        Self {
            id: AccountBalanceHistoryId::new(),
            account_id: balance.account_id(),
            event_id,
            date: key.date,
            sequence: key.sequence,
            fund_balances: balance.fund_balances().to_vec(),
            pending_debits: balance.pending_debits().to_vec(),
            pending_credits: balance.pending_credits().to_vec(),
        }
    }

    /// The row's position.
    #[must_use]
    pub fn key(&self) -> HistoryKey {
        HistoryKey::new(self.date, self.sequence)
    }

    /// The stored snapshot as a balance.
    #[must_use]
    pub fn balance(&self, account_type: AccountType) -> AccountBalance {
        AccountBalance::from_parts(
            self.account_id,
            account_type,
            self.fund_balances.clone(),
            self.pending_debits.clone(),
            self.pending_credits.clone(),
        )
    }

    /// Same row moved to `sequence` and holding `balance`.
    #[must_use]
    pub fn rewritten(&self, sequence: u32, balance: &AccountBalance) -> Self {
        Self {
            sequence,
            fund_balances: balance.fund_balances().to_vec(),
            pending_debits: balance.pending_debits().to_vec(),
            pending_credits: balance.pending_credits().to_vec(),
            ..self.clone()
        }
    }
}

/// Row changes for one account, written in a single batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryChangeSet {
    /// New rows.
    pub added: Vec<AccountBalanceHistory>,
    /// Existing rows with a new snapshot and/or sequence.
    pub updated: Vec<AccountBalanceHistory>,
    /// Rows to remove.
    pub deleted: Vec<AccountBalanceHistoryId>,
}

impl HistoryChangeSet {
    /// Returns true if nothing would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Number of rows touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }
}
