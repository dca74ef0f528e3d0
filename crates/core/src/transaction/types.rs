//! Transaction domain types.

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, AccountingPeriodId, BalanceEventId, FundAmount, TransactionId};
use serde::{Deserialize, Serialize};

/// Side of a transaction an account sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSide {
    /// Money leaves a standard account or is charged to a debt account.
    Debit,
    /// Money arrives in a standard account or pays down a debt account.
    Credit,
}

impl std::fmt::Display for TransactionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "debit"),
            Self::Credit => write!(f, "credit"),
        }
    }
}

/// One side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAccount {
    /// The account on this side.
    pub account_id: AccountId,
    /// When the side was posted, if it was.
    pub posted_date: Option<NaiveDate>,
    /// The TransactionPosted event, if the side was posted.
    pub posted_event_id: Option<BalanceEventId>,
}

impl TransactionAccount {
    /// Creates an unposted side.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            posted_date: None,
            posted_event_id: None,
        }
    }

    /// Returns true once the side is posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.posted_date.is_some()
    }
}

/// A transaction moving fund amounts out of and/or into accounts.
///
/// The same entries apply to both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// The owning period.
    pub period_id: AccountingPeriodId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Debit side.
    pub debit: Option<TransactionAccount>,
    /// Credit side.
    pub credit: Option<TransactionAccount>,
    /// Amount per fund.
    pub entries: Vec<FundAmount>,
    /// The TransactionAdded event.
    pub added_event_id: BalanceEventId,
}

impl Transaction {
    /// The side `side`, if present.
    #[must_use]
    pub fn side(&self, side: TransactionSide) -> Option<&TransactionAccount> {
        match side {
            TransactionSide::Debit => self.debit.as_ref(),
            TransactionSide::Credit => self.credit.as_ref(),
        }
    }

    /// The side `account_id` sits on, if any.
    #[must_use]
    pub fn side_of(&self, account_id: AccountId) -> Option<TransactionSide> {
        [TransactionSide::Debit, TransactionSide::Credit]
            .into_iter()
            .find(|side| self.side(*side).is_some_and(|account| account.account_id == account_id))
    }

    /// Accounts on either side.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.debit
            .iter()
            .chain(self.credit.iter())
            .map(|account| account.account_id)
            .collect()
    }

    /// Returns true if any side is posted.
    #[must_use]
    pub fn is_partially_posted(&self) -> bool {
        self.debit.iter().chain(self.credit.iter()).any(TransactionAccount::is_posted)
    }

    /// Sides that are still waiting to be posted.
    #[must_use]
    pub fn unposted_accounts(&self) -> Vec<AccountId> {
        self.debit
            .iter()
            .chain(self.credit.iter())
            .filter(|account| !account.is_posted())
            .map(|account| account.account_id)
            .collect()
    }

    pub(crate) fn side_mut(&mut self, side: TransactionSide) -> Option<&mut TransactionAccount> {
        match side {
            TransactionSide::Debit => self.debit.as_mut(),
            TransactionSide::Credit => self.credit.as_mut(),
        }
    }
}

/// Input for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Period that will own the transaction.
    pub period_id: AccountingPeriodId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Account debited, if any.
    pub debit_account: Option<AccountId>,
    /// Account credited, if any.
    pub credit_account: Option<AccountId>,
    /// Positive amount per fund.
    pub entries: Vec<FundAmount>,
}
