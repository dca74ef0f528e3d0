//! Balance event domain types.

use chrono::NaiveDate;
use fundledger_shared::types::{
    AccountId, AccountingPeriodId, BalanceEventId, FundAmount, FundId, TransactionId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::AccountingPeriod;
use crate::transaction::TransactionSide;

/// What a balance event does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BalanceEventKind {
    /// Opens an account with posted starting balances. Always the account's first event.
    AccountAdded {
        /// The new account.
        account_id: AccountId,
        /// Posted amount per fund.
        starting_balances: Vec<FundAmount>,
    },
    /// Reserves a transaction's entries as pending on each side.
    TransactionAdded {
        /// The transaction.
        transaction_id: TransactionId,
        /// Debited account.
        debit_account: Option<AccountId>,
        /// Credited account.
        credit_account: Option<AccountId>,
        /// Amount per fund, shared by both sides.
        entries: Vec<FundAmount>,
    },
    /// Moves one side's pending entries into its posted balance.
    TransactionPosted {
        /// The transaction.
        transaction_id: TransactionId,
        /// The posted account.
        account_id: AccountId,
        /// Which side was posted.
        side: TransactionSide,
        /// Amount per fund.
        entries: Vec<FundAmount>,
    },
    /// Moves posted money between two funds of one account.
    FundConversion {
        /// The account.
        account_id: AccountId,
        /// Fund losing the amount.
        from_fund: FundId,
        /// Fund gaining the amount.
        to_fund: FundId,
        /// Positive amount moved.
        amount: Decimal,
    },
    /// Signed adjustment to one fund's posted balance (interest, market value).
    ChangeInValue {
        /// The account.
        account_id: AccountId,
        /// Signed amount.
        entry: FundAmount,
    },
}

/// A balance-affecting event owned by an accounting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEvent {
    /// Unique identifier.
    pub id: BalanceEventId,
    /// The owning period.
    pub period_id: AccountingPeriodId,
    /// Event date.
    pub date: NaiveDate,
    /// Orders events sharing a date within the period.
    pub sequence: u32,
    /// Variant payload.
    pub kind: BalanceEventKind,
}

impl BalanceEvent {
    /// Creates an event drawing its sequence from `period`.
    #[must_use]
    pub fn new(period: &AccountingPeriod, date: NaiveDate, kind: BalanceEventKind) -> Self {
        Self {
            id: BalanceEventId::new(),
            period_id: period.id,
            date,
            sequence: period.next_event_sequence(date),
            kind,
        }
    }

    /// Short variant name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            BalanceEventKind::AccountAdded { .. } => "account_added",
            BalanceEventKind::TransactionAdded { .. } => "transaction_added",
            BalanceEventKind::TransactionPosted { .. } => "transaction_posted",
            BalanceEventKind::FundConversion { .. } => "fund_conversion",
            BalanceEventKind::ChangeInValue { .. } => "change_in_value",
        }
    }

    /// Accounts whose balance this event changes.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        match &self.kind {
            BalanceEventKind::AccountAdded { account_id, .. }
            | BalanceEventKind::TransactionPosted { account_id, .. }
            | BalanceEventKind::FundConversion { account_id, .. }
            | BalanceEventKind::ChangeInValue { account_id, .. } => vec![*account_id],
            BalanceEventKind::TransactionAdded {
                debit_account,
                credit_account,
                ..
            } => debit_account.iter().chain(credit_account.iter()).copied().collect(),
        }
    }

    /// Returns true if the event changes `account_id`'s balance.
    #[must_use]
    pub fn affects(&self, account_id: AccountId) -> bool {
        self.account_ids().contains(&account_id)
    }

    /// Funds referenced by the event.
    #[must_use]
    pub fn fund_ids(&self) -> Vec<FundId> {
        match &self.kind {
            BalanceEventKind::AccountAdded {
                starting_balances: amounts,
                ..
            }
            | BalanceEventKind::TransactionAdded {
                entries: amounts, ..
            }
            | BalanceEventKind::TransactionPosted {
                entries: amounts, ..
            } => amounts.iter().map(|amount| amount.fund_id).collect(),
            BalanceEventKind::FundConversion {
                from_fund, to_fund, ..
            } => vec![*from_fund, *to_fund],
            BalanceEventKind::ChangeInValue { entry, .. } => vec![entry.fund_id],
        }
    }

    /// The transaction behind the event, for transaction events.
    #[must_use]
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match &self.kind {
            BalanceEventKind::TransactionAdded { transaction_id, .. }
            | BalanceEventKind::TransactionPosted { transaction_id, .. } => Some(*transaction_id),
            _ => None,
        }
    }

    /// Side `account_id` sits on, for transaction events.
    #[must_use]
    pub fn side_for(&self, account_id: AccountId) -> Option<TransactionSide> {
        match &self.kind {
            BalanceEventKind::TransactionAdded {
                debit_account,
                credit_account,
                ..
            } => {
                if *debit_account == Some(account_id) {
                    Some(TransactionSide::Debit)
                } else if *credit_account == Some(account_id) {
                    Some(TransactionSide::Credit)
                } else {
                    None
                }
            }
            BalanceEventKind::TransactionPosted {
                account_id: posted,
                side,
                ..
            } => (*posted == account_id).then_some(*side),
            _ => None,
        }
    }
}
