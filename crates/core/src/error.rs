//! Ledger error types for the balance engine.
//!
//! Every mutation entry point reports failures as [`Violations`]: the complete,
//! non-empty list of [`LedgerError`]s found while validating the request and
//! replaying the affected balance history. Nothing is persisted when a
//! `Violations` value is returned.

use std::fmt;

use chrono::NaiveDate;
use fundledger_shared::types::{
    AccountId, AccountingPeriodId, BalanceEventId, FundId, TransactionId,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Broad category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A balance would become negative or a fund would be overdrawn.
    InvariantViolation,
    /// Duplicate or out-of-range event sequence, or an event placed out of order.
    SequencingConflict,
    /// Operation not allowed in the current state of an accounting period.
    PeriodStateViolation,
    /// Reference to a fund, account, period or event that is missing or unrelated.
    ReferentialViolation,
    /// Malformed request.
    InvalidInput,
    /// The stored ledger is inconsistent with itself.
    Internal,
}

/// Errors that can occur while validating or propagating balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Invariant Violations ==========
    /// Posted balance across all funds would drop below zero.
    #[error("Posted balance of account {account_id} would be {posted_balance}")]
    NegativePostedBalance {
        /// The account.
        account_id: AccountId,
        /// The resulting posted balance.
        posted_balance: Decimal,
    },

    /// Amount available to spend on a standard account would drop below zero.
    #[error("Available to spend of account {account_id} would be {available}")]
    NegativeAvailableToSpend {
        /// The account.
        account_id: AccountId,
        /// The resulting available amount.
        available: Decimal,
    },

    /// A decreasing event exceeds the balance floor, pending decreases included.
    #[error("Account {account_id} cannot absorb a decrease of {requested} (floor {available})")]
    InsufficientBalance {
        /// The account.
        account_id: AccountId,
        /// The lower of the posted balance and the posted balance after pending changes.
        available: Decimal,
        /// The size of the decrease.
        requested: Decimal,
    },

    /// A fund conversion draws more than the source fund holds.
    #[error("Fund {fund_id} of account {account_id} holds {available}, {requested} requested")]
    InsufficientFundBalance {
        /// The account.
        account_id: AccountId,
        /// The source fund.
        fund_id: FundId,
        /// The lower of the fund balance and the fund balance after pending changes.
        available: Decimal,
        /// The converted amount.
        requested: Decimal,
    },

    /// A pending collection would hold a negative amount.
    #[error("Pending amount for fund {fund_id} of account {account_id} would be {amount}")]
    NegativePendingAmount {
        /// The account.
        account_id: AccountId,
        /// The fund.
        fund_id: FundId,
        /// The resulting pending amount.
        amount: Decimal,
    },

    /// A checkpoint would record a negative balance.
    #[error("Checkpoint for account {account_id} in period {period_id} would be {balance}")]
    NegativeCheckpoint {
        /// The account.
        account_id: AccountId,
        /// The period receiving the checkpoint.
        period_id: AccountingPeriodId,
        /// The checkpoint total.
        balance: Decimal,
    },

    // ========== Sequencing Conflicts ==========
    /// Event sequences start at one.
    #[error("Event sequence must be positive, got {sequence} on {date}")]
    InvalidEventSequence {
        /// Event date.
        date: NaiveDate,
        /// Offending sequence.
        sequence: u32,
    },

    /// Another event of the period already uses this (date, sequence).
    #[error("Period {period_id} already has an event with sequence {sequence} on {date}")]
    DuplicateEventSequence {
        /// The owning period.
        period_id: AccountingPeriodId,
        /// Event date.
        date: NaiveDate,
        /// Duplicated sequence.
        sequence: u32,
    },

    /// Event dated before the account existed.
    #[error("Event on {date} predates account {account_id}, added on {added_date}")]
    EventBeforeAccountAdded {
        /// The account.
        account_id: AccountId,
        /// Event date.
        date: NaiveDate,
        /// Date of the account's AccountAdded event.
        added_date: NaiveDate,
    },

    /// Event owned by a period that precedes the account's own first period.
    #[error("Account {account_id} was added in {added_year}-{added_month:02}, after the event's period")]
    EventPeriodBeforeAccountAdded {
        /// The account.
        account_id: AccountId,
        /// Year of the period owning the AccountAdded event.
        added_year: i32,
        /// Month of the period owning the AccountAdded event.
        added_month: u32,
    },

    /// Posting date earlier than the transaction date.
    #[error("Posted date {posted_date} is before transaction date {transaction_date}")]
    PostedBeforeTransactionDate {
        /// Requested posting date.
        posted_date: NaiveDate,
        /// Transaction date.
        transaction_date: NaiveDate,
    },

    // ========== Period State Violations ==========
    /// The period is closed.
    #[error("Accounting period {0} is closed")]
    PeriodClosed(AccountingPeriodId),

    /// A period for this month already exists.
    #[error("Accounting period {year}-{month:02} already exists")]
    DuplicatePeriod {
        /// Year.
        year: i32,
        /// Month.
        month: u32,
    },

    /// A new period must directly follow the latest one.
    #[error("Accounting period {year}-{month:02} must follow the latest period {latest_year}-{latest_month:02}")]
    NonContiguousPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
        /// Year of the latest existing period.
        latest_year: i32,
        /// Month of the latest existing period.
        latest_month: u32,
    },

    /// An earlier period is still open.
    #[error("Accounting period {period_id} cannot close while {earlier_id} is open")]
    EarlierPeriodOpen {
        /// The period being closed.
        period_id: AccountingPeriodId,
        /// The earlier open period.
        earlier_id: AccountingPeriodId,
    },

    /// A transaction side of the period is not posted yet.
    #[error("Transaction {transaction_id} is not posted for account {account_id}")]
    UnpostedTransaction {
        /// The transaction.
        transaction_id: TransactionId,
        /// The unposted side's account.
        account_id: AccountId,
    },

    /// An account still has pending amounts at the end of the period.
    #[error("Account {account_id} has pending balance changes at the end of period {period_id}")]
    PendingBalanceAtClose {
        /// The account.
        account_id: AccountId,
        /// The period being closed.
        period_id: AccountingPeriodId,
    },

    /// Only the latest period may be deleted.
    #[error("Accounting period {0} is not the latest period")]
    PeriodNotLatest(AccountingPeriodId),

    /// The period still owns transactions.
    #[error("Accounting period {0} has transactions")]
    PeriodHasTransactions(AccountingPeriodId),

    /// The period still owns balance events.
    #[error("Accounting period {0} has balance events")]
    PeriodHasBalanceEvents(AccountingPeriodId),

    /// Event date too far from the owning period's month.
    #[error("Date {date} is outside the window of period {year}-{month:02}")]
    DateOutsidePeriodWindow {
        /// The date.
        date: NaiveDate,
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// A cascade would rewrite history owned by a closed period.
    #[error("Change would rewrite balance history of account {account_id} owned by closed period {period_id}")]
    ClosedHistoryAffected {
        /// The account.
        account_id: AccountId,
        /// The event owning the affected row.
        event_id: BalanceEventId,
        /// The closed period.
        period_id: AccountingPeriodId,
    },

    /// The period already holds a checkpoint for the account.
    #[error("Period {period_id} already has a checkpoint for account {account_id}")]
    DuplicateCheckpoint {
        /// The account.
        account_id: AccountId,
        /// The period.
        period_id: AccountingPeriodId,
    },

    /// Posted transactions cannot change.
    #[error("Transaction {0} is posted and cannot be modified")]
    CannotModifyPosted(TransactionId),

    /// The account's side of the transaction is already posted.
    #[error("Transaction {transaction_id} is already posted for account {account_id}")]
    AlreadyPosted {
        /// The transaction.
        transaction_id: TransactionId,
        /// The account.
        account_id: AccountId,
    },

    // ========== Referential Violations ==========
    /// Fund not found.
    #[error("Fund not found: {0}")]
    FundNotFound(FundId),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Accounting period not found.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(AccountingPeriodId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Balance event not found.
    #[error("Balance event not found: {0}")]
    BalanceEventNotFound(BalanceEventId),

    /// Event applied to a balance of an account it does not touch.
    #[error("Balance event {event_id} does not affect account {account_id}")]
    EventDoesNotAffectAccount {
        /// The event.
        event_id: BalanceEventId,
        /// The account.
        account_id: AccountId,
    },

    /// The account is not a side of the transaction.
    #[error("Account {account_id} is not part of transaction {transaction_id}")]
    AccountNotInTransaction {
        /// The transaction.
        transaction_id: TransactionId,
        /// The account.
        account_id: AccountId,
    },

    // ========== Invalid Input ==========
    /// Year or month outside the accepted range.
    #[error("Invalid accounting period {year}-{month}")]
    InvalidPeriod {
        /// Year.
        year: i32,
        /// Month.
        month: u32,
    },

    /// Names must not be blank.
    #[error("Name cannot be blank")]
    BlankName,

    /// Fund names are unique.
    #[error("A fund named {0:?} already exists")]
    DuplicateFundName(String),

    /// Account names are unique.
    #[error("An account named {0:?} already exists")]
    DuplicateAccountName(String),

    /// A transaction needs a debit or a credit account.
    #[error("Transaction must have a debit or a credit account")]
    NoTransactionAccounts,

    /// Debit and credit must be different accounts.
    #[error("Account {0} cannot be both debit and credit")]
    SameDebitAndCredit(AccountId),

    /// No amounts were given.
    #[error("At least one fund amount is required")]
    NoEntries,

    /// Amount must be greater than zero.
    #[error("Amount for fund {fund_id} must be positive, got {amount}")]
    NonPositiveAmount {
        /// The fund.
        fund_id: FundId,
        /// Offending amount.
        amount: Decimal,
    },

    /// A fund appears twice in the same amount list.
    #[error("Fund {0} appears more than once")]
    DuplicateFundEntry(FundId),

    /// A change in value of zero changes nothing.
    #[error("Change in value amount cannot be zero")]
    ZeroChangeInValue,

    /// A conversion needs two different funds.
    #[error("Cannot convert fund {0} into itself")]
    SameFundConversion(FundId),

    /// Range start after range end.
    #[error("Date range start {from} is after end {to}")]
    InvalidDateRange {
        /// Start date.
        from: NaiveDate,
        /// End date.
        to: NaiveDate,
    },

    /// Only events applied directly to fund balances can be reversed.
    #[error("Balance event {0} cannot be reversed in place")]
    NotReversible(BalanceEventId),

    /// Only fund conversions and changes in value are deleted on their own.
    #[error("Balance event {0} cannot be deleted on its own")]
    CannotDeleteBalanceEvent(BalanceEventId),

    // ========== Internal ==========
    /// An applied event has no history row for the account.
    #[error("Missing balance history for event {event_id} on account {account_id}")]
    MissingHistoryRow {
        /// The account.
        account_id: AccountId,
        /// The event.
        event_id: BalanceEventId,
    },

    /// A history row points to an event that no period owns.
    #[error("Balance history of account {account_id} references unknown event {event_id}")]
    OrphanedHistoryRow {
        /// The account.
        account_id: AccountId,
        /// The missing event.
        event_id: BalanceEventId,
    },
}

impl LedgerError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NegativePostedBalance { .. }
            | Self::NegativeAvailableToSpend { .. }
            | Self::InsufficientBalance { .. }
            | Self::InsufficientFundBalance { .. }
            | Self::NegativePendingAmount { .. }
            | Self::NegativeCheckpoint { .. } => ErrorKind::InvariantViolation,

            Self::InvalidEventSequence { .. }
            | Self::DuplicateEventSequence { .. }
            | Self::EventBeforeAccountAdded { .. }
            | Self::EventPeriodBeforeAccountAdded { .. }
            | Self::PostedBeforeTransactionDate { .. } => ErrorKind::SequencingConflict,

            Self::PeriodClosed(_)
            | Self::DuplicatePeriod { .. }
            | Self::NonContiguousPeriod { .. }
            | Self::EarlierPeriodOpen { .. }
            | Self::UnpostedTransaction { .. }
            | Self::PendingBalanceAtClose { .. }
            | Self::PeriodNotLatest(_)
            | Self::PeriodHasTransactions(_)
            | Self::PeriodHasBalanceEvents(_)
            | Self::DateOutsidePeriodWindow { .. }
            | Self::ClosedHistoryAffected { .. }
            | Self::DuplicateCheckpoint { .. }
            | Self::CannotModifyPosted(_)
            | Self::AlreadyPosted { .. } => ErrorKind::PeriodStateViolation,

            Self::FundNotFound(_)
            | Self::AccountNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::BalanceEventNotFound(_)
            | Self::EventDoesNotAffectAccount { .. }
            | Self::AccountNotInTransaction { .. } => ErrorKind::ReferentialViolation,

            Self::InvalidPeriod { .. }
            | Self::BlankName
            | Self::DuplicateFundName(_)
            | Self::DuplicateAccountName(_)
            | Self::NoTransactionAccounts
            | Self::SameDebitAndCredit(_)
            | Self::NoEntries
            | Self::NonPositiveAmount { .. }
            | Self::DuplicateFundEntry(_)
            | Self::ZeroChangeInValue
            | Self::SameFundConversion(_)
            | Self::InvalidDateRange { .. }
            | Self::NotReversible(_)
            | Self::CannotDeleteBalanceEvent(_) => ErrorKind::InvalidInput,

            Self::MissingHistoryRow { .. } | Self::OrphanedHistoryRow { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativePostedBalance { .. } => "NEGATIVE_POSTED_BALANCE",
            Self::NegativeAvailableToSpend { .. } => "NEGATIVE_AVAILABLE_TO_SPEND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InsufficientFundBalance { .. } => "INSUFFICIENT_FUND_BALANCE",
            Self::NegativePendingAmount { .. } => "NEGATIVE_PENDING_AMOUNT",
            Self::NegativeCheckpoint { .. } => "NEGATIVE_CHECKPOINT",
            Self::InvalidEventSequence { .. } => "INVALID_EVENT_SEQUENCE",
            Self::DuplicateEventSequence { .. } => "DUPLICATE_EVENT_SEQUENCE",
            Self::EventBeforeAccountAdded { .. } => "EVENT_BEFORE_ACCOUNT_ADDED",
            Self::EventPeriodBeforeAccountAdded { .. } => "EVENT_PERIOD_BEFORE_ACCOUNT_ADDED",
            Self::PostedBeforeTransactionDate { .. } => "POSTED_BEFORE_TRANSACTION_DATE",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::DuplicatePeriod { .. } => "DUPLICATE_PERIOD",
            Self::NonContiguousPeriod { .. } => "NON_CONTIGUOUS_PERIOD",
            Self::EarlierPeriodOpen { .. } => "EARLIER_PERIOD_OPEN",
            Self::UnpostedTransaction { .. } => "UNPOSTED_TRANSACTION",
            Self::PendingBalanceAtClose { .. } => "PENDING_BALANCE_AT_CLOSE",
            Self::PeriodNotLatest(_) => "PERIOD_NOT_LATEST",
            Self::PeriodHasTransactions(_) => "PERIOD_HAS_TRANSACTIONS",
            Self::PeriodHasBalanceEvents(_) => "PERIOD_HAS_BALANCE_EVENTS",
            Self::DateOutsidePeriodWindow { .. } => "DATE_OUTSIDE_PERIOD_WINDOW",
            Self::ClosedHistoryAffected { .. } => "CLOSED_HISTORY_AFFECTED",
            Self::DuplicateCheckpoint { .. } => "DUPLICATE_CHECKPOINT",
            Self::CannotModifyPosted(_) => "CANNOT_MODIFY_POSTED",
            Self::AlreadyPosted { .. } => "ALREADY_POSTED",
            Self::FundNotFound(_) => "FUND_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::BalanceEventNotFound(_) => "BALANCE_EVENT_NOT_FOUND",
            Self::EventDoesNotAffectAccount { .. } => "EVENT_DOES_NOT_AFFECT_ACCOUNT",
            Self::AccountNotInTransaction { .. } => "ACCOUNT_NOT_IN_TRANSACTION",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::BlankName => "BLANK_NAME",
            Self::DuplicateFundName(_) => "DUPLICATE_FUND_NAME",
            Self::DuplicateAccountName(_) => "DUPLICATE_ACCOUNT_NAME",
            Self::NoTransactionAccounts => "NO_TRANSACTION_ACCOUNTS",
            Self::SameDebitAndCredit(_) => "SAME_DEBIT_AND_CREDIT",
            Self::NoEntries => "NO_ENTRIES",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::DuplicateFundEntry(_) => "DUPLICATE_FUND_ENTRY",
            Self::ZeroChangeInValue => "ZERO_CHANGE_IN_VALUE",
            Self::SameFundConversion(_) => "SAME_FUND_CONVERSION",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::NotReversible(_) => "NOT_REVERSIBLE",
            Self::CannotDeleteBalanceEvent(_) => "CANNOT_DELETE_BALANCE_EVENT",
            Self::MissingHistoryRow { .. } => "MISSING_HISTORY_ROW",
            Self::OrphanedHistoryRow { .. } => "ORPHANED_HISTORY_ROW",
        }
    }
}

/// Every error found while validating one mutation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<LedgerError>);

/// Result type of every mutation entry point.
pub type LedgerResult<T> = Result<T, Violations>;

impl Violations {
    /// Returns `Ok(())` when `errors` is empty, otherwise wraps them.
    pub fn check(errors: Vec<LedgerError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    /// The collected errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[LedgerError] {
        &self.0
    }

    /// Consumes the wrapper, returning the errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<LedgerError> {
        self.0
    }

    /// Returns true if any collected error has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|error| error.kind() == kind)
    }

    /// Error codes of the collected errors.
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.0.iter().map(LedgerError::error_code).collect()
    }

    /// Appends the errors of `other` that are not already collected.
    pub fn extend(&mut self, other: Self) {
        for error in other.0 {
            if !self.0.contains(&error) {
                self.0.push(error);
            }
        }
    }
}

impl From<LedgerError> for Violations {
    fn from(error: LedgerError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

/// Fails with `errors` plus the `error` that stopped validation.
pub(crate) fn fail<T>(mut errors: Vec<LedgerError>, error: LedgerError) -> LedgerResult<T> {
    errors.push(error);
    Err(Violations(errors))
}

/// Merges the outcomes of independent plans, keeping every error.
pub(crate) fn combine<A, B>(first: LedgerResult<A>, second: LedgerResult<B>) -> LedgerResult<(A, B)> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(errors), Ok(_)) | (Ok(_), Err(errors)) => Err(errors),
        (Err(mut errors), Err(more)) => {
            errors.extend(more);
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NoEntries.error_code(), "NO_ENTRIES");
        assert_eq!(
            LedgerError::PeriodClosed(AccountingPeriodId::new()).error_code(),
            "PERIOD_CLOSED"
        );
        assert_eq!(
            LedgerError::FundNotFound(FundId::new()).error_code(),
            "FUND_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_kinds() {
        let account_id = AccountId::new();
        assert_eq!(
            LedgerError::NegativePostedBalance {
                account_id,
                posted_balance: dec!(-200.00),
            }
            .kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            LedgerError::DuplicateEventSequence {
                period_id: AccountingPeriodId::new(),
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                sequence: 1,
            }
            .kind(),
            ErrorKind::SequencingConflict
        );
        assert_eq!(
            LedgerError::PeriodNotLatest(AccountingPeriodId::new()).kind(),
            ErrorKind::PeriodStateViolation
        );
        assert_eq!(
            LedgerError::AccountNotFound(account_id).kind(),
            ErrorKind::ReferentialViolation
        );
        assert_eq!(LedgerError::ZeroChangeInValue.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            LedgerError::OrphanedHistoryRow {
                account_id,
                event_id: BalanceEventId::new(),
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::DuplicatePeriod { year: 2025, month: 3 };
        assert_eq!(err.to_string(), "Accounting period 2025-03 already exists");

        let err = LedgerError::InvalidDateRange {
            from: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Date range start 2025-02-01 is after end 2025-01-01"
        );
    }

    #[test]
    fn test_violations_check() {
        assert!(Violations::check(vec![]).is_ok());

        let violations = Violations::check(vec![LedgerError::NoEntries, LedgerError::BlankName])
            .unwrap_err();
        assert_eq!(violations.codes(), vec!["NO_ENTRIES", "BLANK_NAME"]);
        assert!(violations.has_kind(ErrorKind::InvalidInput));
        assert!(!violations.has_kind(ErrorKind::Internal));
        assert_eq!(violations.to_string(), "At least one fund amount is required; Name cannot be blank");
    }

    #[test]
    fn test_combine_keeps_all_errors() {
        let first: LedgerResult<()> = Err(LedgerError::NoEntries.into());
        let second: LedgerResult<()> = Err(LedgerError::BlankName.into());
        let combined = combine(first, second).unwrap_err();
        assert_eq!(combined.errors().len(), 2);

        let ok: LedgerResult<(u8, u8)> = combine(Ok(1), Ok(2));
        assert_eq!(ok, Ok((1, 2)));
    }

    #[test]
    fn test_extend_skips_errors_already_collected() {
        let account_id = AccountId::new();
        let insufficient = LedgerError::InsufficientBalance {
            account_id,
            available: dec!(20),
            requested: dec!(50),
        };
        let mut violations = Violations::from(insufficient.clone());

        violations.extend(Violations::check(vec![insufficient, LedgerError::NoEntries]).unwrap_err());

        assert_eq!(violations.codes(), vec!["INSUFFICIENT_BALANCE", "NO_ENTRIES"]);
    }
}
