//! Accounting period aggregate.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use fundledger_shared::types::{AccountId, AccountingPeriodId, BalanceEventId, TransactionId};
use serde::{Deserialize, Serialize};

use super::checkpoint::AccountBalanceCheckpoint;
use crate::error::{LedgerError, LedgerResult, Violations};
use crate::events::BalanceEvent;
use crate::transaction::Transaction;

/// Calendar month identifying an accounting period. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl PeriodKey {
    /// Creates a key, rejecting months outside 1-12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The preceding month.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Whole months from `self` to `other`, negative when `other` is earlier.
    #[must_use]
    pub fn months_until(self, other: Self) -> i64 {
        (i64::from(other.year) - i64::from(self.year)) * 12 + i64::from(other.month)
            - i64::from(self.month)
    }

    /// Returns true if `date` lies at most `window` months away from this month.
    #[must_use]
    pub fn is_within_window(self, date: NaiveDate, window: u32) -> bool {
        self.months_until(Self::of_date(date)).unsigned_abs() <= u64::from(window)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A month-long container owning the transactions, balance events and
/// checkpoints that fall within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: AccountingPeriodId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    is_open: bool,
    transactions: Vec<Transaction>,
    events: Vec<BalanceEvent>,
    checkpoints: Vec<AccountBalanceCheckpoint>,
}

impl AccountingPeriod {
    /// Creates an open, empty period.
    #[must_use]
    pub fn new(key: PeriodKey) -> Self {
        Self {
            id: AccountingPeriodId::new(),
            year: key.year,
            month: key.month,
            is_open: true,
            transactions: Vec::new(),
            events: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    /// The period's month.
    #[must_use]
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            year: self.year,
            month: self.month,
        }
    }

    /// Returns true while events may still be added, edited or removed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Transactions owned by the period.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Balance events owned by the period, in insertion order.
    #[must_use]
    pub fn events(&self) -> &[BalanceEvent] {
        &self.events
    }

    /// Balance events ordered by (date, sequence).
    #[must_use]
    pub fn events_in_order(&self) -> Vec<&BalanceEvent> {
        let mut events: Vec<&BalanceEvent> = self.events.iter().collect();
        events.sort_by_key(|event| (event.date, event.sequence));
        events
    }

    /// Checkpoints recording account balances at the start of the period.
    #[must_use]
    pub fn checkpoints(&self) -> &[AccountBalanceCheckpoint] {
        &self.checkpoints
    }

    /// The checkpoint for `account_id`, if one was written.
    #[must_use]
    pub fn checkpoint_for(&self, account_id: AccountId) -> Option<&AccountBalanceCheckpoint> {
        self.checkpoints
            .iter()
            .find(|checkpoint| checkpoint.account_id == account_id)
    }

    /// Looks up an owned event.
    #[must_use]
    pub fn find_event(&self, event_id: BalanceEventId) -> Option<&BalanceEvent> {
        self.events.iter().find(|event| event.id == event_id)
    }

    /// Looks up an owned transaction.
    #[must_use]
    pub fn find_transaction(&self, transaction_id: TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| transaction.id == transaction_id)
    }

    /// Next free sequence for events dated `date`.
    ///
    /// Sequences are shared by every event kind in the period.
    #[must_use]
    pub fn next_event_sequence(&self, date: NaiveDate) -> u32 {
        self.events
            .iter()
            .filter(|event| event.date == date)
            .map(|event| event.sequence)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Takes ownership of a new event.
    pub fn add_event(&mut self, event: BalanceEvent) -> LedgerResult<()> {
        let mut errors = self.event_errors(&event);
        if self
            .events
            .iter()
            .any(|existing| existing.date == event.date && existing.sequence == event.sequence)
        {
            errors.push(LedgerError::DuplicateEventSequence {
                period_id: self.id,
                date: event.date,
                sequence: event.sequence,
            });
        }
        Violations::check(errors)?;
        self.events.push(event);
        Ok(())
    }

    /// Swaps an owned event for an edited copy with the same id.
    pub fn replace_event(&mut self, event: BalanceEvent) -> LedgerResult<()> {
        Violations::check(self.event_errors(&event))?;
        let slot = self
            .events
            .iter_mut()
            .find(|existing| existing.id == event.id)
            .ok_or(LedgerError::BalanceEventNotFound(event.id))?;
        *slot = event;
        Ok(())
    }

    /// Removes an owned event.
    pub fn remove_event(&mut self, event_id: BalanceEventId) -> LedgerResult<BalanceEvent> {
        self.ensure_open()?;
        let index = self
            .events
            .iter()
            .position(|event| event.id == event_id)
            .ok_or(LedgerError::BalanceEventNotFound(event_id))?;
        Ok(self.events.remove(index))
    }

    /// Takes ownership of a new transaction.
    pub fn add_transaction(&mut self, transaction: Transaction) -> LedgerResult<()> {
        self.ensure_open()?;
        self.transactions.push(transaction);
        Ok(())
    }

    /// Swaps an owned transaction for an edited copy with the same id.
    pub fn replace_transaction(&mut self, transaction: Transaction) -> LedgerResult<()> {
        self.ensure_open()?;
        let slot = self
            .transactions
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
            .ok_or(LedgerError::TransactionNotFound(transaction.id))?;
        *slot = transaction;
        Ok(())
    }

    /// Removes an owned transaction.
    pub fn remove_transaction(&mut self, transaction_id: TransactionId) -> LedgerResult<Transaction> {
        self.ensure_open()?;
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id == transaction_id)
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
        Ok(self.transactions.remove(index))
    }

    /// Records the balance an account starts the period with.
    pub fn add_checkpoint(&mut self, checkpoint: AccountBalanceCheckpoint) -> Result<(), LedgerError> {
        if self.checkpoint_for(checkpoint.account_id).is_some() {
            return Err(LedgerError::DuplicateCheckpoint {
                account_id: checkpoint.account_id,
                period_id: self.id,
            });
        }
        self.checkpoints.push(checkpoint);
        Ok(())
    }

    pub(crate) fn close(&mut self) {
        self.is_open = false;
    }

    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.is_open {
            Ok(())
        } else {
            Err(LedgerError::PeriodClosed(self.id))
        }
    }

    fn event_errors(&self, event: &BalanceEvent) -> Vec<LedgerError> {
        let mut errors = Vec::new();
        if let Err(error) = self.ensure_open() {
            errors.push(error);
        }
        if event.period_id != self.id {
            errors.push(LedgerError::PeriodNotFound(event.period_id));
        }
        if event.sequence == 0 {
            errors.push(LedgerError::InvalidEventSequence {
                date: event.date,
                sequence: event.sequence,
            });
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BalanceEventKind;
    use fundledger_shared::types::{FundAmount, FundId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn change_in_value(period: &AccountingPeriod, on: NaiveDate) -> BalanceEvent {
        BalanceEvent::new(
            period,
            on,
            BalanceEventKind::ChangeInValue {
                account_id: AccountId::new(),
                entry: FundAmount::new(FundId::new(), dec!(10)),
            },
        )
    }

    #[test]
    fn test_period_key_navigation() {
        let december = PeriodKey::new(2024, 12).unwrap();
        assert_eq!(december.next(), PeriodKey::new(2025, 1).unwrap());
        assert_eq!(december.next().previous(), december);
        assert_eq!(december.months_until(PeriodKey::new(2025, 3).unwrap()), 3);
        assert_eq!(PeriodKey::new(2025, 3).unwrap().months_until(december), -3);
        assert!(PeriodKey::new(2025, 13).is_none());
        assert!(PeriodKey::new(2025, 0).is_none());
        assert_eq!(december.to_string(), "2024-12");
    }

    #[test]
    fn test_period_key_window() {
        let january = PeriodKey::new(2025, 1).unwrap();
        assert!(january.is_within_window(date(2025, 1, 31), 1));
        assert!(january.is_within_window(date(2024, 12, 1), 1));
        assert!(january.is_within_window(date(2025, 2, 28), 1));
        assert!(!january.is_within_window(date(2025, 3, 1), 1));
        assert!(!january.is_within_window(date(2024, 12, 31), 0));
    }

    #[test]
    fn test_next_event_sequence_is_per_date() {
        let mut period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let jan_10 = date(2025, 1, 10);
        assert_eq!(period.next_event_sequence(jan_10), 1);

        period.add_event(change_in_value(&period, jan_10)).unwrap();
        period.add_event(change_in_value(&period, jan_10)).unwrap();
        period.add_event(change_in_value(&period, date(2025, 1, 11))).unwrap();

        assert_eq!(period.next_event_sequence(jan_10), 3);
        assert_eq!(period.next_event_sequence(date(2025, 1, 11)), 2);
        assert_eq!(period.next_event_sequence(date(2025, 1, 12)), 1);
    }

    #[test]
    fn test_next_event_sequence_skips_gaps() {
        let mut period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let jan_10 = date(2025, 1, 10);
        let first = change_in_value(&period, jan_10);
        period.add_event(first.clone()).unwrap();
        period.add_event(change_in_value(&period, jan_10)).unwrap();
        period.remove_event(first.id).unwrap();

        assert_eq!(period.next_event_sequence(jan_10), 3);
    }

    #[test]
    fn test_add_event_rejects_duplicate_sequence() {
        let mut period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let event = change_in_value(&period, date(2025, 1, 10));
        let mut duplicate = change_in_value(&period, date(2025, 1, 10));
        duplicate.sequence = event.sequence;
        period.add_event(event).unwrap();

        let err = period.add_event(duplicate).unwrap_err();
        assert_eq!(err.codes(), vec!["DUPLICATE_EVENT_SEQUENCE"]);
    }

    #[test]
    fn test_closed_period_rejects_changes() {
        let mut period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let mut event = change_in_value(&period, date(2025, 1, 10));
        period.close();
        event.sequence = 0;

        let err = period.add_event(event).unwrap_err();
        assert_eq!(err.codes(), vec!["PERIOD_CLOSED", "INVALID_EVENT_SEQUENCE"]);
    }

    #[test]
    fn test_events_in_order() {
        let mut period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let late = change_in_value(&period, date(2025, 1, 20));
        period.add_event(late.clone()).unwrap();
        let early = change_in_value(&period, date(2025, 1, 5));
        period.add_event(early.clone()).unwrap();

        let ordered: Vec<_> = period.events_in_order().iter().map(|e| e.id).collect();
        assert_eq!(ordered, vec![early.id, late.id]);
    }
}
