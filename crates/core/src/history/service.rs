//! Planning of history cascades.
//!
//! Each `try_*` function reads the account's history, replays the affected
//! rows and returns the resulting [`HistoryChangeSet`] without writing
//! anything. Callers commit the plans of every affected account together, and
//! only once all of them succeeded.

use std::collections::HashMap;

use fundledger_shared::types::{AccountingPeriodId, BalanceEventId};
use tracing::debug;

use super::cascade::{ReplayStep, replay_forward};
use super::types::{AccountBalanceHistory, HistoryChangeSet, HistoryKey};
use crate::account::Account;
use crate::balance::AccountBalance;
use crate::error::{LedgerError, LedgerResult, Violations, combine};
use crate::events::BalanceEvent;
use crate::store::LedgerStore;

/// Keeps per-account balance history consistent under retroactive changes.
pub struct AccountBalanceHistoryService;

impl AccountBalanceHistoryService {
    /// Plans the rows for a newly applied event.
    ///
    /// The new row goes after every existing row of the event's date, and
    /// every row on a later date is replayed on top of it. Errors of the new
    /// event and of every later row are reported together.
    pub fn try_add_new_balance_history<S>(
        store: &S,
        account: &Account,
        event: &BalanceEvent,
    ) -> LedgerResult<HistoryChangeSet>
    where
        S: LedgerStore + ?Sized,
    {
        let key = HistoryKey::new(event.date, store.next_sequence(account.id, event.date));

        let predecessor = Self::balance_before(store, account, key);
        let (start, applied) = Self::apply_new(event, &predecessor);

        let future = store.find_from(account.id, key);
        let replayed =
            Self::replay_steps(store, future, |row| row.sequence).and_then(|steps| replay_forward(&start, &steps));
        let ((), updated) = combine(applied, replayed)?;

        debug!(
            account_id = %account.id,
            event_id = %event.id,
            key = %key,
            rewritten = updated.len(),
            "planned balance history insert"
        );

        Ok(HistoryChangeSet {
            added: vec![AccountBalanceHistory::from_balance(event.id, key, &start)],
            updated,
            deleted: Vec::new(),
        })
    }

    /// Plans the rows after `event` was edited in place.
    ///
    /// The edited row keeps its key; it and every later row are replayed.
    pub fn try_update_existing_balance_history<S>(
        store: &S,
        account: &Account,
        event: &BalanceEvent,
    ) -> LedgerResult<HistoryChangeSet>
    where
        S: LedgerStore + ?Sized,
    {
        let row = Self::row_for(store, account, event.id)?;
        let key = row.key();

        let predecessor = Self::balance_before(store, account, key);
        let (start, applied) = Self::apply_new(event, &predecessor);

        let future = Self::rows_after(store, &row);
        let replayed =
            Self::replay_steps(store, future, |row| row.sequence).and_then(|steps| replay_forward(&start, &steps));
        let ((), mut updated) = combine(applied, replayed)?;

        let edited = row.rewritten(row.sequence, &start);
        if edited != row {
            updated.insert(0, edited);
        }

        debug!(
            account_id = %account.id,
            event_id = %event.id,
            key = %key,
            rewritten = updated.len(),
            "planned balance history update"
        );

        Ok(HistoryChangeSet {
            added: Vec::new(),
            updated,
            deleted: Vec::new(),
        })
    }

    /// Plans the rows after the event `event_id` is removed.
    ///
    /// Later rows on the same date shift down by one; every later row is
    /// replayed from the balance before the removed row.
    pub fn try_delete_existing_balance_history<S>(
        store: &S,
        account: &Account,
        event_id: BalanceEventId,
    ) -> LedgerResult<HistoryChangeSet>
    where
        S: LedgerStore + ?Sized,
    {
        let row = Self::row_for(store, account, event_id)?;
        let key = row.key();

        let predecessor = Self::balance_before(store, account, key);
        let future = Self::rows_after(store, &row);
        let steps = Self::replay_steps(store, future, |later| {
            if later.date == key.date {
                later.sequence - 1
            } else {
                later.sequence
            }
        })?;
        let updated = replay_forward(&predecessor, &steps)?;

        debug!(
            account_id = %account.id,
            event_id = %event_id,
            key = %key,
            rewritten = updated.len(),
            "planned balance history delete"
        );

        Ok(HistoryChangeSet {
            added: Vec::new(),
            updated,
            deleted: vec![row.id],
        })
    }

    /// Balance in effect just before `key`; zero before the first row.
    pub fn balance_before<S>(store: &S, account: &Account, key: HistoryKey) -> AccountBalance
    where
        S: LedgerStore + ?Sized,
    {
        store
            .find_latest_before(account.id, key)
            .map_or_else(
                || AccountBalance::zero(account.id, account.account_type),
                |row| row.balance(account.account_type),
            )
    }

    fn apply_new(event: &BalanceEvent, predecessor: &AccountBalance) -> (AccountBalance, LedgerResult<()>) {
        match event.apply_to_balance(predecessor) {
            Ok(balance) => (balance, Ok(())),
            Err(violations) => (event.apply_unchecked(predecessor), Err(violations)),
        }
    }

    fn row_for<S>(store: &S, account: &Account, event_id: BalanceEventId) -> Result<AccountBalanceHistory, LedgerError>
    where
        S: LedgerStore + ?Sized,
    {
        store
            .find_by_event(account.id, event_id)
            .ok_or(LedgerError::MissingHistoryRow {
                account_id: account.id,
                event_id,
            })
    }

    fn rows_after<S>(store: &S, row: &AccountBalanceHistory) -> Vec<AccountBalanceHistory>
    where
        S: LedgerStore + ?Sized,
    {
        store
            .find_from(row.account_id, row.key())
            .into_iter()
            .filter(|later| later.id != row.id)
            .collect()
    }

    fn replay_steps<S, F>(
        store: &S,
        rows: Vec<AccountBalanceHistory>,
        sequence_of: F,
    ) -> LedgerResult<Vec<ReplayStep>>
    where
        S: LedgerStore + ?Sized,
        F: Fn(&AccountBalanceHistory) -> u32,
    {
        let mut open_periods: HashMap<AccountingPeriodId, bool> = HashMap::new();
        let mut steps = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();

        for row in rows {
            let Some(event) = store.find_balance_event(row.event_id) else {
                errors.push(LedgerError::OrphanedHistoryRow {
                    account_id: row.account_id,
                    event_id: row.event_id,
                });
                continue;
            };
            let is_open = *open_periods.entry(event.period_id).or_insert_with(|| {
                store
                    .find_period(event.period_id)
                    .is_some_and(|period| period.is_open())
            });
            steps.push(ReplayStep {
                sequence: sequence_of(&row),
                closed_period: (!is_open).then_some(event.period_id),
                row,
                event,
            });
        }

        Violations::check(errors)?;
        Ok(steps)
    }
}
