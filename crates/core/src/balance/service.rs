//! Balance queries.
//!
//! Point-in-time queries read a single history row. Period queries start from
//! the nearest checkpoint and replay period-owned events from there, so their
//! cost is bounded by the events since the last close.

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, AccountingPeriodId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account_balance::AccountBalance;
use crate::account::Account;
use crate::error::{LedgerError, LedgerResult, Violations};
use crate::events::validation::{load_account, load_period};
use crate::history::{AccountBalanceHistoryService, HistoryKey};
use crate::period::AccountingPeriod;
use crate::store::LedgerStore;

/// An account's balance at both ends of an accounting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceByAccountingPeriod {
    /// The account.
    pub account_id: AccountId,
    /// The period.
    pub period_id: AccountingPeriodId,
    /// Balance before any event of the period.
    pub starting_balance: AccountBalance,
    /// Balance after every event of the period.
    pub ending_balance: AccountBalance,
}

/// Read-side queries over balance history and checkpoints.
pub struct AccountBalanceService;

impl AccountBalanceService {
    /// Balance after the account's most recent event.
    pub fn current_balance<S>(store: &S, account_id: AccountId) -> LedgerResult<AccountBalance>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        Ok(store.find_latest(account_id).map_or_else(
            || AccountBalance::zero(account.id, account.account_type),
            |row| row.balance(account.account_type),
        ))
    }

    /// Balance right after the row at (`date`, `sequence`), inclusive.
    pub fn balance_as_of<S>(
        store: &S,
        account_id: AccountId,
        date: NaiveDate,
        sequence: u32,
    ) -> LedgerResult<AccountBalance>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        let key = HistoryKey::new(date, sequence.saturating_add(1));
        Ok(AccountBalanceHistoryService::balance_before(store, &account, key))
    }

    /// Balance after every event dated on or before `date`.
    pub fn balance_at_end_of<S>(store: &S, account_id: AccountId, date: NaiveDate) -> LedgerResult<AccountBalance>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        Ok(Self::end_of_day(store, &account, date))
    }

    /// End-of-day balance for each date from `from` to `to`, inclusive.
    pub fn balances_by_date_range<S>(
        store: &S,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<Vec<(NaiveDate, AccountBalance)>>
    where
        S: LedgerStore + ?Sized,
    {
        if from > to {
            return Err(LedgerError::InvalidDateRange { from, to }.into());
        }
        let account = load_account(store, account_id)?;

        let mut running =
            AccountBalanceHistoryService::balance_before(store, &account, HistoryKey::start_of(from));
        let mut rows = store
            .find_from(account.id, HistoryKey::start_of(from))
            .into_iter()
            .peekable();

        let mut balances = Vec::new();
        for day in from.iter_days().take_while(|day| *day <= to) {
            while let Some(row) = rows.next_if(|row| row.date == day) {
                running = row.balance(account.account_type);
            }
            balances.push((day, running.clone()));
        }
        Ok(balances)
    }

    /// Starting and ending balance of the account for one period.
    ///
    /// The starting balance is the period's checkpoint when it has one,
    /// otherwise the previous period's ending balance. The ending balance is
    /// the next period's checkpoint when it has one, otherwise the starting
    /// balance with the period's own events replayed in (date, sequence) order.
    pub fn balance_by_accounting_period<S>(
        store: &S,
        account_id: AccountId,
        period_id: AccountingPeriodId,
    ) -> LedgerResult<AccountBalanceByAccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        let period = load_period(store, period_id)?;
        let periods = Self::sorted_periods(store);
        let index = periods
            .iter()
            .position(|candidate| candidate.id == period.id)
            .ok_or(LedgerError::PeriodNotFound(period_id))?;

        let starting_balance = Self::starting_balance_at(&periods, index, &account);
        let ending_balance = match periods
            .get(index + 1)
            .and_then(|next| next.checkpoint_for(account.id))
        {
            Some(checkpoint) => checkpoint.starting_balance(account.account_type),
            None => Self::replay_period(&periods[index], &account, starting_balance.clone()),
        };

        Ok(AccountBalanceByAccountingPeriod {
            account_id,
            period_id,
            starting_balance,
            ending_balance,
        })
    }

    /// Recomputes the current balance by re-applying every event from the
    /// account's AccountAdded event, in history order, checking each step.
    pub fn replay_from_inception<S>(store: &S, account_id: AccountId) -> LedgerResult<AccountBalance>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        let mut balance = AccountBalance::zero(account.id, account.account_type);
        for row in store.find_all_for_account(account.id) {
            let event = store
                .find_balance_event(row.event_id)
                .ok_or(LedgerError::OrphanedHistoryRow {
                    account_id: account.id,
                    event_id: row.event_id,
                })?;
            balance = event.apply_to_balance(&balance)?;
        }
        Ok(balance)
    }

    /// Recomputes the current balance from the latest checkpoint, replaying
    /// only the events owned by that period and the ones after it.
    pub fn replay_from_checkpoint<S>(store: &S, account_id: AccountId) -> LedgerResult<AccountBalance>
    where
        S: LedgerStore + ?Sized,
    {
        let account = load_account(store, account_id)?;
        let periods = Self::sorted_periods(store);
        if periods.is_empty() {
            return Ok(AccountBalance::zero(account.id, account.account_type));
        }
        let last = periods.len() - 1;
        let floor = Self::checkpoint_floor(&periods, last, &account);
        let balance = periods[floor.index..]
            .iter()
            .fold(floor.balance, |balance, period| Self::replay_period(period, &account, balance));
        Ok(balance)
    }

    /// Replays the events owned by `period`, and by every later period, for
    /// the account from the period's starting balance, checking each step.
    ///
    /// `period` is the planned state of the owning period. Events may be dated
    /// outside their owning month, so this order can differ from the history
    /// order and both have to hold.
    pub(crate) fn check_period_balances<S>(store: &S, account: &Account, period: &AccountingPeriod) -> LedgerResult<()>
    where
        S: LedgerStore + ?Sized,
    {
        let mut periods = Self::sorted_periods(store);
        let index = periods
            .iter()
            .position(|candidate| candidate.id == period.id)
            .ok_or(LedgerError::PeriodNotFound(period.id))?;
        periods[index] = period.clone();

        let mut running = Self::starting_balance_at(&periods, index, account);
        let mut errors = Vec::new();
        for (offset, owner) in periods[index..].iter().enumerate() {
            if offset > 0
                && let Some(checkpoint) = owner.checkpoint_for(account.id)
            {
                running = checkpoint.starting_balance(account.account_type);
            }
            for event in owner.events_in_order().into_iter().filter(|event| event.affects(account.id)) {
                running = match event.apply_to_balance(&running) {
                    Ok(next) => next,
                    Err(violations) => {
                        errors.extend(violations.into_errors());
                        event.apply_unchecked(&running)
                    }
                };
            }
        }

        if !errors.is_empty() {
            debug!(
                account_id = %account.id,
                period = %period.key(),
                violations = errors.len(),
                "period balance replay failed"
            );
        }
        Violations::check(errors)
    }

    pub(crate) fn end_of_day<S>(store: &S, account: &Account, date: NaiveDate) -> AccountBalance
    where
        S: LedgerStore + ?Sized,
    {
        match date.succ_opt() {
            Some(next_day) => {
                AccountBalanceHistoryService::balance_before(store, account, HistoryKey::start_of(next_day))
            }
            None => store.find_latest(account.id).map_or_else(
                || AccountBalance::zero(account.id, account.account_type),
                |row| row.balance(account.account_type),
            ),
        }
    }

    fn sorted_periods<S>(store: &S) -> Vec<AccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let mut periods = store.all_periods();
        periods.sort_by_key(AccountingPeriod::key);
        periods
    }

    fn starting_balance_at(periods: &[AccountingPeriod], index: usize, account: &Account) -> AccountBalance {
        let floor = Self::checkpoint_floor(periods, index, account);
        periods[floor.index..index]
            .iter()
            .fold(floor.balance, |balance, period| Self::replay_period(period, account, balance))
    }

    /// Nearest period at or before `index` with a checkpoint for the account,
    /// or the first period with a zero balance.
    fn checkpoint_floor(periods: &[AccountingPeriod], index: usize, account: &Account) -> CheckpointFloor {
        (0..=index)
            .rev()
            .find_map(|candidate| {
                periods[candidate]
                    .checkpoint_for(account.id)
                    .map(|checkpoint| CheckpointFloor {
                        index: candidate,
                        balance: checkpoint.starting_balance(account.account_type),
                    })
            })
            .unwrap_or_else(|| CheckpointFloor {
                index: 0,
                balance: AccountBalance::zero(account.id, account.account_type),
            })
    }

    fn replay_period(period: &AccountingPeriod, account: &Account, start: AccountBalance) -> AccountBalance {
        period
            .events_in_order()
            .into_iter()
            .filter(|event| event.affects(account.id))
            .fold(start, |balance, event| event.apply_unchecked(&balance))
    }
}

struct CheckpointFloor {
    index: usize,
    balance: AccountBalance,
}
