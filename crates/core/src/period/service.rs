//! Accounting period lifecycle: create, close, delete.
//!
//! Periods are Open or Closed. There is no way back from Closed.

use fundledger_shared::LedgerSettings;
use fundledger_shared::types::AccountingPeriodId;
use tracing::{info, warn};

use super::checkpoint::AccountBalanceCheckpoint;
use super::types::{AccountingPeriod, PeriodKey};
use crate::balance::{AccountBalance, AccountBalanceService};
use crate::error::{LedgerError, LedgerResult, Violations};
use crate::events::validation::load_period;
use crate::store::LedgerStore;

/// Accounting period state machine.
pub struct AccountingPeriodService;

impl AccountingPeriodService {
    /// Opens the period for `year`/`month`.
    ///
    /// The month must directly follow the latest existing period. When that
    /// period is already closed, every account gets a checkpoint with its
    /// ending balance.
    pub fn create<S>(store: &mut S, settings: &LedgerSettings, year: i32, month: u32) -> LedgerResult<AccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let period = Self::plan_create(&*store, settings, year, month).inspect_err(|violations| {
            warn!(year, month, codes = ?violations.codes(), "accounting period creation rejected");
        })?;

        store.save_period(period.clone());
        info!(
            period_id = %period.id,
            period = %period.key(),
            checkpoints = period.checkpoints().len(),
            "accounting period created"
        );
        Ok(period)
    }

    /// Closes the earliest open period.
    ///
    /// Every transaction of the period must be posted and no account may end
    /// the period with pending amounts. When a following period exists it
    /// receives a checkpoint per account.
    pub fn close<S>(store: &mut S, period_id: AccountingPeriodId) -> LedgerResult<AccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let (period, next) = Self::plan_close(&*store, period_id).inspect_err(|violations| {
            warn!(period_id = %period_id, codes = ?violations.codes(), "accounting period close rejected");
        })?;

        if let Some(next) = next {
            info!(
                period_id = %next.id,
                period = %next.key(),
                checkpoints = next.checkpoints().len(),
                "checkpoints written"
            );
            store.save_period(next);
        }
        store.save_period(period.clone());
        info!(period_id = %period.id, period = %period.key(), "accounting period closed");
        Ok(period)
    }

    /// Removes the latest period if it is open and owns nothing.
    pub fn delete<S>(store: &mut S, period_id: AccountingPeriodId) -> LedgerResult<()>
    where
        S: LedgerStore + ?Sized,
    {
        let period = Self::plan_delete(&*store, period_id).inspect_err(|violations| {
            warn!(period_id = %period_id, codes = ?violations.codes(), "accounting period deletion rejected");
        })?;

        store.delete_period(period.id);
        info!(period_id = %period.id, period = %period.key(), "accounting period deleted");
        Ok(())
    }

    fn plan_create<S>(store: &S, settings: &LedgerSettings, year: i32, month: u32) -> LedgerResult<AccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let invalid = LedgerError::InvalidPeriod { year, month };
        if !settings.period_years().contains(&year) {
            return Err(invalid.into());
        }
        let Some(key) = PeriodKey::new(year, month) else {
            return Err(invalid.into());
        };

        if store.find_period_by_key(key).is_some() {
            return Err(LedgerError::DuplicatePeriod { year, month }.into());
        }
        let latest = store.latest_period();
        if let Some(latest) = &latest
            && latest.key().next() != key
        {
            return Err(LedgerError::NonContiguousPeriod {
                year,
                month,
                latest_year: latest.year,
                latest_month: latest.month,
            }
            .into());
        }

        let mut period = AccountingPeriod::new(key);
        if let Some(latest) = latest.filter(|latest| !latest.is_open()) {
            let endings = Self::ending_balances(store, latest.id)?;
            Self::write_checkpoints(&mut period, &endings)?;
        }
        Ok(period)
    }

    fn plan_close<S>(
        store: &S,
        period_id: AccountingPeriodId,
    ) -> LedgerResult<(AccountingPeriod, Option<AccountingPeriod>)>
    where
        S: LedgerStore + ?Sized,
    {
        let mut period = load_period(store, period_id)?;
        if !period.is_open() {
            return Err(LedgerError::PeriodClosed(period_id).into());
        }

        let mut errors = Vec::new();
        if let Some(earlier) = store
            .open_periods()
            .into_iter()
            .find(|open| open.key() < period.key())
        {
            errors.push(LedgerError::EarlierPeriodOpen {
                period_id,
                earlier_id: earlier.id,
            });
        }
        for transaction in period.transactions() {
            for account_id in transaction.unposted_accounts() {
                errors.push(LedgerError::UnpostedTransaction {
                    transaction_id: transaction.id,
                    account_id,
                });
            }
        }
        let endings = Self::ending_balances(store, period_id)?;
        for ending in endings.iter().filter(|ending| ending.has_pending()) {
            errors.push(LedgerError::PendingBalanceAtClose {
                account_id: ending.account_id(),
                period_id,
            });
        }
        Violations::check(errors)?;

        let next = match store.next_period(period.key()) {
            Some(mut next) => {
                Self::write_checkpoints(&mut next, &endings)?;
                Some(next)
            }
            None => None,
        };
        period.close();
        Ok((period, next))
    }

    fn plan_delete<S>(store: &S, period_id: AccountingPeriodId) -> LedgerResult<AccountingPeriod>
    where
        S: LedgerStore + ?Sized,
    {
        let period = load_period(store, period_id)?;

        let mut errors = Vec::new();
        if !period.is_open() {
            errors.push(LedgerError::PeriodClosed(period_id));
        }
        if store
            .latest_period()
            .is_some_and(|latest| latest.id != period_id)
        {
            errors.push(LedgerError::PeriodNotLatest(period_id));
        }
        if !period.transactions().is_empty() {
            errors.push(LedgerError::PeriodHasTransactions(period_id));
        }
        if !period.events().is_empty() {
            errors.push(LedgerError::PeriodHasBalanceEvents(period_id));
        }
        Violations::check(errors)?;
        Ok(period)
    }

    fn ending_balances<S>(store: &S, period_id: AccountingPeriodId) -> LedgerResult<Vec<AccountBalance>>
    where
        S: LedgerStore + ?Sized,
    {
        store
            .all_accounts()
            .into_iter()
            .map(|account| {
                AccountBalanceService::balance_by_accounting_period(store, account.id, period_id)
                    .map(|by_period| by_period.ending_balance)
            })
            .collect()
    }

    fn write_checkpoints(period: &mut AccountingPeriod, endings: &[AccountBalance]) -> LedgerResult<()> {
        let mut errors = Vec::new();
        for ending in endings {
            let written = AccountBalanceCheckpoint::try_new(period.id, ending)
                .and_then(|checkpoint| period.add_checkpoint(checkpoint));
            if let Err(error) = written {
                errors.push(error);
            }
        }
        Violations::check(errors)
    }
}
