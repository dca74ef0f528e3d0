//! Checks shared by every entry point that creates a balance event.

use std::collections::HashSet;

use chrono::NaiveDate;
use fundledger_shared::LedgerSettings;
use fundledger_shared::types::{AccountId, AccountingPeriodId, FundAmount, FundId};
use rust_decimal::Decimal;

use crate::account::{Account, AccountRepository};
use crate::error::LedgerError;
use crate::fund::FundRepository;
use crate::period::{AccountingPeriod, AccountingPeriodRepository};

/// Loads the period, or reports it missing.
pub(crate) fn load_period<S>(store: &S, period_id: AccountingPeriodId) -> Result<AccountingPeriod, LedgerError>
where
    S: AccountingPeriodRepository + ?Sized,
{
    store
        .find_period(period_id)
        .ok_or(LedgerError::PeriodNotFound(period_id))
}

/// Loads the account, or reports it missing.
pub(crate) fn load_account<S>(store: &S, account_id: AccountId) -> Result<Account, LedgerError>
where
    S: AccountRepository + ?Sized,
{
    store
        .find_account(account_id)
        .ok_or(LedgerError::AccountNotFound(account_id))
}

/// Period must be open, date within the period's window and not before any
/// affected account existed.
pub(crate) fn date_errors(
    period: &AccountingPeriod,
    date: NaiveDate,
    accounts: &[&Account],
    settings: &LedgerSettings,
) -> Vec<LedgerError> {
    let mut errors = Vec::new();
    if !period.is_open() {
        errors.push(LedgerError::PeriodClosed(period.id));
    }
    if !period.key().is_within_window(date, settings.adjacent_month_window) {
        errors.push(LedgerError::DateOutsidePeriodWindow {
            date,
            year: period.year,
            month: period.month,
        });
    }
    for account in accounts {
        if date < account.added_date {
            errors.push(LedgerError::EventBeforeAccountAdded {
                account_id: account.id,
                date,
                added_date: account.added_date,
            });
        }
        if period.key() < account.added_period {
            errors.push(LedgerError::EventPeriodBeforeAccountAdded {
                account_id: account.id,
                added_year: account.added_period.year,
                added_month: account.added_period.month,
            });
        }
    }
    errors
}

/// Amount lists must be non-empty, positive, one entry per existing fund.
pub(crate) fn entry_errors<S>(store: &S, entries: &[FundAmount]) -> Vec<LedgerError>
where
    S: FundRepository + ?Sized,
{
    let mut errors = Vec::new();
    if entries.is_empty() {
        errors.push(LedgerError::NoEntries);
    }

    let mut seen: HashSet<FundId> = HashSet::new();
    for entry in entries {
        if entry.amount <= Decimal::ZERO {
            errors.push(LedgerError::NonPositiveAmount {
                fund_id: entry.fund_id,
                amount: entry.amount,
            });
        }
        if !seen.insert(entry.fund_id) {
            errors.push(LedgerError::DuplicateFundEntry(entry.fund_id));
        }
    }
    errors.extend(fund_errors(store, seen));
    errors
}

/// Reports funds that do not exist.
pub(crate) fn fund_errors<S, I>(store: &S, fund_ids: I) -> Vec<LedgerError>
where
    S: FundRepository + ?Sized,
    I: IntoIterator<Item = FundId>,
{
    let mut missing: Vec<FundId> = fund_ids
        .into_iter()
        .filter(|fund_id| store.find_fund(*fund_id).is_none())
        .collect();
    missing.sort();
    missing.dedup();
    missing.into_iter().map(LedgerError::FundNotFound).collect()
}
