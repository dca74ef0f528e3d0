//! Fund conversions and changes in value.

use chrono::NaiveDate;
use fundledger_shared::LedgerSettings;
use fundledger_shared::types::{AccountId, AccountingPeriodId, BalanceEventId, FundAmount, FundId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::types::{BalanceEvent, BalanceEventKind};
use super::validation::{date_errors, fund_errors, load_account, load_period};
use crate::account::Account;
use crate::balance::AccountBalanceService;
use crate::error::{LedgerError, LedgerResult, Violations, combine, fail};
use crate::history::{AccountBalanceHistoryService, HistoryChangeSet};
use crate::period::AccountingPeriod;
use crate::store::LedgerStore;

/// Input for moving money between two funds of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFundConversionRequest {
    /// Owning period.
    pub period_id: AccountingPeriodId,
    /// Conversion date.
    pub date: NaiveDate,
    /// The account.
    pub account_id: AccountId,
    /// Fund losing the amount.
    pub from_fund: FundId,
    /// Fund gaining the amount.
    pub to_fund: FundId,
    /// Positive amount.
    pub amount: Decimal,
}

/// Input for adjusting one fund of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChangeInValueRequest {
    /// Owning period.
    pub period_id: AccountingPeriodId,
    /// Adjustment date.
    pub date: NaiveDate,
    /// The account.
    pub account_id: AccountId,
    /// Signed, non-zero amount.
    pub entry: FundAmount,
}

struct EventPlan {
    period: AccountingPeriod,
    event: BalanceEvent,
    changes: HistoryChangeSet,
}

/// Adds and removes events that touch a single account's posted balance.
pub struct BalanceEventService;

impl BalanceEventService {
    /// Records a fund conversion.
    pub fn try_add_fund_conversion<S>(
        store: &mut S,
        settings: &LedgerSettings,
        request: &CreateFundConversionRequest,
    ) -> LedgerResult<BalanceEvent>
    where
        S: LedgerStore + ?Sized,
    {
        let mut errors = Vec::new();
        if request.from_fund == request.to_fund {
            errors.push(LedgerError::SameFundConversion(request.from_fund));
        }
        if request.amount <= Decimal::ZERO {
            errors.push(LedgerError::NonPositiveAmount {
                fund_id: request.from_fund,
                amount: request.amount,
            });
        }
        errors.extend(fund_errors(&*store, [request.from_fund, request.to_fund]));

        let kind = BalanceEventKind::FundConversion {
            account_id: request.account_id,
            from_fund: request.from_fund,
            to_fund: request.to_fund,
            amount: request.amount,
        };
        Self::try_add(store, settings, request.period_id, request.date, request.account_id, errors, kind)
    }

    /// Records a change in value.
    pub fn try_add_change_in_value<S>(
        store: &mut S,
        settings: &LedgerSettings,
        request: &CreateChangeInValueRequest,
    ) -> LedgerResult<BalanceEvent>
    where
        S: LedgerStore + ?Sized,
    {
        let mut errors = Vec::new();
        if request.entry.is_zero() {
            errors.push(LedgerError::ZeroChangeInValue);
        }
        errors.extend(fund_errors(&*store, [request.entry.fund_id]));

        let kind = BalanceEventKind::ChangeInValue {
            account_id: request.account_id,
            entry: request.entry,
        };
        Self::try_add(store, settings, request.period_id, request.date, request.account_id, errors, kind)
    }

    /// Removes a fund conversion or change in value and replays later history.
    pub fn try_delete_balance_event<S>(store: &mut S, event_id: BalanceEventId) -> LedgerResult<()>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_delete(&*store, event_id).inspect_err(|violations| {
            warn!(event_id = %event_id, codes = ?violations.codes(), "balance event deletion rejected");
        })?;

        store.save_period(plan.period);
        store.apply_changes(plan.changes);
        info!(
            event_id = %event_id,
            kind = plan.event.kind_name(),
            date = %plan.event.date,
            "balance event deleted"
        );
        Ok(())
    }

    fn try_add<S>(
        store: &mut S,
        settings: &LedgerSettings,
        period_id: AccountingPeriodId,
        date: NaiveDate,
        account_id: AccountId,
        errors: Vec<LedgerError>,
        kind: BalanceEventKind,
    ) -> LedgerResult<BalanceEvent>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_add(&*store, settings, period_id, date, account_id, errors, kind)
            .inspect_err(|violations| {
                warn!(account_id = %account_id, codes = ?violations.codes(), "balance event rejected");
            })?;

        store.save_period(plan.period);
        store.apply_changes(plan.changes);
        info!(
            event_id = %plan.event.id,
            account_id = %account_id,
            kind = plan.event.kind_name(),
            date = %plan.event.date,
            sequence = plan.event.sequence,
            "balance event added"
        );
        Ok(plan.event)
    }

    fn plan_add<S>(
        store: &S,
        settings: &LedgerSettings,
        period_id: AccountingPeriodId,
        date: NaiveDate,
        account_id: AccountId,
        mut errors: Vec<LedgerError>,
        kind: BalanceEventKind,
    ) -> LedgerResult<EventPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let mut period = match load_period(store, period_id) {
            Ok(period) => period,
            Err(error) => return fail(errors, error),
        };
        let account: Account = match load_account(store, account_id) {
            Ok(account) => account,
            Err(error) => return fail(errors, error),
        };
        errors.extend(date_errors(&period, date, &[&account], settings));
        Violations::check(errors)?;

        let event = BalanceEvent::new(&period, date, kind);
        period.add_event(event.clone())?;
        let (changes, ()) = combine(
            AccountBalanceHistoryService::try_add_new_balance_history(store, &account, &event),
            AccountBalanceService::check_period_balances(store, &account, &period),
        )?;
        Ok(EventPlan {
            period,
            event,
            changes,
        })
    }

    fn plan_delete<S>(store: &S, event_id: BalanceEventId) -> LedgerResult<EventPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let event = store
            .find_balance_event(event_id)
            .ok_or(LedgerError::BalanceEventNotFound(event_id))?;
        let account_id = match &event.kind {
            BalanceEventKind::FundConversion { account_id, .. }
            | BalanceEventKind::ChangeInValue { account_id, .. } => *account_id,
            _ => return Err(LedgerError::CannotDeleteBalanceEvent(event_id).into()),
        };
        let mut period = load_period(store, event.period_id)?;
        let account = load_account(store, account_id)?;

        period.remove_event(event_id)?;
        let (changes, ()) = combine(
            AccountBalanceHistoryService::try_delete_existing_balance_history(store, &account, event_id),
            AccountBalanceService::check_period_balances(store, &account, &period),
        )?;
        Ok(EventPlan {
            period,
            event,
            changes,
        })
    }
}
