//! Account creation.

use chrono::NaiveDate;
use fundledger_shared::LedgerSettings;
use fundledger_shared::types::{AccountId, AccountingPeriodId, FundAmount};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::types::{Account, AccountType};
use crate::error::{LedgerError, LedgerResult, Violations, fail};
use crate::events::validation::{date_errors, entry_errors, load_period};
use crate::events::{BalanceEvent, BalanceEventKind};
use crate::history::{AccountBalanceHistoryService, HistoryChangeSet};
use crate::period::AccountingPeriod;
use crate::store::LedgerStore;

/// Input for opening an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Unique display name.
    pub name: String,
    /// Balance direction.
    pub account_type: AccountType,
    /// Period owning the AccountAdded event.
    pub period_id: AccountingPeriodId,
    /// Date the account opens.
    pub date: NaiveDate,
    /// Positive posted amount per fund. May be empty.
    pub starting_balances: Vec<FundAmount>,
}

struct AccountPlan {
    account: Account,
    period: AccountingPeriod,
    changes: HistoryChangeSet,
}

/// Opens accounts.
pub struct AccountService;

impl AccountService {
    /// Opens an account with its AccountAdded event and first history row.
    pub fn try_add<S>(
        store: &mut S,
        settings: &LedgerSettings,
        request: CreateAccountRequest,
    ) -> LedgerResult<Account>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan(store, settings, request).inspect_err(|violations| {
            warn!(codes = ?violations.codes(), "account rejected");
        })?;

        store.add_account(plan.account.clone());
        store.save_period(plan.period);
        store.apply_changes(plan.changes);
        info!(
            account_id = %plan.account.id,
            name = %plan.account.name,
            account_type = ?plan.account.account_type,
            "account added"
        );
        Ok(plan.account)
    }

    fn plan<S>(store: &S, settings: &LedgerSettings, request: CreateAccountRequest) -> LedgerResult<AccountPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let name = request.name.trim().to_string();
        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(LedgerError::BlankName);
        } else if store.find_account_by_name(&name).is_some() {
            errors.push(LedgerError::DuplicateAccountName(name.clone()));
        }
        if !request.starting_balances.is_empty() {
            errors.extend(entry_errors(store, &request.starting_balances));
        }
        let mut period = match load_period(store, request.period_id) {
            Ok(period) => period,
            Err(error) => return fail(errors, error),
        };
        errors.extend(date_errors(&period, request.date, &[], settings));
        Violations::check(errors)?;

        let id = AccountId::new();
        let event = BalanceEvent::new(
            &period,
            request.date,
            BalanceEventKind::AccountAdded {
                account_id: id,
                starting_balances: request.starting_balances,
            },
        );
        let account = Account {
            id,
            name,
            account_type: request.account_type,
            added_event_id: event.id,
            added_date: request.date,
            added_period: period.key(),
        };
        let changes = AccountBalanceHistoryService::try_add_new_balance_history(store, &account, &event)?;
        period.add_event(event)?;

        Ok(AccountPlan {
            account,
            period,
            changes,
        })
    }
}
