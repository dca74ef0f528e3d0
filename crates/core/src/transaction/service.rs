//! Transaction entry points.
//!
//! Every operation plans the history cascade of each affected account first
//! and writes nothing unless every plan succeeded, so a two-sided transaction
//! is never applied to only one of its accounts.

use chrono::NaiveDate;
use fundledger_shared::LedgerSettings;
use fundledger_shared::types::{AccountId, FundAmount, TransactionId};
use tracing::{info, warn};

use super::types::{CreateTransactionRequest, Transaction, TransactionAccount};
use crate::account::Account;
use crate::balance::AccountBalanceService;
use crate::error::{LedgerError, LedgerResult, Violations, combine, fail};
use crate::events::validation::{date_errors, entry_errors, load_account, load_period};
use crate::events::{BalanceEvent, BalanceEventKind};
use crate::history::{AccountBalanceHistoryService, HistoryChangeSet};
use crate::period::AccountingPeriod;
use crate::store::LedgerStore;

struct TransactionPlan {
    transaction: Transaction,
    period: AccountingPeriod,
    changes: Vec<HistoryChangeSet>,
}

/// Adds, edits, posts and deletes transactions.
pub struct TransactionService;

impl TransactionService {
    /// Records a new transaction as pending on each of its accounts.
    pub fn try_add<S>(
        store: &mut S,
        settings: &LedgerSettings,
        request: CreateTransactionRequest,
    ) -> LedgerResult<Transaction>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_add(&*store, settings, request).inspect_err(|violations| {
            warn!(codes = ?violations.codes(), "transaction rejected");
        })?;
        let transaction = Self::commit(store, plan);
        info!(
            transaction_id = %transaction.id,
            date = %transaction.date,
            accounts = transaction.account_ids().len(),
            "transaction added"
        );
        Ok(transaction)
    }

    /// Replaces the amounts of an unposted transaction.
    ///
    /// Date and accounts stay as they are.
    pub fn try_update<S>(
        store: &mut S,
        transaction_id: TransactionId,
        entries: Vec<FundAmount>,
    ) -> LedgerResult<Transaction>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_update(&*store, transaction_id, entries).inspect_err(|violations| {
            warn!(transaction_id = %transaction_id, codes = ?violations.codes(), "transaction update rejected");
        })?;
        let transaction = Self::commit(store, plan);
        info!(transaction_id = %transaction.id, "transaction updated");
        Ok(transaction)
    }

    /// Posts the side of the transaction that `account_id` sits on.
    pub fn try_post<S>(
        store: &mut S,
        settings: &LedgerSettings,
        transaction_id: TransactionId,
        account_id: AccountId,
        posted_date: NaiveDate,
    ) -> LedgerResult<Transaction>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_post(&*store, settings, transaction_id, account_id, posted_date)
            .inspect_err(|violations| {
                warn!(
                    transaction_id = %transaction_id,
                    account_id = %account_id,
                    codes = ?violations.codes(),
                    "transaction posting rejected"
                );
            })?;
        let transaction = Self::commit(store, plan);
        info!(
            transaction_id = %transaction.id,
            account_id = %account_id,
            posted_date = %posted_date,
            "transaction posted"
        );
        Ok(transaction)
    }

    /// Removes an unposted transaction and its pending amounts.
    pub fn try_delete<S>(store: &mut S, transaction_id: TransactionId) -> LedgerResult<()>
    where
        S: LedgerStore + ?Sized,
    {
        let plan = Self::plan_delete(&*store, transaction_id).inspect_err(|violations| {
            warn!(transaction_id = %transaction_id, codes = ?violations.codes(), "transaction deletion rejected");
        })?;
        Self::commit(store, plan);
        info!(transaction_id = %transaction_id, "transaction deleted");
        Ok(())
    }

    fn plan_add<S>(
        store: &S,
        settings: &LedgerSettings,
        request: CreateTransactionRequest,
    ) -> LedgerResult<TransactionPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let mut errors = Vec::new();
        match (request.debit_account, request.credit_account) {
            (None, None) => errors.push(LedgerError::NoTransactionAccounts),
            (Some(debit), Some(credit)) if debit == credit => {
                errors.push(LedgerError::SameDebitAndCredit(debit));
            }
            _ => {}
        }
        errors.extend(entry_errors(store, &request.entries));

        let mut period = match load_period(store, request.period_id) {
            Ok(period) => period,
            Err(error) => return fail(errors, error),
        };
        let account_ids: Vec<AccountId> = request
            .debit_account
            .iter()
            .chain(request.credit_account.iter())
            .copied()
            .collect();
        let accounts = Self::load_accounts(store, &account_ids, &mut errors);
        let account_refs: Vec<&Account> = accounts.iter().collect();
        errors.extend(date_errors(&period, request.date, &account_refs, settings));
        Violations::check(errors)?;

        let transaction_id = TransactionId::new();
        let event = BalanceEvent::new(
            &period,
            request.date,
            BalanceEventKind::TransactionAdded {
                transaction_id,
                debit_account: request.debit_account,
                credit_account: request.credit_account,
                entries: request.entries.clone(),
            },
        );
        period.add_event(event.clone())?;
        let changes = Self::plan_each(store, &accounts, &period, |account| {
            AccountBalanceHistoryService::try_add_new_balance_history(store, account, &event)
        })?;

        let transaction = Transaction {
            id: transaction_id,
            period_id: period.id,
            date: request.date,
            debit: request.debit_account.map(TransactionAccount::new),
            credit: request.credit_account.map(TransactionAccount::new),
            entries: request.entries,
            added_event_id: event.id,
        };
        period.add_transaction(transaction.clone())?;

        Ok(TransactionPlan {
            transaction,
            period,
            changes,
        })
    }

    fn plan_update<S>(
        store: &S,
        transaction_id: TransactionId,
        entries: Vec<FundAmount>,
    ) -> LedgerResult<TransactionPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let (mut transaction, mut period) = Self::load_transaction(store, transaction_id)?;

        let mut errors = Vec::new();
        if !period.is_open() {
            errors.push(LedgerError::PeriodClosed(period.id));
        }
        if transaction.is_partially_posted() {
            errors.push(LedgerError::CannotModifyPosted(transaction_id));
        }
        errors.extend(entry_errors(store, &entries));
        let accounts = Self::load_accounts(store, &transaction.account_ids(), &mut errors);
        Violations::check(errors)?;

        let mut event = period
            .find_event(transaction.added_event_id)
            .cloned()
            .ok_or(LedgerError::BalanceEventNotFound(transaction.added_event_id))?;
        if let BalanceEventKind::TransactionAdded {
            entries: event_entries,
            ..
        } = &mut event.kind
        {
            event_entries.clone_from(&entries);
        }
        period.replace_event(event.clone())?;
        let changes = Self::plan_each(store, &accounts, &period, |account| {
            AccountBalanceHistoryService::try_update_existing_balance_history(store, account, &event)
        })?;

        transaction.entries = entries;
        period.replace_transaction(transaction.clone())?;

        Ok(TransactionPlan {
            transaction,
            period,
            changes,
        })
    }

    fn plan_post<S>(
        store: &S,
        settings: &LedgerSettings,
        transaction_id: TransactionId,
        account_id: AccountId,
        posted_date: NaiveDate,
    ) -> LedgerResult<TransactionPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let (mut transaction, mut period) = Self::load_transaction(store, transaction_id)?;
        let Some(side) = transaction.side_of(account_id) else {
            return Err(LedgerError::AccountNotInTransaction {
                transaction_id,
                account_id,
            }
            .into());
        };
        let account = load_account(store, account_id)?;

        let mut errors = Vec::new();
        if transaction.side(side).is_some_and(TransactionAccount::is_posted) {
            errors.push(LedgerError::AlreadyPosted {
                transaction_id,
                account_id,
            });
        }
        if posted_date < transaction.date {
            errors.push(LedgerError::PostedBeforeTransactionDate {
                posted_date,
                transaction_date: transaction.date,
            });
        }
        errors.extend(date_errors(&period, posted_date, &[&account], settings));
        Violations::check(errors)?;

        let event = BalanceEvent::new(
            &period,
            posted_date,
            BalanceEventKind::TransactionPosted {
                transaction_id,
                account_id,
                side,
                entries: transaction.entries.clone(),
            },
        );
        period.add_event(event.clone())?;
        let changes = Self::plan_each(store, &[account], &period, |account| {
            AccountBalanceHistoryService::try_add_new_balance_history(store, account, &event)
        })?;

        if let Some(posted) = transaction.side_mut(side) {
            posted.posted_date = Some(posted_date);
            posted.posted_event_id = Some(event.id);
        }
        period.replace_transaction(transaction.clone())?;

        Ok(TransactionPlan {
            transaction,
            period,
            changes,
        })
    }

    fn plan_delete<S>(store: &S, transaction_id: TransactionId) -> LedgerResult<TransactionPlan>
    where
        S: LedgerStore + ?Sized,
    {
        let (transaction, mut period) = Self::load_transaction(store, transaction_id)?;

        let mut errors = Vec::new();
        if !period.is_open() {
            errors.push(LedgerError::PeriodClosed(period.id));
        }
        if transaction.is_partially_posted() {
            errors.push(LedgerError::CannotModifyPosted(transaction_id));
        }
        let accounts = Self::load_accounts(store, &transaction.account_ids(), &mut errors);
        Violations::check(errors)?;

        period.remove_event(transaction.added_event_id)?;
        let changes = Self::plan_each(store, &accounts, &period, |account| {
            AccountBalanceHistoryService::try_delete_existing_balance_history(
                store,
                account,
                transaction.added_event_id,
            )
        })?;

        period.remove_transaction(transaction_id)?;

        Ok(TransactionPlan {
            transaction,
            period,
            changes,
        })
    }

    fn load_transaction<S>(store: &S, transaction_id: TransactionId) -> LedgerResult<(Transaction, AccountingPeriod)>
    where
        S: LedgerStore + ?Sized,
    {
        let transaction = store
            .find_transaction(transaction_id)
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
        let period = load_period(store, transaction.period_id)?;
        Ok((transaction, period))
    }

    fn load_accounts<S>(store: &S, account_ids: &[AccountId], errors: &mut Vec<LedgerError>) -> Vec<Account>
    where
        S: LedgerStore + ?Sized,
    {
        account_ids
            .iter()
            .filter_map(|account_id| match load_account(store, *account_id) {
                Ok(account) => Some(account),
                Err(error) => {
                    errors.push(error);
                    None
                }
            })
            .collect()
    }

    /// Plans every account against the planned `period`, keeping the errors
    /// of all of them.
    ///
    /// Each account's history cascade and its replay in period order must
    /// both succeed.
    fn plan_each<S, F>(
        store: &S,
        accounts: &[Account],
        period: &AccountingPeriod,
        plan: F,
    ) -> LedgerResult<Vec<HistoryChangeSet>>
    where
        S: LedgerStore + ?Sized,
        F: Fn(&Account) -> LedgerResult<HistoryChangeSet>,
    {
        let mut changes = Vec::with_capacity(accounts.len());
        let mut violations: Option<Violations> = None;
        for account in accounts {
            let planned = combine(
                plan(account),
                AccountBalanceService::check_period_balances(store, account, period),
            );
            match planned {
                Ok((change_set, ())) => changes.push(change_set),
                Err(found) => match violations.as_mut() {
                    Some(collected) => collected.extend(found),
                    None => violations = Some(found),
                },
            }
        }
        match violations {
            Some(violations) => Err(violations),
            None => Ok(changes),
        }
    }

    fn commit<S>(store: &mut S, plan: TransactionPlan) -> Transaction
    where
        S: LedgerStore + ?Sized,
    {
        store.save_period(plan.period);
        for change_set in plan.changes {
            store.apply_changes(change_set);
        }
        plan.transaction
    }
}
