//! Shared handle over one ledger.
//!
//! Every mutation takes the write lock for its whole plan-then-commit cycle,
//! so mutations are serialized and readers never observe a half-written
//! cascade. Queries share the read lock.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use fundledger_core::account::AccountRepository;
use fundledger_core::fund::{Fund, FundRepository};
use fundledger_core::history::AccountBalanceHistoryRepository;
use fundledger_core::period::AccountingPeriodRepository;
use fundledger_core::{
    Account, AccountBalance, AccountBalanceByAccountingPeriod, AccountBalanceHistory, AccountBalanceService,
    AccountService, AccountingPeriod, AccountingPeriodService, BalanceEvent, BalanceEventService,
    CreateAccountRequest, CreateChangeInValueRequest, CreateFundConversionRequest, CreateTransactionRequest,
    FundService, LedgerResult, PeriodKey, Transaction, TransactionService,
};
use fundledger_shared::LedgerSettings;
use fundledger_shared::types::{AccountId, AccountingPeriodId, BalanceEventId, FundAmount, TransactionId};

use crate::memory::InMemoryStore;

/// Cloneable, thread-safe entry point to a ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    store: Arc<RwLock<InMemoryStore>>,
    settings: LedgerSettings,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(settings: LedgerSettings) -> Self {
        Self::with_store(InMemoryStore::new(), settings)
    }

    /// Wraps an existing store.
    #[must_use]
    pub fn with_store(store: InMemoryStore, settings: LedgerSettings) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            settings,
        }
    }

    /// The rules this ledger validates dates and periods against.
    #[must_use]
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// A copy of the current store contents.
    #[must_use]
    pub fn snapshot(&self) -> InMemoryStore {
        self.read().clone()
    }

    // =========================================================================
    // Funds and accounts
    // =========================================================================

    /// Adds a fund.
    pub fn add_fund(&self, name: &str, description: &str) -> LedgerResult<Fund> {
        FundService::try_add(&mut *self.write(), name, description)
    }

    /// Opens an account.
    pub fn add_account(&self, request: CreateAccountRequest) -> LedgerResult<Account> {
        AccountService::try_add(&mut *self.write(), &self.settings, request)
    }

    /// Looks up a fund.
    #[must_use]
    pub fn fund(&self, name: &str) -> Option<Fund> {
        self.read().find_fund_by_name(name)
    }

    /// Looks up an account.
    #[must_use]
    pub fn account(&self, account_id: AccountId) -> Option<Account> {
        self.read().find_account(account_id)
    }

    /// Every account.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.read().all_accounts()
    }

    // =========================================================================
    // Accounting periods
    // =========================================================================

    /// Opens the period for `year`/`month`.
    pub fn create_period(&self, year: i32, month: u32) -> LedgerResult<AccountingPeriod> {
        AccountingPeriodService::create(&mut *self.write(), &self.settings, year, month)
    }

    /// Closes a period.
    pub fn close_period(&self, period_id: AccountingPeriodId) -> LedgerResult<AccountingPeriod> {
        AccountingPeriodService::close(&mut *self.write(), period_id)
    }

    /// Deletes an empty, open, latest period.
    pub fn delete_period(&self, period_id: AccountingPeriodId) -> LedgerResult<()> {
        AccountingPeriodService::delete(&mut *self.write(), period_id)
    }

    /// Looks up a period.
    #[must_use]
    pub fn period(&self, period_id: AccountingPeriodId) -> Option<AccountingPeriod> {
        self.read().find_period(period_id)
    }

    /// Looks up the period for a month.
    #[must_use]
    pub fn period_for(&self, key: PeriodKey) -> Option<AccountingPeriod> {
        self.read().find_period_by_key(key)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Adds a pending transaction.
    pub fn add_transaction(&self, request: CreateTransactionRequest) -> LedgerResult<Transaction> {
        TransactionService::try_add(&mut *self.write(), &self.settings, request)
    }

    /// Replaces the amounts of an unposted transaction.
    pub fn update_transaction(
        &self,
        transaction_id: TransactionId,
        entries: Vec<FundAmount>,
    ) -> LedgerResult<Transaction> {
        TransactionService::try_update(&mut *self.write(), transaction_id, entries)
    }

    /// Posts one side of a transaction.
    pub fn post_transaction(
        &self,
        transaction_id: TransactionId,
        account_id: AccountId,
        posted_date: NaiveDate,
    ) -> LedgerResult<Transaction> {
        TransactionService::try_post(
            &mut *self.write(),
            &self.settings,
            transaction_id,
            account_id,
            posted_date,
        )
    }

    /// Deletes an unposted transaction.
    pub fn delete_transaction(&self, transaction_id: TransactionId) -> LedgerResult<()> {
        TransactionService::try_delete(&mut *self.write(), transaction_id)
    }

    /// Looks up a transaction.
    #[must_use]
    pub fn transaction(&self, transaction_id: TransactionId) -> Option<Transaction> {
        self.read().find_transaction(transaction_id)
    }

    // =========================================================================
    // Single-account events
    // =========================================================================

    /// Moves an amount between two funds of one account.
    pub fn add_fund_conversion(&self, request: &CreateFundConversionRequest) -> LedgerResult<BalanceEvent> {
        BalanceEventService::try_add_fund_conversion(&mut *self.write(), &self.settings, request)
    }

    /// Adjusts one fund of one account.
    pub fn add_change_in_value(&self, request: &CreateChangeInValueRequest) -> LedgerResult<BalanceEvent> {
        BalanceEventService::try_add_change_in_value(&mut *self.write(), &self.settings, request)
    }

    /// Removes a fund conversion or change in value.
    pub fn delete_balance_event(&self, event_id: BalanceEventId) -> LedgerResult<()> {
        BalanceEventService::try_delete_balance_event(&mut *self.write(), event_id)
    }

    /// Looks up a balance event.
    #[must_use]
    pub fn balance_event(&self, event_id: BalanceEventId) -> Option<BalanceEvent> {
        self.read().find_balance_event(event_id)
    }

    // =========================================================================
    // Balance queries
    // =========================================================================

    /// Balance after the account's most recent event.
    pub fn current_balance(&self, account_id: AccountId) -> LedgerResult<AccountBalance> {
        AccountBalanceService::current_balance(&*self.read(), account_id)
    }

    /// Balance right after the row at (`date`, `sequence`).
    pub fn balance_as_of(&self, account_id: AccountId, date: NaiveDate, sequence: u32) -> LedgerResult<AccountBalance> {
        AccountBalanceService::balance_as_of(&*self.read(), account_id, date, sequence)
    }

    /// Balance after every event dated on or before `date`.
    pub fn balance_at_end_of(&self, account_id: AccountId, date: NaiveDate) -> LedgerResult<AccountBalance> {
        AccountBalanceService::balance_at_end_of(&*self.read(), account_id, date)
    }

    /// End-of-day balances from `from` to `to`.
    pub fn balances_by_date_range(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<Vec<(NaiveDate, AccountBalance)>> {
        AccountBalanceService::balances_by_date_range(&*self.read(), account_id, from, to)
    }

    /// Starting and ending balance for one period.
    pub fn balance_by_accounting_period(
        &self,
        account_id: AccountId,
        period_id: AccountingPeriodId,
    ) -> LedgerResult<AccountBalanceByAccountingPeriod> {
        AccountBalanceService::balance_by_accounting_period(&*self.read(), account_id, period_id)
    }

    /// Current balance recomputed from the account's first event.
    pub fn replay_from_inception(&self, account_id: AccountId) -> LedgerResult<AccountBalance> {
        AccountBalanceService::replay_from_inception(&*self.read(), account_id)
    }

    /// Current balance recomputed from the latest checkpoint.
    pub fn replay_from_checkpoint(&self, account_id: AccountId) -> LedgerResult<AccountBalance> {
        AccountBalanceService::replay_from_checkpoint(&*self.read(), account_id)
    }

    /// Every history row of the account, oldest first.
    #[must_use]
    pub fn history(&self, account_id: AccountId) -> Vec<AccountBalanceHistory> {
        self.read().find_all_for_account(account_id)
    }

    /// A panicked writer never commits half a plan, so the data behind a
    /// poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, InMemoryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}
