//! Balance propagation engine for a personal double-entry fund ledger.
//!
//! This crate holds the domain rules only. It has no storage of its own:
//! services read and write through the repository traits gathered in
//! [`store::LedgerStore`], and an in-memory implementation lives in
//! `fundledger-store`.
//!
//! # Modules
//!
//! - `balance` - Account balances and balance queries
//! - `events` - Balance-affecting events and their application rules
//! - `history` - Per-account balance history and cascade replay
//! - `period` - Accounting periods, checkpoints and period close
//! - `transaction` - Transactions and posting
//! - `account` - Accounts and balance direction
//! - `fund` - Funds

pub mod account;
pub mod balance;
pub mod error;
pub mod events;
pub mod fund;
pub mod history;
pub mod period;
pub mod store;
pub mod transaction;

pub use account::{Account, AccountService, AccountType, CreateAccountRequest};
pub use balance::{AccountBalance, AccountBalanceByAccountingPeriod, AccountBalanceService};
pub use error::{ErrorKind, LedgerError, LedgerResult, Violations};
pub use events::{
    BalanceEvent, BalanceEventKind, BalanceEventService, CreateChangeInValueRequest, CreateFundConversionRequest,
};
pub use fund::{Fund, FundService};
pub use history::{AccountBalanceHistory, AccountBalanceHistoryService, HistoryChangeSet, HistoryKey};
pub use period::{AccountBalanceCheckpoint, AccountingPeriod, AccountingPeriodService, PeriodKey};
pub use store::LedgerStore;
pub use transaction::{CreateTransactionRequest, Transaction, TransactionService, TransactionSide};
