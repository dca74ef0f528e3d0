//! Transactions between accounts.
//!
//! A transaction is recorded as pending on each side when added and becomes
//! final per side when posted. Sides post independently.

pub mod service;
pub mod types;

pub use service::TransactionService;
pub use types::{CreateTransactionRequest, Transaction, TransactionAccount, TransactionSide};
