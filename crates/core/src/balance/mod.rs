//! Account balances and balance queries.

pub mod account_balance;
pub mod service;

#[cfg(test)]
mod account_balance_props;

pub use account_balance::AccountBalance;
pub use service::{AccountBalanceByAccountingPeriod, AccountBalanceService};
