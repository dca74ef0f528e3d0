//! Accounts and the direction their balances move in.

pub mod service;
pub mod types;

use fundledger_shared::types::AccountId;

pub use service::{AccountService, CreateAccountRequest};
pub use types::{Account, AccountType};

/// Storage for accounts.
pub trait AccountRepository {
    /// Looks up an account by id.
    fn find_account(&self, id: AccountId) -> Option<Account>;

    /// Looks up an account by name.
    fn find_account_by_name(&self, name: &str) -> Option<Account>;

    /// Every account.
    fn all_accounts(&self) -> Vec<Account>;

    /// Stores a new account.
    fn add_account(&mut self, account: Account);
}
