//! Account domain types.

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, BalanceEventId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::PeriodKey;
use crate::transaction::TransactionSide;

/// How an account's balance reacts to debits and credits.
///
/// - Standard: credits increase the balance, debits decrease it
/// - Debt: debits increase the amount owed, credits pay it down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset-like account (checking, savings, cash).
    Standard,
    /// Liability-like account (credit card, loan).
    Debt,
}

impl AccountType {
    /// Sign applied to an amount on `side` when it reaches the posted balance.
    #[must_use]
    pub fn balance_change_factor(self, side: TransactionSide) -> Decimal {
        match (self, side) {
            (Self::Debt, TransactionSide::Debit) | (Self::Standard, TransactionSide::Credit) => {
                Decimal::ONE
            }
            _ => Decimal::NEGATIVE_ONE,
        }
    }

    /// Returns true for debt accounts.
    #[must_use]
    pub fn is_debt(self) -> bool {
        matches!(self, Self::Debt)
    }
}

/// An account holding fund-partitioned balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique display name.
    pub name: String,
    /// Balance direction.
    pub account_type: AccountType,
    /// The AccountAdded event that opened the account.
    pub added_event_id: BalanceEventId,
    /// Date of the AccountAdded event.
    pub added_date: NaiveDate,
    /// Month of the period owning the AccountAdded event.
    pub added_period: PeriodKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountType::Standard, TransactionSide::Debit, Decimal::NEGATIVE_ONE)]
    #[case(AccountType::Standard, TransactionSide::Credit, Decimal::ONE)]
    #[case(AccountType::Debt, TransactionSide::Debit, Decimal::ONE)]
    #[case(AccountType::Debt, TransactionSide::Credit, Decimal::NEGATIVE_ONE)]
    fn test_balance_change_factor(
        #[case] account_type: AccountType,
        #[case] side: TransactionSide,
        #[case] expected: Decimal,
    ) {
        assert_eq!(account_type.balance_change_factor(side), expected);
    }

    #[test]
    fn test_is_debt() {
        assert!(AccountType::Debt.is_debt());
        assert!(!AccountType::Standard.is_debt());
    }
}
