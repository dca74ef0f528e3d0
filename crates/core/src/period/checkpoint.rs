//! Balance checkpoints written at accounting period boundaries.

use fundledger_shared::types::{
    AccountBalanceCheckpointId, AccountId, AccountingPeriodId, FundAmount, total,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountType;
use crate::balance::AccountBalance;
use crate::error::LedgerError;

/// Posted fund balances an account carries into a period.
///
/// Checkpoints are only written from the ending balance of a closed period,
/// where nothing is pending, and are never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceCheckpoint {
    /// Unique identifier.
    pub id: AccountBalanceCheckpointId,
    /// The account.
    pub account_id: AccountId,
    /// The period the balance is carried into.
    pub period_id: AccountingPeriodId,
    /// Posted amount per fund.
    pub fund_balances: Vec<FundAmount>,
}

impl AccountBalanceCheckpoint {
    /// Captures the posted part of `balance` as the starting point of `period_id`.
    pub fn try_new(period_id: AccountingPeriodId, balance: &AccountBalance) -> Result<Self, LedgerError> {
        let fund_balances = balance.fund_balances().to_vec();
        let sum = total(&fund_balances);
        if sum < Decimal::ZERO {
            return Err(LedgerError::NegativeCheckpoint {
                account_id: balance.account_id(),
                period_id,
                balance: sum,
            });
        }
        Ok(Self {
            id: AccountBalanceCheckpointId::new(),
            account_id: balance.account_id(),
            period_id,
            fund_balances,
        })
    }

    /// The balance the account starts the period with.
    #[must_use]
    pub fn starting_balance(&self, account_type: AccountType) -> AccountBalance {
        AccountBalance::from_parts(
            self.account_id,
            account_type,
            self.fund_balances.clone(),
            Vec::new(),
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundledger_shared::types::FundId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checkpoint_keeps_posted_balances_only() {
        let fund = FundId::new();
        let balance = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            vec![FundAmount::new(fund, dec!(120))],
            vec![FundAmount::new(fund, dec!(20))],
            vec![],
        );
        let checkpoint = AccountBalanceCheckpoint::try_new(AccountingPeriodId::new(), &balance).unwrap();
        let starting = checkpoint.starting_balance(AccountType::Standard);

        assert_eq!(starting.posted_balance(), dec!(120));
        assert!(!starting.has_pending());
        assert_eq!(starting.account_id(), balance.account_id());
    }

    #[test]
    fn test_negative_checkpoint_rejected() {
        let balance = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            vec![FundAmount::new(FundId::new(), dec!(-1))],
            vec![],
            vec![],
        );
        let err = AccountBalanceCheckpoint::try_new(AccountingPeriodId::new(), &balance).unwrap_err();
        assert_eq!(err.error_code(), "NEGATIVE_CHECKPOINT");
    }
}
