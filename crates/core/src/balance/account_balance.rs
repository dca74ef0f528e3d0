//! Fund-partitioned account balance arithmetic.
//!
//! Every constructor renormalizes the three collections (group by fund, sum,
//! drop zeros) so long-lived balances never accumulate dust entries.

use fundledger_shared::types::{AccountId, FundAmount, FundId, amount_for, normalize, total};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountType;
use crate::error::{LedgerError, LedgerResult, Violations};
use crate::transaction::TransactionSide;

/// Balance of one account at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    account_id: AccountId,
    account_type: AccountType,
    fund_balances: Vec<FundAmount>,
    pending_debits: Vec<FundAmount>,
    pending_credits: Vec<FundAmount>,
}

impl AccountBalance {
    /// Balance of an account before its first event: no funds, nothing pending.
    #[must_use]
    pub fn zero(account_id: AccountId, account_type: AccountType) -> Self {
        Self {
            account_id,
            account_type,
            fund_balances: Vec::new(),
            pending_debits: Vec::new(),
            pending_credits: Vec::new(),
        }
    }

    /// Builds a normalized balance without checking invariants.
    ///
    /// Used to rehydrate stored snapshots; see [`Self::try_new`] for input
    /// that has not been validated yet.
    #[must_use]
    pub fn from_parts(
        account_id: AccountId,
        account_type: AccountType,
        fund_balances: Vec<FundAmount>,
        pending_debits: Vec<FundAmount>,
        pending_credits: Vec<FundAmount>,
    ) -> Self {
        Self {
            account_id,
            account_type,
            fund_balances: normalize(fund_balances),
            pending_debits: normalize(pending_debits),
            pending_credits: normalize(pending_credits),
        }
    }

    /// Builds a normalized balance and checks its invariants.
    pub fn try_new(
        account_id: AccountId,
        account_type: AccountType,
        fund_balances: Vec<FundAmount>,
        pending_debits: Vec<FundAmount>,
        pending_credits: Vec<FundAmount>,
    ) -> LedgerResult<Self> {
        Self::from_parts(
            account_id,
            account_type,
            fund_balances,
            pending_debits,
            pending_credits,
        )
        .validated()
    }

    /// The account this balance belongs to.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// The account's type.
    #[must_use]
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Posted amount per fund.
    #[must_use]
    pub fn fund_balances(&self) -> &[FundAmount] {
        &self.fund_balances
    }

    /// Pending debit amount per fund.
    #[must_use]
    pub fn pending_debits(&self) -> &[FundAmount] {
        &self.pending_debits
    }

    /// Pending credit amount per fund.
    #[must_use]
    pub fn pending_credits(&self) -> &[FundAmount] {
        &self.pending_credits
    }

    /// Sum of the posted fund balances.
    #[must_use]
    pub fn posted_balance(&self) -> Decimal {
        total(&self.fund_balances)
    }

    /// Posted balance minus pending debits. Debt accounts have no ceiling and return `None`.
    #[must_use]
    pub fn available_to_spend(&self) -> Option<Decimal> {
        match self.account_type {
            AccountType::Standard => Some(self.posted_balance() - total(&self.pending_debits)),
            AccountType::Debt => None,
        }
    }

    /// Posted amount held in `fund_id`.
    #[must_use]
    pub fn fund_balance(&self, fund_id: FundId) -> Decimal {
        amount_for(&self.fund_balances, fund_id)
    }

    /// Change the posted balance would see if everything pending were posted.
    #[must_use]
    pub fn pending_net(&self) -> Decimal {
        self.account_type.balance_change_factor(TransactionSide::Debit) * total(&self.pending_debits)
            + self.account_type.balance_change_factor(TransactionSide::Credit)
                * total(&self.pending_credits)
    }

    /// [`Self::pending_net`] restricted to one fund.
    #[must_use]
    pub fn fund_pending_net(&self, fund_id: FundId) -> Decimal {
        self.account_type.balance_change_factor(TransactionSide::Debit)
            * amount_for(&self.pending_debits, fund_id)
            + self.account_type.balance_change_factor(TransactionSide::Credit)
                * amount_for(&self.pending_credits, fund_id)
    }

    /// Returns true if any debit or credit is still pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending_debits.is_empty() || !self.pending_credits.is_empty()
    }

    /// Every invariant this balance breaks.
    #[must_use]
    pub fn violations(&self) -> Vec<LedgerError> {
        let mut errors = Vec::new();

        let posted_balance = self.posted_balance();
        if posted_balance < Decimal::ZERO {
            errors.push(LedgerError::NegativePostedBalance {
                account_id: self.account_id,
                posted_balance,
            });
        }

        if let Some(available) = self.available_to_spend()
            && available < Decimal::ZERO
        {
            errors.push(LedgerError::NegativeAvailableToSpend {
                account_id: self.account_id,
                available,
            });
        }

        for pending in self.pending_debits.iter().chain(&self.pending_credits) {
            if pending.is_negative() {
                errors.push(LedgerError::NegativePendingAmount {
                    account_id: self.account_id,
                    fund_id: pending.fund_id,
                    amount: pending.amount,
                });
            }
        }

        errors
    }

    /// Returns `self` if every invariant holds.
    pub fn validated(self) -> LedgerResult<Self> {
        Violations::check(self.violations())?;
        Ok(self)
    }

    /// Adds signed amounts straight to the posted fund balances.
    pub fn add_to_fund_balances(&self, changes: &[FundAmount]) -> LedgerResult<Self> {
        self.with_fund_changes(changes).validated()
    }

    /// Reserves `amounts` as pending debits.
    pub fn add_pending_debits(&self, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.add_pending(TransactionSide::Debit, amounts)
    }

    /// Reserves `amounts` as pending credits.
    pub fn add_pending_credits(&self, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.add_pending(TransactionSide::Credit, amounts)
    }

    /// Moves pending debits into the posted fund balances.
    ///
    /// A debit raises a debt account's balance and lowers a standard one.
    pub fn post_pending_debits(&self, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.post_pending(TransactionSide::Debit, amounts)
    }

    /// Moves pending credits into the posted fund balances.
    ///
    /// A credit lowers a debt account's balance and raises a standard one.
    pub fn post_pending_credits(&self, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.post_pending(TransactionSide::Credit, amounts)
    }

    /// Reserves `amounts` on `side`.
    pub fn add_pending(&self, side: TransactionSide, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.with_pending_added(side, amounts).validated()
    }

    /// Posts previously reserved `amounts` on `side`.
    pub fn post_pending(&self, side: TransactionSide, amounts: &[FundAmount]) -> LedgerResult<Self> {
        self.with_pending_posted(side, amounts).validated()
    }

    pub(crate) fn with_fund_changes(&self, changes: &[FundAmount]) -> Self {
        Self::from_parts(
            self.account_id,
            self.account_type,
            self.fund_balances.iter().chain(changes).copied().collect(),
            self.pending_debits.clone(),
            self.pending_credits.clone(),
        )
    }

    pub(crate) fn with_pending_added(&self, side: TransactionSide, amounts: &[FundAmount]) -> Self {
        self.with_pending_changes(side, amounts.iter().copied())
    }

    pub(crate) fn with_pending_posted(&self, side: TransactionSide, amounts: &[FundAmount]) -> Self {
        let factor = self.account_type.balance_change_factor(side);
        let posted: Vec<FundAmount> = amounts.iter().map(|amount| amount.scaled(factor)).collect();
        self.with_fund_changes(&posted)
            .with_pending_changes(side, amounts.iter().map(FundAmount::negated))
    }

    fn with_pending_changes<I>(&self, side: TransactionSide, changes: I) -> Self
    where
        I: IntoIterator<Item = FundAmount>,
    {
        let (mut debits, mut credits) = (self.pending_debits.clone(), self.pending_credits.clone());
        match side {
            TransactionSide::Debit => debits.extend(changes),
            TransactionSide::Credit => credits.extend(changes),
        }
        Self::from_parts(
            self.account_id,
            self.account_type,
            self.fund_balances.clone(),
            debits,
            credits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn standard_with(fund_id: FundId, amount: Decimal) -> AccountBalance {
        AccountBalance::try_new(
            AccountId::new(),
            AccountType::Standard,
            vec![FundAmount::new(fund_id, amount)],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_zero_balance() {
        let balance = AccountBalance::zero(AccountId::new(), AccountType::Standard);
        assert_eq!(balance.posted_balance(), Decimal::ZERO);
        assert_eq!(balance.available_to_spend(), Some(Decimal::ZERO));
        assert!(!balance.has_pending());
    }

    #[test]
    fn test_construction_normalizes() {
        let fund = FundId::new();
        let balance = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            vec![
                FundAmount::new(fund, dec!(10)),
                FundAmount::new(fund, dec!(15)),
                FundAmount::new(FundId::new(), dec!(0)),
            ],
            vec![FundAmount::new(fund, dec!(5)), FundAmount::new(fund, dec!(-5))],
            vec![],
        );
        assert_eq!(balance.fund_balances(), &[FundAmount::new(fund, dec!(25))]);
        assert!(balance.pending_debits().is_empty());
    }

    #[test]
    fn test_pending_debit_reduces_available_to_spend() {
        let fund = FundId::new();
        let balance = standard_with(fund, dec!(500.00));

        let pending = balance
            .add_pending_debits(&[FundAmount::new(fund, dec!(300.00))])
            .unwrap();
        assert_eq!(pending.posted_balance(), dec!(500.00));
        assert_eq!(pending.available_to_spend(), Some(dec!(200.00)));

        let posted = pending
            .post_pending_debits(&[FundAmount::new(fund, dec!(300.00))])
            .unwrap();
        assert_eq!(posted.posted_balance(), dec!(200.00));
        assert_eq!(posted.available_to_spend(), Some(dec!(200.00)));
        assert!(!posted.has_pending());
    }

    #[test]
    fn test_pending_debit_beyond_available_fails() {
        let fund = FundId::new();
        let balance = standard_with(fund, dec!(100.00));

        let err = balance
            .add_pending_debits(&[FundAmount::new(fund, dec!(100.01))])
            .unwrap_err();
        assert_eq!(err.codes(), vec!["NEGATIVE_AVAILABLE_TO_SPEND"]);
        assert!(err.has_kind(ErrorKind::InvariantViolation));
    }

    #[test]
    fn test_posting_credit_on_standard_account_adds() {
        let fund = FundId::new();
        let balance = standard_with(fund, dec!(20));

        let posted = balance
            .add_pending_credits(&[FundAmount::new(fund, dec!(80))])
            .and_then(|b| b.post_pending_credits(&[FundAmount::new(fund, dec!(80))]))
            .unwrap();
        assert_eq!(posted.fund_balance(fund), dec!(100));
    }

    #[test]
    fn test_debt_account_debits_increase_balance() {
        let fund = FundId::new();
        let balance = AccountBalance::zero(AccountId::new(), AccountType::Debt);

        let posted = balance
            .add_pending_debits(&[FundAmount::new(fund, dec!(75))])
            .and_then(|b| b.post_pending_debits(&[FundAmount::new(fund, dec!(75))]))
            .unwrap();
        assert_eq!(posted.posted_balance(), dec!(75));
        assert_eq!(posted.available_to_spend(), None);

        let paid = posted
            .add_pending_credits(&[FundAmount::new(fund, dec!(75))])
            .and_then(|b| b.post_pending_credits(&[FundAmount::new(fund, dec!(75))]))
            .unwrap();
        assert_eq!(paid.posted_balance(), Decimal::ZERO);
        assert!(paid.fund_balances().is_empty());
    }

    #[test]
    fn test_debt_account_cannot_be_overpaid() {
        let fund = FundId::new();
        let balance = AccountBalance::zero(AccountId::new(), AccountType::Debt)
            .add_pending_credits(&[FundAmount::new(fund, dec!(10))])
            .unwrap();

        let err = balance
            .post_pending_credits(&[FundAmount::new(fund, dec!(10))])
            .unwrap_err();
        assert_eq!(err.codes(), vec!["NEGATIVE_POSTED_BALANCE"]);
    }

    #[test]
    fn test_pending_net_sign_follows_account_type() {
        let fund = FundId::new();
        let standard = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            vec![FundAmount::new(fund, dec!(100))],
            vec![FundAmount::new(fund, dec!(30))],
            vec![FundAmount::new(fund, dec!(10))],
        );
        assert_eq!(standard.pending_net(), dec!(-20));
        assert_eq!(standard.fund_pending_net(fund), dec!(-20));
        assert_eq!(standard.fund_pending_net(FundId::new()), Decimal::ZERO);

        let debt = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Debt,
            vec![],
            vec![FundAmount::new(fund, dec!(30))],
            vec![FundAmount::new(fund, dec!(10))],
        );
        assert_eq!(debt.pending_net(), dec!(20));
    }

    #[test]
    fn test_violations_collects_every_problem() {
        let fund = FundId::new();
        let balance = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            vec![FundAmount::new(fund, dec!(-5))],
            vec![FundAmount::new(fund, dec!(-1))],
            vec![],
        );
        let codes: Vec<_> = balance.violations().iter().map(LedgerError::error_code).collect();
        assert_eq!(
            codes,
            vec![
                "NEGATIVE_POSTED_BALANCE",
                "NEGATIVE_AVAILABLE_TO_SPEND",
                "NEGATIVE_PENDING_AMOUNT"
            ]
        );
    }
}
