//! How each balance event transforms an account balance.
//!
//! Appliability rules:
//! - Increasing changes (positive change in value, starting balances, postings) are always appliable
//! - A decreasing change needs `min(posted, posted + pending_net) + delta >= 0`, so pending
//!   decreases count against the floor while pending increases do not
//! - A fund conversion applies the same floor to the source fund alone
//!
//! The resulting balance must also satisfy the [`AccountBalance`] invariants.

use fundledger_shared::types::{AccountId, FundAmount, total};
use rust_decimal::Decimal;

use super::types::{BalanceEvent, BalanceEventKind};
use crate::balance::AccountBalance;
use crate::error::{LedgerError, LedgerResult, Violations};

impl BalanceEvent {
    /// Applies the event to `balance`, checking every rule.
    pub fn apply_to_balance(&self, balance: &AccountBalance) -> LedgerResult<AccountBalance> {
        self.ensure_affects(balance.account_id())?;

        let mut errors: Vec<LedgerError> = self.floor_violation(balance).into_iter().collect();
        let next = self.apply_unchecked(balance);
        errors.extend(next.violations());
        Violations::check(errors)?;
        Ok(next)
    }

    /// Returns true if [`Self::apply_to_balance`] would succeed.
    #[must_use]
    pub fn is_appliable(&self, balance: &AccountBalance) -> bool {
        self.apply_to_balance(balance).is_ok()
    }

    /// Undoes the event on `balance`.
    ///
    /// Only events applied straight to posted fund balances can be reversed;
    /// transaction events are deleted and the history recomputed instead.
    pub fn reverse_from_balance(&self, balance: &AccountBalance) -> LedgerResult<AccountBalance> {
        self.ensure_affects(balance.account_id())?;
        let changes = match &self.kind {
            BalanceEventKind::AccountAdded {
                starting_balances, ..
            } => starting_balances.iter().map(FundAmount::negated).collect(),
            BalanceEventKind::FundConversion {
                from_fund,
                to_fund,
                amount,
                ..
            } => vec![
                FundAmount::new(*from_fund, *amount),
                FundAmount::new(*to_fund, -*amount),
            ],
            BalanceEventKind::ChangeInValue { entry, .. } => vec![entry.negated()],
            BalanceEventKind::TransactionAdded { .. } | BalanceEventKind::TransactionPosted { .. } => {
                return Err(LedgerError::NotReversible(self.id).into());
            }
        };
        balance.add_to_fund_balances(&changes)
    }

    /// Applies the event's effect without checking anything.
    ///
    /// Used when recomputing from history that was validated when it was written.
    pub(crate) fn apply_unchecked(&self, balance: &AccountBalance) -> AccountBalance {
        if !self.affects(balance.account_id()) {
            return balance.clone();
        }
        match &self.kind {
            BalanceEventKind::AccountAdded {
                starting_balances, ..
            } => balance.with_fund_changes(starting_balances),
            BalanceEventKind::TransactionAdded { entries, .. } => {
                match self.side_for(balance.account_id()) {
                    Some(side) => balance.with_pending_added(side, entries),
                    None => balance.clone(),
                }
            }
            BalanceEventKind::TransactionPosted { side, entries, .. } => {
                balance.with_pending_posted(*side, entries)
            }
            BalanceEventKind::FundConversion {
                from_fund,
                to_fund,
                amount,
                ..
            } => balance.with_fund_changes(&[
                FundAmount::new(*from_fund, -*amount),
                FundAmount::new(*to_fund, *amount),
            ]),
            BalanceEventKind::ChangeInValue { entry, .. } => balance.with_fund_changes(&[*entry]),
        }
    }

    fn ensure_affects(&self, account_id: AccountId) -> Result<(), LedgerError> {
        if self.affects(account_id) {
            Ok(())
        } else {
            Err(LedgerError::EventDoesNotAffectAccount {
                event_id: self.id,
                account_id,
            })
        }
    }

    fn floor_violation(&self, balance: &AccountBalance) -> Option<LedgerError> {
        match &self.kind {
            BalanceEventKind::TransactionAdded { entries, .. } => {
                let side = self.side_for(balance.account_id())?;
                let delta = balance.account_type().balance_change_factor(side) * total(entries);
                account_floor_violation(balance, delta)
            }
            BalanceEventKind::ChangeInValue { entry, .. } => account_floor_violation(balance, entry.amount),
            BalanceEventKind::FundConversion {
                from_fund, amount, ..
            } => {
                let held = balance.fund_balance(*from_fund);
                let available = held.min(held + balance.fund_pending_net(*from_fund));
                (available < *amount).then(|| LedgerError::InsufficientFundBalance {
                    account_id: balance.account_id(),
                    fund_id: *from_fund,
                    available,
                    requested: *amount,
                })
            }
            BalanceEventKind::AccountAdded { .. } | BalanceEventKind::TransactionPosted { .. } => None,
        }
    }
}

fn account_floor_violation(balance: &AccountBalance, delta: Decimal) -> Option<LedgerError> {
    if delta >= Decimal::ZERO {
        return None;
    }
    let posted = balance.posted_balance();
    let available = posted.min(posted + balance.pending_net());
    (available + delta < Decimal::ZERO).then(|| LedgerError::InsufficientBalance {
        account_id: balance.account_id(),
        available,
        requested: -delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::error::ErrorKind;
    use crate::period::{AccountingPeriod, PeriodKey};
    use crate::transaction::TransactionSide;
    use chrono::NaiveDate;
    use fundledger_shared::types::{FundId, TransactionId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    struct Fixture {
        period: AccountingPeriod,
        account_id: AccountId,
        fund: FundId,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                period: AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap()),
                account_id: AccountId::new(),
                fund: FundId::new(),
            }
        }

        fn event(&self, kind: BalanceEventKind) -> BalanceEvent {
            BalanceEvent::new(&self.period, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), kind)
        }

        fn balance(&self, account_type: AccountType, posted: Decimal) -> AccountBalance {
            AccountBalance::from_parts(
                self.account_id,
                account_type,
                vec![FundAmount::new(self.fund, posted)],
                vec![],
                vec![],
            )
        }

        fn change_in_value(&self, amount: Decimal) -> BalanceEvent {
            self.event(BalanceEventKind::ChangeInValue {
                account_id: self.account_id,
                entry: FundAmount::new(self.fund, amount),
            })
        }

        fn debit(&self, amount: Decimal) -> BalanceEvent {
            self.event(BalanceEventKind::TransactionAdded {
                transaction_id: TransactionId::new(),
                debit_account: Some(self.account_id),
                credit_account: None,
                entries: vec![FundAmount::new(self.fund, amount)],
            })
        }
    }

    #[test]
    fn test_change_in_value_below_zero_fails() {
        let fx = Fixture::new();
        let balance = fx.balance(AccountType::Standard, dec!(1000.00));

        let err = fx.change_in_value(dec!(-1200.00)).apply_to_balance(&balance).unwrap_err();
        assert!(err.has_kind(ErrorKind::InvariantViolation));
        assert!(err.codes().contains(&"INSUFFICIENT_BALANCE"));
        assert!(err.codes().contains(&"NEGATIVE_POSTED_BALANCE"));
    }

    #[rstest]
    #[case(dec!(50), true)]
    #[case(dec!(-100), true)]
    #[case(dec!(-100.01), false)]
    fn test_change_in_value_appliability(#[case] amount: Decimal, #[case] appliable: bool) {
        let fx = Fixture::new();
        let balance = fx.balance(AccountType::Standard, dec!(100));
        assert_eq!(fx.change_in_value(amount).is_appliable(&balance), appliable);
    }

    #[test]
    fn test_pending_decreases_count_against_the_floor() {
        let fx = Fixture::new();
        let balance = fx
            .balance(AccountType::Standard, dec!(100))
            .with_pending_added(TransactionSide::Debit, &[FundAmount::new(fx.fund, dec!(80))]);

        assert!(!fx.change_in_value(dec!(-30)).is_appliable(&balance));
        assert!(fx.change_in_value(dec!(-20)).is_appliable(&balance));
    }

    #[test]
    fn test_pending_increases_do_not_raise_the_floor() {
        let fx = Fixture::new();
        let balance = fx
            .balance(AccountType::Standard, dec!(100))
            .with_pending_added(TransactionSide::Credit, &[FundAmount::new(fx.fund, dec!(500))]);

        assert!(!fx.change_in_value(dec!(-150)).is_appliable(&balance));
        assert!(fx.change_in_value(dec!(-100)).is_appliable(&balance));
    }

    #[test]
    fn test_transaction_added_reserves_pending() {
        let fx = Fixture::new();
        let balance = fx.balance(AccountType::Standard, dec!(500.00));

        let next = fx.debit(dec!(300.00)).apply_to_balance(&balance).unwrap();
        assert_eq!(next.available_to_spend(), Some(dec!(200.00)));
        assert_eq!(next.posted_balance(), dec!(500.00));

        assert!(!fx.debit(dec!(500.01)).is_appliable(&balance));
    }

    #[test]
    fn test_transaction_added_on_debt_account_is_increasing() {
        let fx = Fixture::new();
        let balance = AccountBalance::zero(fx.account_id, AccountType::Debt);
        let next = fx.debit(dec!(900)).apply_to_balance(&balance).unwrap();
        assert_eq!(next.pending_debits(), &[FundAmount::new(fx.fund, dec!(900))]);
    }

    #[test]
    fn test_transaction_posted_moves_pending() {
        let fx = Fixture::new();
        let entries = vec![FundAmount::new(fx.fund, dec!(300.00))];
        let pending = fx
            .balance(AccountType::Standard, dec!(500.00))
            .with_pending_added(TransactionSide::Debit, &entries);
        let posted = fx.event(BalanceEventKind::TransactionPosted {
            transaction_id: TransactionId::new(),
            account_id: fx.account_id,
            side: TransactionSide::Debit,
            entries,
        });

        let next = posted.apply_to_balance(&pending).unwrap();
        assert_eq!(next.posted_balance(), dec!(200.00));
        assert_eq!(next.available_to_spend(), Some(dec!(200.00)));
        assert!(!next.has_pending());
    }

    #[test]
    fn test_fund_conversion_requires_source_fund_balance() {
        let fx = Fixture::new();
        let to_fund = FundId::new();
        let balance = fx.balance(AccountType::Standard, dec!(50.00));
        let conversion = fx.event(BalanceEventKind::FundConversion {
            account_id: fx.account_id,
            from_fund: fx.fund,
            to_fund,
            amount: dec!(100.00),
        });

        let err = conversion.apply_to_balance(&balance).unwrap_err();
        assert_eq!(err.codes(), vec!["INSUFFICIENT_FUND_BALANCE"]);
    }

    #[test]
    fn test_fund_conversion_moves_amount() {
        let fx = Fixture::new();
        let to_fund = FundId::new();
        let balance = fx.balance(AccountType::Standard, dec!(150.00));
        let conversion = fx.event(BalanceEventKind::FundConversion {
            account_id: fx.account_id,
            from_fund: fx.fund,
            to_fund,
            amount: dec!(100.00),
        });

        let next = conversion.apply_to_balance(&balance).unwrap();
        assert_eq!(next.fund_balance(fx.fund), dec!(50.00));
        assert_eq!(next.fund_balance(to_fund), dec!(100.00));
        assert_eq!(next.posted_balance(), dec!(150.00));

        assert_eq!(conversion.reverse_from_balance(&next).unwrap(), balance);
    }

    #[test]
    fn test_reverse_change_in_value_and_account_added() {
        let fx = Fixture::new();
        let balance = fx.balance(AccountType::Standard, dec!(10));
        let change = fx.change_in_value(dec!(15));
        let after = change.apply_to_balance(&balance).unwrap();
        assert_eq!(change.reverse_from_balance(&after).unwrap(), balance);

        let added = fx.event(BalanceEventKind::AccountAdded {
            account_id: fx.account_id,
            starting_balances: vec![FundAmount::new(fx.fund, dec!(10))],
        });
        let empty = added.reverse_from_balance(&balance).unwrap();
        assert!(empty.fund_balances().is_empty());
    }

    #[test]
    fn test_transaction_events_are_not_reversible() {
        let fx = Fixture::new();
        let balance = fx.balance(AccountType::Standard, dec!(10));
        let err = fx.debit(dec!(5)).reverse_from_balance(&balance).unwrap_err();
        assert_eq!(err.codes(), vec!["NOT_REVERSIBLE"]);
    }

    #[test]
    fn test_event_for_other_account_is_rejected() {
        let fx = Fixture::new();
        let other = AccountBalance::zero(AccountId::new(), AccountType::Standard);
        let err = fx.change_in_value(dec!(5)).apply_to_balance(&other).unwrap_err();
        assert!(err.has_kind(ErrorKind::ReferentialViolation));
        assert_eq!(fx.change_in_value(dec!(5)).apply_unchecked(&other), other);
    }
}
