//! Property-based tests for AccountBalance arithmetic.
//!
//! - Normalization does not depend on input order
//! - A successfully applied event never leaves a balance breaking an invariant
//! - Pending amounts that are posted end up where a direct change would
//! - Fund conversions move value between funds without changing the total

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, FundAmount, FundId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::AccountBalance;
use crate::account::AccountType;
use crate::events::{BalanceEvent, BalanceEventKind};
use crate::period::{AccountingPeriod, PeriodKey};
use crate::transaction::TransactionSide;

/// Strategy to generate positive amounts (0.01 to 5,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate signed, non-zero amounts (-5,000.00 to 5,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![positive_amount(), positive_amount().prop_map(|amount| -amount)]
}

/// Strategy to generate (fund slot, amount) pairs over a pool of three funds.
fn slotted_amounts(max: usize) -> impl Strategy<Value = Vec<(usize, Decimal)>> {
    prop::collection::vec((0usize..3, positive_amount()), 1..max)
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![Just(AccountType::Standard), Just(AccountType::Debt)]
}

fn fund_pool() -> [FundId; 3] {
    [FundId::new(), FundId::new(), FundId::new()]
}

fn entries(funds: &[FundId; 3], slots: &[(usize, Decimal)]) -> Vec<FundAmount> {
    slots
        .iter()
        .map(|(slot, amount)| FundAmount::new(funds[*slot], *amount))
        .collect()
}

fn change_in_value(period: &AccountingPeriod, account_id: AccountId, entry: FundAmount) -> BalanceEvent {
    BalanceEvent::new(
        period,
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        BalanceEventKind::ChangeInValue { account_id, entry },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Normalization
    // =========================================================================

    /// Shuffling the input amounts never changes the constructed balance.
    #[test]
    fn prop_normalization_ignores_order(
        slots in slotted_amounts(12),
        seed in any::<u64>(),
    ) {
        let funds = fund_pool();
        let account_id = AccountId::new();
        let amounts = entries(&funds, &slots);
        let mut reordered = amounts.clone();
        let len = reordered.len();
        reordered.rotate_left(usize::try_from(seed % len as u64).unwrap());
        reordered.reverse();

        let a = AccountBalance::from_parts(account_id, AccountType::Standard, amounts, vec![], vec![]);
        let b = AccountBalance::from_parts(account_id, AccountType::Standard, reordered, vec![], vec![]);

        prop_assert_eq!(&a, &b);
        prop_assert!(a.fund_balances().iter().all(|entry| !entry.is_zero()));
        prop_assert!(a.fund_balances().windows(2).all(|pair| pair[0].fund_id < pair[1].fund_id));
    }

    // =========================================================================
    // Appliability
    // =========================================================================

    /// Walking a random series of changes in value, every accepted step keeps
    /// the invariants and every rejected step is exactly one that would not.
    #[test]
    fn prop_accepted_changes_keep_invariants(
        amounts in prop::collection::vec((0usize..3, signed_amount()), 1..30),
        account_type in account_type_strategy(),
    ) {
        let funds = fund_pool();
        let period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let account_id = AccountId::new();
        let mut balance = AccountBalance::zero(account_id, account_type);

        for (slot, amount) in amounts {
            let event = change_in_value(&period, account_id, FundAmount::new(funds[slot], amount));
            let appliable = event.is_appliable(&balance);
            match event.apply_to_balance(&balance) {
                Ok(next) => {
                    prop_assert!(appliable);
                    prop_assert!(next.violations().is_empty());
                    prop_assert!(next.posted_balance() >= Decimal::ZERO);
                    balance = next;
                }
                Err(_) => {
                    prop_assert!(!appliable);
                    prop_assert!(balance.posted_balance() + amount < Decimal::ZERO);
                }
            }
        }
    }

    /// Reversing an applied change in value restores the original balance.
    #[test]
    fn prop_change_in_value_reverses(
        opening in slotted_amounts(6),
        slot in 0usize..3,
        amount in signed_amount(),
    ) {
        let funds = fund_pool();
        let period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let account_id = AccountId::new();
        let balance = AccountBalance::from_parts(
            account_id,
            AccountType::Standard,
            entries(&funds, &opening),
            vec![],
            vec![],
        );
        let event = change_in_value(&period, account_id, FundAmount::new(funds[slot], amount));
        prop_assume!(event.is_appliable(&balance));

        let applied = event.apply_to_balance(&balance).unwrap();
        let reversed = event.reverse_from_balance(&applied).unwrap();
        prop_assert_eq!(reversed, balance);
    }

    // =========================================================================
    // Pending and posting
    // =========================================================================

    /// Adding an amount as pending and posting it lands on the same balance
    /// as changing the fund balances directly by the signed amount.
    #[test]
    fn prop_post_matches_direct_change(
        opening in slotted_amounts(6),
        pending in slotted_amounts(6),
        account_type in account_type_strategy(),
        debit in any::<bool>(),
    ) {
        let funds = fund_pool();
        let side = if debit { TransactionSide::Debit } else { TransactionSide::Credit };
        let account_id = AccountId::new();
        let start = AccountBalance::from_parts(account_id, account_type, entries(&funds, &opening), vec![], vec![]);
        let amounts = entries(&funds, &pending);

        let factor = account_type.balance_change_factor(side);
        let direct = start.with_fund_changes(
            &amounts.iter().map(|amount| amount.scaled(factor)).collect::<Vec<_>>(),
        );
        let posted = start
            .with_pending_added(side, &amounts)
            .with_pending_posted(side, &amounts);

        prop_assert!(!posted.has_pending());
        prop_assert_eq!(posted, direct);
    }

    /// A pending debit on a standard account lowers available-to-spend by its
    /// total and leaves the posted balance alone.
    #[test]
    fn prop_pending_debit_reserves_available(
        opening in slotted_amounts(6),
        pending in slotted_amounts(4),
    ) {
        let funds = fund_pool();
        let start = AccountBalance::from_parts(
            AccountId::new(),
            AccountType::Standard,
            entries(&funds, &opening),
            vec![],
            vec![],
        );
        let amounts = entries(&funds, &pending);
        let reserved: Decimal = amounts.iter().map(|amount| amount.amount).sum();

        let next = start.with_pending_added(TransactionSide::Debit, &amounts);
        prop_assert_eq!(next.posted_balance(), start.posted_balance());
        prop_assert_eq!(
            next.available_to_spend(),
            start.available_to_spend().map(|available| available - reserved)
        );
    }

    // =========================================================================
    // Fund conversion
    // =========================================================================

    /// An accepted conversion keeps the posted total and moves exactly the
    /// converted amount.
    #[test]
    fn prop_conversion_preserves_total(
        opening in slotted_amounts(6),
        amount in positive_amount(),
    ) {
        let funds = fund_pool();
        let period = AccountingPeriod::new(PeriodKey::new(2025, 1).unwrap());
        let account_id = AccountId::new();
        let balance = AccountBalance::from_parts(
            account_id,
            AccountType::Standard,
            entries(&funds, &opening),
            vec![],
            vec![],
        );
        let event = BalanceEvent::new(
            &period,
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            BalanceEventKind::FundConversion {
                account_id,
                from_fund: funds[0],
                to_fund: funds[1],
                amount,
            },
        );

        match event.apply_to_balance(&balance) {
            Ok(next) => {
                prop_assert_eq!(next.posted_balance(), balance.posted_balance());
                prop_assert_eq!(next.fund_balance(funds[0]), balance.fund_balance(funds[0]) - amount);
                prop_assert_eq!(next.fund_balance(funds[1]), balance.fund_balance(funds[1]) + amount);
            }
            Err(violations) => {
                prop_assert!(balance.fund_balance(funds[0]) < amount);
                prop_assert_eq!(violations.codes(), vec!["INSUFFICIENT_FUND_BALANCE"]);
            }
        }
    }
}
