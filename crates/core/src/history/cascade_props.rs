//! Property-based tests for forward replay.
//!
//! - Replaying rows on top of the balance they were built from rewrites nothing
//! - Raising the starting balance shifts every later snapshot by the same amount
//! - Closed rows are reported whenever replay would change them

use chrono::NaiveDate;
use fundledger_shared::types::{AccountId, FundAmount, FundId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::cascade::{ReplayStep, replay_forward};
use super::types::{AccountBalanceHistory, HistoryKey};
use crate::account::AccountType;
use crate::balance::AccountBalance;
use crate::events::{BalanceEvent, BalanceEventKind};
use crate::period::{AccountingPeriod, PeriodKey};

/// Strategy to generate positive amounts (0.01 to 1,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a day-ordered list of deposits and withdrawals.
fn history_strategy() -> impl Strategy<Value = Vec<(u32, Decimal, bool)>> {
    prop::collection::vec((1u32..=28, positive_amount(), any::<bool>()), 1..20).prop_map(|mut changes| {
        changes.sort_by_key(|(day, _, _)| *day);
        changes
    })
}

struct Built {
    account_id: AccountId,
    fund: FundId,
    steps: Vec<ReplayStep>,
}

/// Writes one row per accepted change, skipping withdrawals that would
/// overdraw, the same way a ledger that rejects them would end up.
fn build(changes: &[(u32, Decimal, bool)], closed: bool) -> Built {
    let mut period = AccountingPeriod::new(PeriodKey::new(2025, 3).unwrap());
    let account_id = AccountId::new();
    let fund = FundId::new();
    let mut balance = AccountBalance::zero(account_id, AccountType::Standard);
    let mut steps: Vec<ReplayStep> = Vec::new();

    for (day, amount, withdraw) in changes {
        let date = NaiveDate::from_ymd_opt(2025, 3, *day).unwrap();
        let signed = if *withdraw { -*amount } else { *amount };
        let event = BalanceEvent::new(
            &period,
            date,
            BalanceEventKind::ChangeInValue {
                account_id,
                entry: FundAmount::new(fund, signed),
            },
        );
        let Ok(next) = event.apply_to_balance(&balance) else {
            continue;
        };
        period.add_event(event.clone()).unwrap();
        balance = next;

        let same_day = steps.iter().filter(|step| step.row.date == date).count();
        let sequence = u32::try_from(same_day).unwrap() + 1;
        let row = AccountBalanceHistory::from_balance(event.id, HistoryKey::new(date, sequence), &balance);
        steps.push(ReplayStep {
            sequence,
            closed_period: closed.then_some(period.id),
            row,
            event,
        });
    }

    Built {
        account_id,
        fund,
        steps,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Idempotence
    // =========================================================================

    /// Replaying unchanged history from its own start rewrites no row, even
    /// when every row belongs to a closed period.
    #[test]
    fn prop_replay_from_same_start_is_noop(
        changes in history_strategy(),
        closed in any::<bool>(),
    ) {
        let built = build(&changes, closed);
        let start = AccountBalance::zero(built.account_id, AccountType::Standard);

        let rewritten = replay_forward(&start, &built.steps).unwrap();
        prop_assert!(rewritten.is_empty());
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// A higher starting balance raises every later snapshot by exactly the
    /// difference and never makes a row fail.
    #[test]
    fn prop_raised_start_shifts_every_row(
        changes in history_strategy(),
        extra in positive_amount(),
    ) {
        let built = build(&changes, false);
        prop_assume!(!built.steps.is_empty());
        let raised = AccountBalance::from_parts(
            built.account_id,
            AccountType::Standard,
            vec![FundAmount::new(built.fund, extra)],
            vec![],
            vec![],
        );

        let rewritten = replay_forward(&raised, &built.steps).unwrap();
        prop_assert_eq!(rewritten.len(), built.steps.len());
        for (row, step) in rewritten.iter().zip(&built.steps) {
            prop_assert_eq!(row.id, step.row.id);
            prop_assert_eq!(row.key(), step.row.key());
            let before = step.row.balance(AccountType::Standard).posted_balance();
            let after = row.balance(AccountType::Standard).posted_balance();
            prop_assert_eq!(after - before, extra);
        }
    }

    /// Renumbering rows without changing balances rewrites exactly the rows
    /// whose sequence moved.
    #[test]
    fn prop_sequence_shift_rewrites_moved_rows(
        changes in history_strategy(),
        shifted_day in 1u32..=28,
    ) {
        let mut built = build(&changes, false);
        let date = NaiveDate::from_ymd_opt(2025, 3, shifted_day).unwrap();
        let mut moved = 0;
        for step in &mut built.steps {
            if step.row.date == date {
                step.sequence += 1;
                moved += 1;
            }
        }
        let start = AccountBalance::zero(built.account_id, AccountType::Standard);

        let rewritten = replay_forward(&start, &built.steps).unwrap();
        prop_assert_eq!(rewritten.len(), moved);
        prop_assert!(rewritten.iter().all(|row| row.date == date));
    }

    // =========================================================================
    // Closed history
    // =========================================================================

    /// Every row of a closed period that replay would change is reported.
    #[test]
    fn prop_closed_rows_are_protected(
        changes in history_strategy(),
        extra in positive_amount(),
    ) {
        let built = build(&changes, true);
        prop_assume!(!built.steps.is_empty());
        let raised = AccountBalance::from_parts(
            built.account_id,
            AccountType::Standard,
            vec![FundAmount::new(built.fund, extra)],
            vec![],
            vec![],
        );

        let violations = replay_forward(&raised, &built.steps).unwrap_err();
        let reported = violations
            .codes()
            .iter()
            .filter(|code| **code == "CLOSED_HISTORY_AFFECTED")
            .count();
        prop_assert_eq!(reported, built.steps.len());
    }
}
