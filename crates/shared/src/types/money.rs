//! Fund-partitioned amounts with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` tagged with the fund it belongs to.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::FundId;

/// An amount of money tracked against a single fund.
///
/// A `FundAmount` with a zero amount is conceptually absent; [`normalize`]
/// drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundAmount {
    /// The fund the amount is tracked against.
    pub fund_id: FundId,
    /// Signed amount.
    pub amount: Decimal,
}

impl FundAmount {
    /// Creates a new fund amount.
    #[must_use]
    pub const fn new(fund_id: FundId, amount: Decimal) -> Self {
        Self { fund_id, amount }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns the same fund with the amount's sign flipped.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self::new(self.fund_id, -self.amount)
    }

    /// Returns the same fund with the amount multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self::new(self.fund_id, self.amount * factor)
    }
}

/// Groups amounts by fund, sums each group and drops the zero results.
///
/// The output holds at most one entry per fund, ordered by fund id so that two
/// normalized collections with the same content compare equal.
#[must_use]
pub fn normalize<I>(amounts: I) -> Vec<FundAmount>
where
    I: IntoIterator<Item = FundAmount>,
{
    let mut grouped: BTreeMap<FundId, Decimal> = BTreeMap::new();
    for fund_amount in amounts {
        *grouped.entry(fund_amount.fund_id).or_insert(Decimal::ZERO) += fund_amount.amount;
    }
    grouped
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(fund_id, amount)| FundAmount::new(fund_id, amount))
        .collect()
}

/// Sums the amounts across every fund.
#[must_use]
pub fn total(amounts: &[FundAmount]) -> Decimal {
    amounts.iter().map(|fund_amount| fund_amount.amount).sum()
}

/// Returns the amount held for `fund_id`, or zero when the fund is absent.
#[must_use]
pub fn amount_for(amounts: &[FundAmount], fund_id: FundId) -> Decimal {
    amounts
        .iter()
        .filter(|fund_amount| fund_amount.fund_id == fund_id)
        .map(|fund_amount| fund_amount.amount)
        .sum()
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
