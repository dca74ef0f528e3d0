//! The combined storage seen by the services.

use crate::account::AccountRepository;
use crate::fund::FundRepository;
use crate::history::AccountBalanceHistoryRepository;
use crate::period::AccountingPeriodRepository;

/// Every repository the balance engine reads and writes.
pub trait LedgerStore:
    FundRepository + AccountRepository + AccountingPeriodRepository + AccountBalanceHistoryRepository
{
}

impl<T> LedgerStore for T where
    T: FundRepository
        + AccountRepository
        + AccountingPeriodRepository
        + AccountBalanceHistoryRepository
        + ?Sized
{
}
