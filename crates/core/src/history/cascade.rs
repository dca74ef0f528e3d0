//! Forward replay of an account's balance history.
//!
//! Pure: takes the balance in effect before the first affected row plus the
//! affected rows with their owning events, returns the rewritten rows. All
//! I/O happens in [`super::AccountBalanceHistoryService`].

use fundledger_shared::types::AccountingPeriodId;

use super::types::AccountBalanceHistory;
use crate::balance::AccountBalance;
use crate::error::{LedgerError, LedgerResult, Violations};
use crate::events::BalanceEvent;

/// One existing row to recompute.
#[derive(Debug, Clone)]
pub struct ReplayStep {
    /// The stored row.
    pub row: AccountBalanceHistory,
    /// The event that produced it.
    pub event: BalanceEvent,
    /// Sequence the row ends up with.
    pub sequence: u32,
    /// The owning closed period, if the row belongs to one.
    pub closed_period: Option<AccountingPeriodId>,
}

/// Re-applies every step's event on top of `start`, in order.
///
/// Returns only the rows whose snapshot or sequence changed. Replay keeps
/// going after a failed step so every violation is reported at once.
pub fn replay_forward(
    start: &AccountBalance,
    steps: &[ReplayStep],
) -> LedgerResult<Vec<AccountBalanceHistory>> {
    let mut running = start.clone();
    let mut rewritten = Vec::new();
    let mut errors = Vec::new();

    for step in steps {
        running = match step.event.apply_to_balance(&running) {
            Ok(next) => next,
            Err(violations) => {
                errors.extend(violations.into_errors());
                step.event.apply_unchecked(&running)
            }
        };

        let row = step.row.rewritten(step.sequence, &running);
        if row == step.row {
            continue;
        }
        if let Some(period_id) = step.closed_period {
            errors.push(LedgerError::ClosedHistoryAffected {
                account_id: step.row.account_id,
                event_id: step.event.id,
                period_id,
            });
        }
        rewritten.push(row);
    }

    Violations::check(errors)?;
    Ok(rewritten)
}
