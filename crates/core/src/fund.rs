//! Funds: named buckets that money is tracked against.

use fundledger_shared::types::FundId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LedgerError, LedgerResult, Violations};

/// A named bucket money is tracked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Unique identifier.
    pub id: FundId,
    /// Unique display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Storage for funds.
pub trait FundRepository {
    /// Looks up a fund by id.
    fn find_fund(&self, id: FundId) -> Option<Fund>;

    /// Looks up a fund by name.
    fn find_fund_by_name(&self, name: &str) -> Option<Fund>;

    /// Every fund.
    fn all_funds(&self) -> Vec<Fund>;

    /// Stores a new fund.
    fn add_fund(&mut self, fund: Fund);
}

/// Fund creation rules.
pub struct FundService;

impl FundService {
    /// Creates a fund with a unique, non-blank name.
    pub fn try_add<S>(store: &mut S, name: &str, description: &str) -> LedgerResult<Fund>
    where
        S: FundRepository + ?Sized,
    {
        let name = name.trim();
        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(LedgerError::BlankName);
        } else if store.find_fund_by_name(name).is_some() {
            errors.push(LedgerError::DuplicateFundName(name.to_string()));
        }
        Violations::check(errors)?;

        let fund = Fund {
            id: FundId::new(),
            name: name.to_string(),
            description: description.to_string(),
        };
        store.add_fund(fund.clone());
        info!(fund_id = %fund.id, name = %fund.name, "fund added");
        Ok(fund)
    }
}
