//! Balance-affecting events.
//!
//! A single tagged union covers every way an account balance can change. Each
//! variant knows how to apply itself to an [`crate::balance::AccountBalance`]
//! and whether doing so would break an invariant.

pub mod apply;
pub mod service;
pub mod types;
pub(crate) mod validation;

pub use service::{BalanceEventService, CreateChangeInValueRequest, CreateFundConversionRequest};
pub use types::{BalanceEvent, BalanceEventKind};
