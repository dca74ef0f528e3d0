//! Storage for the Fundledger balance engine.
//!
//! This crate provides:
//! - [`InMemoryStore`], implementing every repository trait of `fundledger-core`
//! - [`Ledger`], a cloneable handle that serializes mutations and shares reads

pub mod ledger;
pub mod memory;

pub use ledger::Ledger;
pub use memory::InMemoryStore;
