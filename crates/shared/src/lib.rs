//! Shared types and configuration for Fundledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Fund amounts with decimal precision and normalization
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, LedgerSettings, LoggingConfig};
