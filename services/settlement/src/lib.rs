//! Settlement service
//!
//! Wraps the matching engine with escrow-backed settlement: funds are
//! escrowed before matching, transfers run only after the book has
//! committed, and any post-commit transfer failure halts the pair instead
//! of being retried.
//!
//! # Modules
//! - `ledger`: the custody contract and an in-memory implementation
//! - `config`: explicit construction-time engine configuration
//! - `coordinator`: the escrow → match → settle → release sequencer

pub mod config;
pub mod coordinator;
pub mod ledger;

pub use config::EngineConfig;
pub use coordinator::{
    CancelOrderError, PlaceOrderError, SettlementCoordinator, SettlementFault,
};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
