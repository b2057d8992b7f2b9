//! Matching engine service
//!
//! Price-time-priority limit order matching for a single trading pair.
//!
//! **Key invariants:**
//! - Both book sides fully sorted at all times; FIFO within a price level
//! - Execution at the maker's quoted price: price improvement accrues to
//!   the taker, resting orders never execute worse than quoted
//! - No order with zero remaining quantity is ever stored
//! - Order ids strictly increasing, never reused
//!
//! The engine mutates only in-memory state and performs no transfers; the
//! settlement service sequences escrow and fund movement around it.

pub mod book;
pub mod engine;
pub mod events;
pub mod matching;

pub use engine::{BookSnapshot, MatchingEngine, Placement, SelfTradePolicy};
