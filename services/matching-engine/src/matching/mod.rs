//! Matching logic
//!
//! Crossing detection plus trade construction with sequence and fee
//! assignment.

pub mod crossing;
pub mod executor;

pub use crossing::crosses;
pub use executor::MatchExecutor;
