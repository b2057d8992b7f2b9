//! Order book infrastructure
//!
//! Price-level buckets keyed by price, FIFO queues within a level. Both
//! sides expose the same contract: best price access, sorted insertion,
//! removal with eager pruning of empty levels.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::PriceLevel;
