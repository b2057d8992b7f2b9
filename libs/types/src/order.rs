//! Order lifecycle types

use crate::ids::{AccountId, MarketId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// A resting or incoming request to trade.
///
/// The price is immutable once resting; the engine never re-prices an
/// order. Only the matching engine mutates `remaining_quantity`, and an
/// order whose remaining quantity reaches zero is removed from the book
/// immediately; it is never stored at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader: AccountId,
    pub market: MarketId,
    pub side: Side,
    pub price: Price,
    /// Quantity requested at placement.
    pub quantity: Quantity,
    /// Base-unit quantity still open.
    pub remaining_quantity: Quantity,
    /// Placement time in unix nanos; the FIFO tie-breaker within a price
    /// level.
    pub created_at: i64,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        trader: AccountId,
        market: MarketId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id,
            trader,
            market,
            side,
            price,
            quantity,
            remaining_quantity: quantity,
            created_at: timestamp,
        }
    }

    /// Quantity executed so far.
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity.saturating_sub(self.remaining_quantity)
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Consume part of the remaining quantity.
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity; the engine always
    /// fills `min(remaining, counter-remaining)`.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "fill exceeds remaining quantity"
        );
        self.remaining_quantity = self.remaining_quantity.saturating_sub(quantity);
    }
}
