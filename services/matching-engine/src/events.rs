//! Events emitted for every book state transition
//!
//! The stream is reconstruction-complete: replaying placements, trades,
//! and cancellations in order rebuilds the book exactly. Rejected requests
//! never reach the book, so they produce no event here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{AccountId, MarketId, OrderId, TradeId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// An order was accepted and entered the match loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub trader: AccountId,
    pub market: MarketId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: i64,
}

/// A maker and taker matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExecuted {
    pub trade_id: TradeId,
    pub sequence: u64,
    pub market: MarketId,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub fee: Decimal,
    pub executed_at: i64,
}

impl From<&Trade> for TradeExecuted {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            sequence: trade.sequence,
            market: trade.market.clone(),
            taker_order_id: trade.taker_order_id,
            maker_order_id: trade.maker_order_id,
            price: trade.price,
            quantity: trade.quantity,
            fee: trade.fee,
            executed_at: trade.executed_at,
        }
    }
}

/// Why a resting order left the book before filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    UserRequested,
    SelfTradePrevention,
}

/// A resting order was removed with quantity still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub reason: CancelReason,
    pub remaining_quantity: Quantity,
}

/// Enum wrapper over all book events, enabling uniform handling of the
/// append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    OrderPlaced(OrderPlaced),
    TradeExecuted(TradeExecuted),
    OrderCancelled(OrderCancelled),
}
