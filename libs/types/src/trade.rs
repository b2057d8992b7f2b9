//! Trade records emitted by the matching engine

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::numeric::{notional, Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One match event between a resting maker and an incoming taker.
///
/// Execution always happens at the maker's quoted price; any price
/// improvement accrues to the taker. Trades are settlement instructions and
/// audit records, never book state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Monotonic sequence within the engine that produced the trade.
    pub sequence: u64,
    pub market: MarketId,

    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker: AccountId,
    pub taker: AccountId,

    /// Side of the incoming (taker) order.
    pub taker_side: Side,
    /// Execution price: always the maker's quoted price.
    pub price: Price,
    pub quantity: Quantity,

    /// Fee in quote units, debited from the seller's proceeds.
    pub fee: Decimal,

    pub executed_at: i64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        market: MarketId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker: AccountId,
        taker: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        fee: Decimal,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            market,
            maker_order_id,
            taker_order_id,
            maker,
            taker,
            taker_side,
            price,
            quantity,
            fee,
            executed_at,
        }
    }

    /// Quote-asset value of the trade (price × quantity).
    pub fn notional(&self) -> Decimal {
        notional(self.price, self.quantity)
    }

    /// Quote proceeds credited to the seller after the fee.
    pub fn net_proceeds(&self) -> Decimal {
        self.notional() - self.fee
    }

    /// The account receiving base in this trade.
    pub fn buyer(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.taker,
            Side::Sell => self.maker,
        }
    }

    /// The account receiving quote in this trade.
    pub fn seller(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.maker,
            Side::Sell => self.taker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(taker_side: Side) -> Trade {
        Trade::new(
            1000,
            MarketId::new("BTC/USDT"),
            OrderId::new(1),
            OrderId::new(2),
            AccountId::new(),
            AccountId::new(),
            taker_side,
            Price::from_u64(50_000),
            Quantity::from_str("0.5").unwrap(),
            Decimal::from(25),
            1_708_123_456_789_000_000,
        )
    }

    #[test]
    fn test_trade_notional() {
        let trade = sample_trade(Side::Buy);
        assert_eq!(trade.notional(), Decimal::from(25_000));
    }

    #[test]
    fn test_fee_plus_net_equals_notional() {
        let trade = sample_trade(Side::Buy);
        assert_eq!(trade.fee + trade.net_proceeds(), trade.notional());
    }

    #[test]
    fn test_buyer_seller_for_buy_taker() {
        let trade = sample_trade(Side::Buy);
        assert_eq!(trade.buyer(), trade.taker);
        assert_eq!(trade.seller(), trade.maker);
    }

    #[test]
    fn test_buyer_seller_for_sell_taker() {
        let trade = sample_trade(Side::Sell);
        assert_eq!(trade.buyer(), trade.maker);
        assert_eq!(trade.seller(), trade.taker);
    }
}
