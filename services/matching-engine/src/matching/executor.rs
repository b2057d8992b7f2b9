//! Trade construction
//!
//! Stamps each match with a monotonic sequence number and the fee the
//! configured schedule charges on its notional. Execution price is the
//! maker's quoted price; the caller passes it from the resting level.

use types::fee::FeeSchedule;
use types::ids::{AccountId, MarketId, OrderId};
use types::numeric::{notional, Price, Quantity};
use types::order::Side;
use types::trade::Trade;

pub struct MatchExecutor {
    sequence: u64,
    fee: FeeSchedule,
}

impl MatchExecutor {
    pub fn new(starting_sequence: u64, fee: FeeSchedule) -> Self {
        Self {
            sequence: starting_sequence,
            fee,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    /// Build the trade record for one fill.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        market: MarketId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker: AccountId,
        taker: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        let fee = self.fee.fee(notional(price, quantity));
        Trade::new(
            self.next_sequence(),
            market,
            maker_order_id,
            taker_order_id,
            maker,
            taker,
            taker_side,
            price,
            quantity,
            fee,
            timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn executor() -> MatchExecutor {
        MatchExecutor::new(1000, FeeSchedule::new(30, 0).unwrap())
    }

    fn run(executor: &mut MatchExecutor, price: u64, quantity: u64) -> Trade {
        executor.execute(
            MarketId::new("BTC/USDT"),
            OrderId::new(1),
            OrderId::new(2),
            AccountId::new(),
            AccountId::new(),
            Side::Buy,
            Price::from_u64(price),
            Quantity::from_u64(quantity),
            1_708_123_456_789_000_000,
        )
    }

    #[test]
    fn test_sequence_monotonic() {
        let mut executor = executor();
        let first = run(&mut executor, 100, 1);
        let second = run(&mut executor, 100, 1);
        assert_eq!(first.sequence, 1000);
        assert_eq!(second.sequence, 1001);
    }

    #[test]
    fn test_fee_stamped_from_schedule() {
        let mut executor = executor();
        // notional 100 * 10 = 1000, 30 bps -> 3
        let trade = run(&mut executor, 100, 10);
        assert_eq!(trade.fee, Decimal::from(3));
        assert_eq!(trade.net_proceeds(), Decimal::from(997));
    }
}
