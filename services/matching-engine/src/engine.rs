//! Single-market matching engine
//!
//! Owns both book sides and the resting-order index, assigns strictly
//! increasing order ids, and runs the price-time-priority match loop.
//! The engine only manipulates in-memory book state; escrow and transfers
//! belong to the settlement layer wrapped around it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use types::errors::CancelError;
use types::fee::FeeSchedule;
use types::ids::{AccountId, MarketId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::book::{AskBook, BidBook};
use crate::matching::{crossing, MatchExecutor};

/// How the engine treats an incoming order that crosses the same trader's
/// own resting order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelfTradePolicy {
    /// A trader may match against their own resting order like any other.
    #[default]
    Allow,
    /// The trader's own resting maker is cancelled instead of traded
    /// against; matching continues with the next maker in priority.
    CancelResting,
}

/// Outcome of one placement.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Id assigned to the incoming order, returned even when it filled
    /// completely, for audit correlation.
    pub order_id: OrderId,
    /// Trades produced by the match loop, in execution order.
    pub trades: Vec<Trade>,
    /// The unfilled remainder inserted into the book, if any.
    pub resting: Option<Order>,
    /// Resting orders cancelled by [`SelfTradePolicy::CancelResting`];
    /// their escrow must be released by the settlement layer.
    pub prevented: Vec<Order>,
}

/// Depth snapshot for observers.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub market: MarketId,
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

/// Matching engine for one trading pair.
///
/// Additional pairs run independent engines with no shared state; each
/// operation runs to completion before the next one starts.
pub struct MatchingEngine {
    market: MarketId,
    policy: SelfTradePolicy,
    bids: BidBook,
    asks: AskBook,
    /// Resting orders by id. Orders leave the moment they fill or cancel,
    /// so no entry ever has zero remaining quantity.
    resting: HashMap<OrderId, Order>,
    executor: MatchExecutor,
    next_order_id: u64,
}

impl MatchingEngine {
    pub fn new(market: MarketId, fee: FeeSchedule, policy: SelfTradePolicy) -> Self {
        Self {
            market,
            policy,
            bids: BidBook::new(),
            asks: AskBook::new(),
            resting: HashMap::new(),
            executor: MatchExecutor::new(1, fee),
            next_order_id: 1,
        }
    }

    pub fn market(&self) -> &MarketId {
        &self.market
    }

    fn assign_order_id(&mut self) -> OrderId {
        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    /// Place an order: cross it against the opposite side from the best
    /// price outward, then rest any unfilled remainder on its own side.
    ///
    /// Numeric preconditions are unrepresentable here (`Price` and
    /// `Quantity` enforce them); pair validation happens in the
    /// caller-facing settlement service before any escrow or book access.
    pub fn place(
        &mut self,
        trader: AccountId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Placement {
        let order_id = self.assign_order_id();
        let mut order = Order::new(
            order_id,
            trader,
            self.market.clone(),
            side,
            price,
            quantity,
            timestamp,
        );

        let mut trades = Vec::new();
        let mut prevented = Vec::new();

        while !order.is_filled() {
            let Some((maker_price, maker_id, maker_trader, maker_remaining)) =
                self.peek_best_maker(side)
            else {
                break;
            };
            // The books are sorted, so the first non-crossing level ends
            // the loop: no worse level can cross.
            if !crossing::crosses(side, price, maker_price) {
                break;
            }

            if self.policy == SelfTradePolicy::CancelResting && maker_trader == trader {
                self.unbook(side.opposite(), maker_id, maker_price);
                if let Some(cancelled) = self.resting.remove(&maker_id) {
                    prevented.push(cancelled);
                }
                continue;
            }

            let fill = order.remaining_quantity.min(maker_remaining);
            let trade = self.executor.execute(
                self.market.clone(),
                maker_id,
                order_id,
                maker_trader,
                trader,
                side,
                maker_price, // execution at the maker's quoted price
                fill,
                timestamp,
            );
            trades.push(trade);

            order.fill(fill);
            self.reduce_maker(
                side.opposite(),
                maker_id,
                maker_price,
                maker_remaining.saturating_sub(fill),
            );
        }

        let resting = if order.is_filled() {
            None
        } else {
            match side {
                Side::Buy => self.bids.insert(&order),
                Side::Sell => self.asks.insert(&order),
            }
            self.resting.insert(order_id, order.clone());
            Some(order)
        };

        Placement {
            order_id,
            trades,
            resting,
            prevented,
        }
    }

    /// Remove a resting order on its owner's request.
    ///
    /// Returns the removed order so the settlement layer can release the
    /// escrow still reserved behind it. The book is untouched on error.
    pub fn cancel(&mut self, order_id: OrderId, requester: AccountId) -> Result<Order, CancelError> {
        let Some(order) = self.resting.remove(&order_id) else {
            return Err(CancelError::NotFound { order_id });
        };
        if order.trader != requester {
            self.resting.insert(order_id, order);
            return Err(CancelError::Unauthorized { order_id });
        }
        let removed = self.unbook(order.side, order_id, order.price);
        debug_assert!(removed, "resting index out of sync with book");
        Ok(order)
    }

    /// A resting order by id. Filled and cancelled orders are destroyed,
    /// so they report as absent.
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.resting.get(&order_id)
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.bids.best_bid()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.asks.best_ask()
    }

    /// Top `depth` levels of both sides.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            market: self.market.clone(),
            bids: self.bids.depth_snapshot(depth),
            asks: self.asks.depth_snapshot(depth),
        }
    }

    pub fn resting_count(&self) -> usize {
        self.resting.len()
    }

    /// Best maker on the side opposite the incoming order.
    fn peek_best_maker(
        &mut self,
        taker_side: Side,
    ) -> Option<(Price, OrderId, AccountId, Quantity)> {
        let (price, level) = match taker_side {
            Side::Buy => self.asks.best_level_mut()?,
            Side::Sell => self.bids.best_level_mut()?,
        };
        let (order_id, trader, remaining) = level.peek_front()?;
        Some((price, order_id, trader, remaining))
    }

    /// Apply a fill to the maker at the front of its level, dropping it
    /// from level and index when exhausted.
    fn reduce_maker(
        &mut self,
        maker_side: Side,
        maker_id: OrderId,
        maker_price: Price,
        new_quantity: Quantity,
    ) {
        match maker_side {
            Side::Buy => {
                if let Some((_, level)) = self.bids.best_level_mut() {
                    level.reduce_front(new_quantity);
                }
                self.bids.prune_empty(maker_price);
            }
            Side::Sell => {
                if let Some((_, level)) = self.asks.best_level_mut() {
                    level.reduce_front(new_quantity);
                }
                self.asks.prune_empty(maker_price);
            }
        }

        if new_quantity.is_zero() {
            self.resting.remove(&maker_id);
        } else if let Some(maker) = self.resting.get_mut(&maker_id) {
            maker.remaining_quantity = new_quantity;
        }
    }

    fn unbook(&mut self, side: Side, order_id: OrderId, price: Price) -> bool {
        match side {
            Side::Buy => self.bids.remove(&order_id, price),
            Side::Sell => self.asks.remove(&order_id, price),
        }
    }
}
