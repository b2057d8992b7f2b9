//! Settlement coordination
//!
//! Sequences every placement through four strict phases: escrow the full
//! order, run the match loop (in-memory only), settle the resulting
//! trades, release unspent escrow. Ledger calls never interleave with book
//! mutation: by the time the first transfer runs, the book is final for
//! this placement, so nothing re-entering the engine can observe a
//! half-updated book.
//!
//! A transfer that fails after the book committed is unrecoverable from
//! inside the engine (escrowed funds and book state now disagree), so the
//! coordinator latches a halt and refuses all further work on the pair
//! until an operator reconciles it. Retrying could double-pay.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use matching_engine::events::{
    CancelReason, MarketEvent, OrderCancelled, OrderPlaced, TradeExecuted,
};
use matching_engine::{BookSnapshot, MatchingEngine, Placement};
use types::errors::{CancelError, FeeConfigError, InvalidOrder};
use types::ids::{AccountId, MarketId, OrderId};
use types::numeric::{notional, Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::config::EngineConfig;
use crate::ledger::{Ledger, LedgerError};

/// A settlement leg that failed after the book had committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("settlement leg of {amount} {asset} to {account} failed: {source}")]
pub struct SettlementFault {
    pub asset: String,
    pub account: AccountId,
    pub amount: Decimal,
    #[source]
    pub source: LedgerError,
}

/// Placement failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    /// Malformed input; nothing changed.
    #[error(transparent)]
    InvalidOrder(#[from] InvalidOrder),

    /// The trader could not fund the order; nothing changed.
    #[error("escrow failed: {0}")]
    EscrowFailed(#[source] LedgerError),

    /// Fatal: a transfer failed after the book committed. The pair is
    /// halted for manual reconciliation.
    #[error("settlement inconsistency: {0}")]
    SettlementInconsistency(#[source] SettlementFault),

    /// A previous settlement fault halted this pair.
    #[error("pair halted after a settlement fault; manual reconciliation required")]
    Halted,
}

/// Cancellation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CancelOrderError {
    /// Unknown order or wrong owner; nothing changed.
    #[error(transparent)]
    Cancel(#[from] CancelError),

    /// Fatal: releasing the reserved escrow failed after the order left
    /// the book.
    #[error("settlement inconsistency: {0}")]
    SettlementInconsistency(#[source] SettlementFault),

    /// A previous settlement fault halted this pair.
    #[error("pair halted after a settlement fault; manual reconciliation required")]
    Halted,
}

/// Escrow still reserved behind a resting order: quote at the limit price
/// for a bid, base for an ask.
fn reserved_escrow(market: &MarketId, order: &Order) -> (String, Decimal) {
    match order.side {
        Side::Buy => (
            market.quote().to_string(),
            notional(order.price, order.remaining_quantity),
        ),
        Side::Sell => (
            market.base().to_string(),
            order.remaining_quantity.as_decimal(),
        ),
    }
}

/// One coordinator per trading pair. `&mut self` on both operations is the
/// single-writer critical section: a placement or cancel runs to
/// completion before the next begins, and a cancel racing a match simply
/// loses with `NotFound`.
pub struct SettlementCoordinator<L: Ledger> {
    engine: MatchingEngine,
    ledger: L,
    config: EngineConfig,
    /// Append-only audit log of every book state transition.
    events: Vec<MarketEvent>,
    halted: bool,
}

impl<L: Ledger> SettlementCoordinator<L> {
    /// Build a coordinator; fails on invalid fee configuration.
    pub fn new(config: EngineConfig, ledger: L) -> Result<Self, FeeConfigError> {
        config.validate()?;
        let engine = MatchingEngine::new(config.market.clone(), config.fee, config.self_trade);
        Ok(Self {
            engine,
            ledger,
            config,
            events: Vec::new(),
            halted: false,
        })
    }

    /// Place a limit order.
    ///
    /// Returns the new order's id (even when fully filled, for audit
    /// correlation) and the trades produced, in execution order.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &mut self,
        trader: AccountId,
        side: Side,
        base: &str,
        quote: &str,
        price: Decimal,
        amount: Decimal,
        timestamp: i64,
    ) -> Result<(OrderId, Vec<Trade>), PlaceOrderError> {
        if self.halted {
            return Err(PlaceOrderError::Halted);
        }

        // Validation precedes everything: a rejected order attempts no
        // escrow and emits no event.
        let (price, amount) = match self.validate(base, quote, price, amount) {
            Ok(validated) => validated,
            Err(err) => {
                warn!(%trader, %err, "order rejected");
                return Err(err.into());
            }
        };

        // Phase 1: escrow the full order before any matching.
        let (escrow_asset, escrow_amount) = match side {
            Side::Buy => (
                self.config.market.quote().to_string(),
                notional(price, amount),
            ),
            Side::Sell => (self.config.market.base().to_string(), amount.as_decimal()),
        };
        if let Err(source) = self.ledger.escrow(trader, &escrow_asset, escrow_amount) {
            warn!(
                %trader,
                asset = %escrow_asset,
                amount = %escrow_amount,
                %source,
                "escrow failed"
            );
            return Err(PlaceOrderError::EscrowFailed(source));
        }

        // Phase 2: match. In-memory book mutation only; after this call
        // the book is final for this placement.
        let placement = self.engine.place(trader, side, price, amount, timestamp);
        self.record_placement(trader, side, price, amount, timestamp, &placement);
        info!(
            order_id = %placement.order_id,
            %trader,
            trades = placement.trades.len(),
            resting = placement.resting.is_some(),
            "order placed"
        );

        // Phase 3: settle every trade, then escrow released for makers
        // cancelled by self-trade prevention.
        self.settle_trades(&placement.trades)?;
        self.release_prevented(&placement.prevented)?;

        // Phase 4: release unspent escrow not reserved by the remainder.
        self.release_surplus(trader, side, price, amount, &placement)?;

        Ok((placement.order_id, placement.trades))
    }

    /// Cancel a resting order and release the escrow reserved behind it.
    pub fn cancel_order(
        &mut self,
        order_id: OrderId,
        requester: AccountId,
    ) -> Result<(), CancelOrderError> {
        if self.halted {
            return Err(CancelOrderError::Halted);
        }

        let order = match self.engine.cancel(order_id, requester) {
            Ok(order) => order,
            Err(err) => {
                warn!(%order_id, %requester, %err, "cancel rejected");
                return Err(err.into());
            }
        };
        self.events.push(MarketEvent::OrderCancelled(OrderCancelled {
            order_id,
            reason: CancelReason::UserRequested,
            remaining_quantity: order.remaining_quantity,
        }));
        info!(%order_id, remaining = %order.remaining_quantity, "order cancelled");

        let (asset, amount) = reserved_escrow(&self.config.market, &order);
        if amount > Decimal::ZERO {
            self.ledger
                .release(order.trader, &asset, amount)
                .map_err(|source| {
                    CancelOrderError::SettlementInconsistency(
                        self.fault(&asset, order.trader, amount, source),
                    )
                })?;
        }
        Ok(())
    }

    /// A resting order by id; filled and cancelled orders report absent.
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.engine.get_order(order_id)
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.engine.best_bid()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.engine.best_ask()
    }

    /// Top `depth` levels of both sides.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        self.engine.snapshot(depth)
    }

    pub fn market(&self) -> &MarketId {
        &self.config.market
    }

    /// True once a settlement fault has poisoned this pair.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The audit log, in transition order.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Consume and clear the audit log.
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read access to the underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    fn validate(
        &self,
        base: &str,
        quote: &str,
        price: Decimal,
        amount: Decimal,
    ) -> Result<(Price, Quantity), InvalidOrder> {
        if base == quote {
            return Err(InvalidOrder::IdenticalAssets {
                asset: base.to_string(),
            });
        }
        if base != self.config.market.base() || quote != self.config.market.quote() {
            return Err(InvalidOrder::MarketMismatch {
                submitted: format!("{base}/{quote}"),
                served: self.config.market.as_str().to_string(),
            });
        }
        let price = Price::try_new(price).map_err(|_| InvalidOrder::NonPositivePrice)?;
        let amount = Quantity::try_new(amount).map_err(|_| InvalidOrder::NonPositiveAmount)?;
        if amount.is_zero() {
            return Err(InvalidOrder::NonPositiveAmount);
        }
        Ok((price, amount))
    }

    /// Append the book transitions of one placement to the audit log.
    fn record_placement(
        &mut self,
        trader: AccountId,
        side: Side,
        price: Price,
        amount: Quantity,
        timestamp: i64,
        placement: &Placement,
    ) {
        self.events.push(MarketEvent::OrderPlaced(OrderPlaced {
            order_id: placement.order_id,
            trader,
            market: self.config.market.clone(),
            side,
            price,
            quantity: amount,
            timestamp,
        }));
        for trade in &placement.trades {
            self.events
                .push(MarketEvent::TradeExecuted(TradeExecuted::from(trade)));
        }
        for prevented in &placement.prevented {
            self.events.push(MarketEvent::OrderCancelled(OrderCancelled {
                order_id: prevented.order_id,
                reason: CancelReason::SelfTradePrevention,
                remaining_quantity: prevented.remaining_quantity,
            }));
        }
    }

    /// Pay out every leg of every trade: base to the buyer, net quote to
    /// the seller, fee to the configured recipient.
    fn settle_trades(&mut self, trades: &[Trade]) -> Result<(), PlaceOrderError> {
        let base = self.config.market.base().to_string();
        let quote = self.config.market.quote().to_string();
        let fee_recipient = self.config.fee_recipient;

        for trade in trades {
            self.pay(&base, trade.buyer(), trade.quantity.as_decimal())?;
            self.pay(&quote, trade.seller(), trade.net_proceeds())?;
            self.pay(&quote, fee_recipient, trade.fee)?;
            debug!(
                trade_id = %trade.trade_id,
                price = %trade.price,
                quantity = %trade.quantity,
                fee = %trade.fee,
                "trade settled"
            );
        }
        Ok(())
    }

    fn pay(
        &mut self,
        asset: &str,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), PlaceOrderError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ledger.transfer(asset, to, amount).map_err(|source| {
            PlaceOrderError::SettlementInconsistency(self.fault(asset, to, amount, source))
        })
    }

    /// Return escrow for makers removed by self-trade prevention.
    fn release_prevented(&mut self, prevented: &[Order]) -> Result<(), PlaceOrderError> {
        for order in prevented {
            let (asset, amount) = reserved_escrow(&self.config.market, order);
            if amount > Decimal::ZERO {
                self.ledger
                    .release(order.trader, &asset, amount)
                    .map_err(|source| {
                        PlaceOrderError::SettlementInconsistency(
                            self.fault(&asset, order.trader, amount, source),
                        )
                    })?;
            }
        }
        Ok(())
    }

    /// A bid escrows at its limit price but executes at maker prices; the
    /// unspent difference comes back now. Escrow behind the resting
    /// remainder stays reserved until fill or cancellation. Ask escrow is
    /// exact by construction.
    fn release_surplus(
        &mut self,
        trader: AccountId,
        side: Side,
        price: Price,
        amount: Quantity,
        placement: &Placement,
    ) -> Result<(), PlaceOrderError> {
        if side == Side::Sell {
            return Ok(());
        }
        let escrowed = notional(price, amount);
        let spent: Decimal = placement.trades.iter().map(Trade::notional).sum();
        let reserved = placement
            .resting
            .as_ref()
            .map(|order| notional(price, order.remaining_quantity))
            .unwrap_or(Decimal::ZERO);
        let surplus = escrowed - spent - reserved;

        if surplus > Decimal::ZERO {
            let quote = self.config.market.quote().to_string();
            self.ledger
                .release(trader, &quote, surplus)
                .map_err(|source| {
                    PlaceOrderError::SettlementInconsistency(
                        self.fault(&quote, trader, surplus, source),
                    )
                })?;
            debug!(%trader, %surplus, "released price-improvement surplus");
        }
        Ok(())
    }

    /// Latch the halt and build the fault record.
    fn fault(
        &mut self,
        asset: &str,
        account: AccountId,
        amount: Decimal,
        source: LedgerError,
    ) -> SettlementFault {
        self.halted = true;
        let fault = SettlementFault {
            asset: asset.to_string(),
            account,
            amount,
            source,
        };
        error!(%fault, "settlement fault; pair halted");
        fault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use matching_engine::SelfTradePolicy;
    use types::fee::FeeSchedule;

    fn coordinator() -> SettlementCoordinator<InMemoryLedger> {
        let config = EngineConfig {
            market: MarketId::new("BTC/USDT"),
            fee: FeeSchedule::new(30, 0).unwrap(),
            fee_recipient: AccountId::new(),
            self_trade: SelfTradePolicy::Allow,
        };
        SettlementCoordinator::new(config, InMemoryLedger::new()).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_price_without_side_effects() {
        let mut coordinator = coordinator();
        let err = coordinator
            .place_order(
                AccountId::new(),
                Side::Buy,
                "BTC",
                "USDT",
                Decimal::ZERO,
                Decimal::from(10),
                0,
            )
            .unwrap_err();

        assert_eq!(
            err,
            PlaceOrderError::InvalidOrder(InvalidOrder::NonPositivePrice)
        );
        // No escrow attempted, no event emitted
        assert!(coordinator.events().is_empty());
        assert_eq!(coordinator.ledger().escrowed("USDT"), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_identical_assets() {
        let mut coordinator = coordinator();
        let err = coordinator
            .place_order(
                AccountId::new(),
                Side::Buy,
                "USDT",
                "USDT",
                Decimal::from(100),
                Decimal::from(1),
                0,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PlaceOrderError::InvalidOrder(InvalidOrder::IdenticalAssets { .. })
        ));
    }

    #[test]
    fn test_rejects_foreign_pair() {
        let mut coordinator = coordinator();
        let err = coordinator
            .place_order(
                AccountId::new(),
                Side::Sell,
                "ETH",
                "USDC",
                Decimal::from(100),
                Decimal::from(1),
                0,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PlaceOrderError::InvalidOrder(InvalidOrder::MarketMismatch { .. })
        ));
    }

    #[test]
    fn test_unfunded_trader_fails_escrow() {
        let mut coordinator = coordinator();
        let err = coordinator
            .place_order(
                AccountId::new(),
                Side::Sell,
                "BTC",
                "USDT",
                Decimal::from(100),
                Decimal::from(1),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, PlaceOrderError::EscrowFailed(_)));
        assert!(coordinator.events().is_empty());
    }

    #[test]
    fn test_reserved_escrow_sides() {
        let market = MarketId::new("BTC/USDT");
        let bid = Order::new(
            OrderId::new(1),
            AccountId::new(),
            market.clone(),
            Side::Buy,
            Price::from_u64(100),
            Quantity::from_u64(3),
            0,
        );
        assert_eq!(
            reserved_escrow(&market, &bid),
            ("USDT".to_string(), Decimal::from(300))
        );

        let ask = Order::new(
            OrderId::new(2),
            AccountId::new(),
            market.clone(),
            Side::Sell,
            Price::from_u64(100),
            Quantity::from_u64(3),
            0,
        );
        assert_eq!(
            reserved_escrow(&market, &ask),
            ("BTC".to_string(), Decimal::from(3))
        );
    }
}
