//! A single price level: all resting orders quoted at one price
//!
//! Orders queue in arrival order and execute front-first, which is exactly
//! the FIFO tie-break among equal prices. The level caches its total open
//! quantity for depth snapshots.

use std::collections::VecDeque;
use types::ids::{AccountId, OrderId};
use types::numeric::Quantity;

/// Entry in the level queue.
#[derive(Debug, Clone)]
struct LevelEntry {
    order_id: OrderId,
    trader: AccountId,
    remaining_quantity: Quantity,
}

/// FIFO queue of resting orders at one price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    entries: VecDeque<LevelEntry>,
    total_quantity: Quantity,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Append an order at the back of the queue (time priority).
    pub fn push_back(&mut self, order_id: OrderId, trader: AccountId, quantity: Quantity) {
        self.entries.push_back(LevelEntry {
            order_id,
            trader,
            remaining_quantity: quantity,
        });
        self.total_quantity = self.total_quantity + quantity;
    }

    /// Remove an order anywhere in the queue.
    ///
    /// Returns the removed order's remaining quantity, or None if the
    /// order is not at this level.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.order_id == order_id)?;
        let entry = self.entries.remove(position)?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining_quantity);
        Some(entry.remaining_quantity)
    }

    /// The order next in line to execute.
    pub fn peek_front(&self) -> Option<(OrderId, AccountId, Quantity)> {
        self.entries
            .front()
            .map(|entry| (entry.order_id, entry.trader, entry.remaining_quantity))
    }

    /// Set the front order's remaining quantity after a fill; a zero
    /// quantity removes the order entirely so the level never holds an
    /// exhausted entry.
    pub fn reduce_front(&mut self, new_quantity: Quantity) {
        let Some(entry) = self.entries.front_mut() else {
            return;
        };
        let old_quantity = entry.remaining_quantity;
        if new_quantity.is_zero() {
            self.entries.pop_front();
        } else {
            entry.remaining_quantity = new_quantity;
        }
        self.total_quantity = self.total_quantity.saturating_sub(old_quantity) + new_quantity;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total open quantity at this price.
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.entries.len()
    }
}
