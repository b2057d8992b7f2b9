//! Unique identifier types for engine entities
//!
//! Trade and account ids use UUID v7 so they sort by creation time. Order
//! ids are a dense `u64` sequence assigned by the engine at placement:
//! strictly increasing and never reused, so id order is placement order.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::MarketError;

/// Unique identifier for an order.
///
/// Assigned by the matching engine from a monotonic counter; immutable for
/// the life of the order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trade.
///
/// UUID v7 for time-based sorting across engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(Uuid);

impl TradeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trader account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trading-pair identifier in `"BASE/QUOTE"` format (e.g. `"BTC/USDT"`).
///
/// Construction rejects a missing separator, an empty asset leg, and a pair
/// whose base equals its quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(String);

impl MarketId {
    /// Create a new MarketId.
    ///
    /// # Panics
    /// Panics if the symbol is malformed; use [`MarketId::try_new`] for
    /// fallible construction.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::try_new(symbol).expect("malformed market symbol")
    }

    /// Validate and create a MarketId.
    pub fn try_new(symbol: impl Into<String>) -> Result<Self, MarketError> {
        let symbol = symbol.into();
        let Some((base, quote)) = symbol.split_once('/') else {
            return Err(MarketError::MissingSeparator { symbol });
        };
        if base.is_empty() || quote.is_empty() {
            return Err(MarketError::EmptyAsset { symbol });
        }
        if base == quote {
            return Err(MarketError::IdenticalAssets { symbol });
        }
        Ok(Self(symbol))
    }

    /// The asset being traded, in which order quantities are denominated.
    pub fn base(&self) -> &str {
        self.0.split_once('/').map(|(base, _)| base).unwrap_or("")
    }

    /// The asset prices and fees are denominated in.
    pub fn quote(&self) -> &str {
        self.0.split_once('/').map(|(_, quote)| quote).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
