//! Error taxonomy for order placement and cancellation
//!
//! Domain-scoped enums using thiserror. Everything here is a precondition
//! failure: surfaced synchronously to the caller before any state change.
//! Fatal post-commit settlement faults are defined by the settlement
//! service on top of these.

use thiserror::Error;

use crate::ids::OrderId;

/// Rejection reasons for a malformed placement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidOrder {
    #[error("price must be strictly positive")]
    NonPositivePrice,

    #[error("amount must be strictly positive")]
    NonPositiveAmount,

    #[error("base and quote asset must differ, got {asset} for both")]
    IdenticalAssets { asset: String },

    #[error("pair {submitted} is not served by this engine (serves {served})")]
    MarketMismatch { submitted: String, served: String },
}

/// Cancel-path errors. The book is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CancelError {
    #[error("order not found: {order_id}")]
    NotFound { order_id: OrderId },

    #[error("requester does not own order {order_id}")]
    Unauthorized { order_id: OrderId },
}

/// Malformed trading-pair symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("market symbol must be in BASE/QUOTE format: {symbol}")]
    MissingSeparator { symbol: String },

    #[error("market symbol has an empty asset leg: {symbol}")]
    EmptyAsset { symbol: String },

    #[error("base and quote asset must differ: {symbol}")]
    IdenticalAssets { symbol: String },
}

/// Invalid fee configuration, caught when the schedule is constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeConfigError {
    #[error("fee rate {rate_bps} bps exceeds the 10000 bps (100%) cap")]
    RateTooHigh { rate_bps: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_order_display() {
        let err = InvalidOrder::MarketMismatch {
            submitted: "ETH/USDC".to_string(),
            served: "BTC/USDT".to_string(),
        };
        assert!(err.to_string().contains("ETH/USDC"));
        assert!(err.to_string().contains("BTC/USDT"));
    }

    #[test]
    fn test_cancel_error_display() {
        let err = CancelError::NotFound {
            order_id: OrderId::new(9),
        };
        assert_eq!(err.to_string(), "order not found: 9");
    }

    #[test]
    fn test_fee_config_error_display() {
        let err = FeeConfigError::RateTooHigh { rate_bps: 20_000 };
        assert!(err.to_string().contains("20000"));
    }
}
