//! Crossing detection
//!
//! A buy crosses a resting ask when its price is at or above the ask; a
//! sell crosses a resting bid when its price is at or below the bid.
//! Because each side is fully sorted, the first level that fails this
//! predicate ends the match loop: no worse level can cross either.

use types::numeric::Price;
use types::order::Side;

/// Can an incoming order at `taker_price` execute against a resting order
/// at `maker_price`?
pub fn crosses(taker_side: Side, taker_price: Price, maker_price: Price) -> bool {
    match taker_side {
        Side::Buy => taker_price >= maker_price,
        Side::Sell => taker_price <= maker_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_crosses_at_or_above_ask() {
        assert!(crosses(Side::Buy, Price::from_u64(101), Price::from_u64(100)));
        assert!(crosses(Side::Buy, Price::from_u64(100), Price::from_u64(100)));
        assert!(!crosses(Side::Buy, Price::from_u64(99), Price::from_u64(100)));
    }

    #[test]
    fn test_sell_crosses_at_or_below_bid() {
        assert!(crosses(Side::Sell, Price::from_u64(99), Price::from_u64(100)));
        assert!(crosses(Side::Sell, Price::from_u64(100), Price::from_u64(100)));
        assert!(!crosses(Side::Sell, Price::from_u64(101), Price::from_u64(100)));
    }
}
