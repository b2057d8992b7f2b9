//! Fee schedule
//!
//! Converts a trade's quote notional into a fee amount and net proceeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::FeeConfigError;

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fee configuration for a trading pair.
///
/// The fee is always paid in the quote asset and debited from the side
/// receiving quote (the seller's proceeds); it is never added on top of
/// the buyer's cost. Rounding truncates toward zero at the quote asset's
/// smallest unit, so fractional remainders stay with the traders rather
/// than over-charging them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee rate in basis points; at most `BPS_DENOMINATOR`.
    pub rate_bps: u32,
    /// Decimal places of the quote asset's smallest unit.
    pub quote_scale: u32,
}

impl FeeSchedule {
    /// Validate and build a schedule.
    pub fn new(rate_bps: u32, quote_scale: u32) -> Result<Self, FeeConfigError> {
        let schedule = Self {
            rate_bps,
            quote_scale,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// A zero-fee schedule.
    pub fn free(quote_scale: u32) -> Self {
        Self {
            rate_bps: 0,
            quote_scale,
        }
    }

    /// Check the rate cap; deserialized configuration goes through this
    /// before an engine is built around it.
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        if self.rate_bps > BPS_DENOMINATOR {
            return Err(FeeConfigError::RateTooHigh {
                rate_bps: self.rate_bps,
            });
        }
        Ok(())
    }

    /// Fee charged on a quote notional:
    /// `trunc(notional * rate_bps / 10_000)` at the quote scale.
    pub fn fee(&self, notional: Decimal) -> Decimal {
        let raw = notional * Decimal::from(self.rate_bps) / Decimal::from(BPS_DENOMINATOR);
        raw.trunc_with_scale(self.quote_scale)
    }

    /// Split a notional into `(fee, net proceeds)`. The parts always sum
    /// back to the notional.
    pub fn split(&self, notional: Decimal) -> (Decimal, Decimal) {
        let fee = self.fee(notional);
        (fee, notional - fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_truncates_toward_zero() {
        let schedule = FeeSchedule::new(30, 0).unwrap();
        assert_eq!(schedule.fee(Decimal::from(1000)), Decimal::from(3));
        assert_eq!(schedule.fee(Decimal::from(500)), Decimal::from(1)); // 1.5 -> 1
        assert_eq!(schedule.fee(Decimal::from(303)), Decimal::ZERO); // 0.909 -> 0
    }

    #[test]
    fn test_fee_at_quote_scale() {
        let schedule = FeeSchedule::new(30, 2).unwrap();
        // 123.45 * 0.003 = 0.37035 -> 0.37 at two decimal places
        assert_eq!(
            schedule.fee(Decimal::from_str_exact("123.45").unwrap()),
            Decimal::from_str_exact("0.37").unwrap()
        );
    }

    #[test]
    fn test_split_conserves_notional() {
        let schedule = FeeSchedule::new(30, 0).unwrap();
        let notional = Decimal::from(1000);
        let (fee, net) = schedule.split(notional);
        assert_eq!(fee, Decimal::from(3));
        assert_eq!(net, Decimal::from(997));
        assert_eq!(fee + net, notional);
    }

    #[test]
    fn test_rate_cap() {
        assert!(FeeSchedule::new(10_000, 0).is_ok());
        assert!(matches!(
            FeeSchedule::new(10_001, 0),
            Err(FeeConfigError::RateTooHigh { rate_bps: 10_001 })
        ));
    }

    #[test]
    fn test_free_schedule() {
        let schedule = FeeSchedule::free(8);
        assert_eq!(schedule.fee(Decimal::from(1_000_000)), Decimal::ZERO);
    }

    #[test]
    fn test_full_rate_takes_everything() {
        let schedule = FeeSchedule::new(10_000, 0).unwrap();
        let (fee, net) = schedule.split(Decimal::from(250));
        assert_eq!(fee, Decimal::from(250));
        assert_eq!(net, Decimal::ZERO);
    }
}
