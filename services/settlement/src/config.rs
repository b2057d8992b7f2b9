//! Engine configuration
//!
//! Explicit construction-time configuration: the pair served, the fee
//! schedule, who collects fees, and the self-trade policy. There is no
//! ambient or owner-mutable state; changing configuration means building a
//! new coordinator.

use matching_engine::SelfTradePolicy;
use serde::{Deserialize, Serialize};
use types::errors::FeeConfigError;
use types::fee::FeeSchedule;
use types::ids::{AccountId, MarketId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The single trading pair this engine serves.
    pub market: MarketId,
    pub fee: FeeSchedule,
    /// Account credited with every trade fee.
    pub fee_recipient: AccountId,
    #[serde(default)]
    pub self_trade: SelfTradePolicy,
}

impl EngineConfig {
    /// Configuration-time validation; run before an engine is built.
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        self.fee.validate()
    }
}
