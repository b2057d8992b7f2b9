//! Ledger contract and in-memory implementation
//!
//! The coordinator consumes an abstract custody collaborator that escrows,
//! releases, and pays out funds. The in-memory implementation keeps
//! per-account available balances plus one escrow pool per asset: escrow
//! moves funds available → pool, release and transfer draw from the pool.
//! Total supply of an asset changes only through `deposit`.

use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use types::ids::AccountId;

/// Ledger failure reasons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("escrow pool underflow for {asset}: required {required}, held {held}")]
    InsufficientEscrow {
        asset: String,
        required: String,
        held: String,
    },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("arithmetic overflow in balance calculation")]
    Overflow,
}

/// Custody collaborator consumed by the settlement coordinator.
///
/// Each operation is atomic: on error, no balance has moved.
pub trait Ledger {
    /// Reserve `amount` of `asset` from the trader's available balance
    /// into escrow.
    fn escrow(&mut self, trader: AccountId, asset: &str, amount: Decimal)
        -> Result<(), LedgerError>;

    /// Return previously escrowed funds to the trader.
    fn release(&mut self, trader: AccountId, asset: &str, amount: Decimal)
        -> Result<(), LedgerError>;

    /// Pay escrowed funds out to `to`.
    fn transfer(&mut self, asset: &str, to: AccountId, amount: Decimal)
        -> Result<(), LedgerError>;
}

/// In-memory ledger: account → (asset → available balance), plus one
/// escrow pool per asset.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    available: HashMap<AccountId, HashMap<String, Decimal>>,
    escrowed: HashMap<String, Decimal>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account; the only way total supply grows.
    pub fn deposit(
        &mut self,
        account: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        self.credit(account, asset, amount)
    }

    /// Available (unescrowed) balance.
    pub fn balance(&self, account: &AccountId, asset: &str) -> Decimal {
        self.available
            .get(account)
            .and_then(|assets| assets.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Funds currently escrowed for `asset`, across all traders.
    pub fn escrowed(&self, asset: &str) -> Decimal {
        self.escrowed.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total supply of an asset across available balances and escrow.
    /// Constant under escrow/release/transfer.
    pub fn total_supply(&self, asset: &str) -> Decimal {
        let available: Decimal = self
            .available
            .values()
            .filter_map(|assets| assets.get(asset))
            .copied()
            .sum();
        available + self.escrowed(asset)
    }

    fn credit(
        &mut self,
        account: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let balance = self
            .available
            .entry(account)
            .or_default()
            .entry(asset.to_string())
            .or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn debit(
        &mut self,
        account: &AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let available = self.balance(account, asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        if let Some(balance) = self
            .available
            .get_mut(account)
            .and_then(|assets| assets.get_mut(asset))
        {
            *balance -= amount;
        }
        Ok(())
    }

    fn pool_debit(&mut self, asset: &str, amount: Decimal) -> Result<(), LedgerError> {
        let held = self.escrowed(asset);
        if held < amount {
            return Err(LedgerError::InsufficientEscrow {
                asset: asset.to_string(),
                required: amount.to_string(),
                held: held.to_string(),
            });
        }
        if let Some(pool) = self.escrowed.get_mut(asset) {
            *pool -= amount;
        }
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn escrow(
        &mut self,
        trader: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        // Check the pool addition first so a failure leaves no half-move.
        let new_pool = self
            .escrowed(asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.debit(&trader, asset, amount)?;
        self.escrowed.insert(asset.to_string(), new_pool);
        Ok(())
    }

    fn release(
        &mut self,
        trader: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        let new_balance = self
            .balance(&trader, asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.pool_debit(asset, amount)?;
        self.available
            .entry(trader)
            .or_default()
            .insert(asset.to_string(), new_balance);
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: &str,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        let new_balance = self
            .balance(&to, asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.pool_debit(asset, amount)?;
        self.available
            .entry(to)
            .or_default()
            .insert(asset.to_string(), new_balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(amount: u64) -> (InMemoryLedger, AccountId) {
        let mut ledger = InMemoryLedger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", Decimal::from(amount)).unwrap();
        (ledger, account)
    }

    #[test]
    fn test_deposit_and_balance() {
        let (ledger, account) = funded(1000);
        assert_eq!(ledger.balance(&account, "USDT"), Decimal::from(1000));
        assert_eq!(ledger.balance(&account, "BTC"), Decimal::ZERO);
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let mut ledger = InMemoryLedger::new();
        let account = AccountId::new();
        assert_eq!(
            ledger.deposit(account, "USDT", Decimal::ZERO),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(
            ledger.deposit(account, "USDT", Decimal::from(-5)),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_escrow_moves_available_to_pool() {
        let (mut ledger, account) = funded(1000);
        ledger.escrow(account, "USDT", Decimal::from(400)).unwrap();

        assert_eq!(ledger.balance(&account, "USDT"), Decimal::from(600));
        assert_eq!(ledger.escrowed("USDT"), Decimal::from(400));
        assert_eq!(ledger.total_supply("USDT"), Decimal::from(1000));
    }

    #[test]
    fn test_escrow_insufficient_balance() {
        let (mut ledger, account) = funded(100);
        let err = ledger.escrow(account, "USDT", Decimal::from(101)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        // Nothing moved
        assert_eq!(ledger.balance(&account, "USDT"), Decimal::from(100));
        assert_eq!(ledger.escrowed("USDT"), Decimal::ZERO);
    }

    #[test]
    fn test_release_returns_escrow() {
        let (mut ledger, account) = funded(1000);
        ledger.escrow(account, "USDT", Decimal::from(400)).unwrap();
        ledger.release(account, "USDT", Decimal::from(150)).unwrap();

        assert_eq!(ledger.balance(&account, "USDT"), Decimal::from(750));
        assert_eq!(ledger.escrowed("USDT"), Decimal::from(250));
    }

    #[test]
    fn test_release_more_than_held_fails() {
        let (mut ledger, account) = funded(1000);
        ledger.escrow(account, "USDT", Decimal::from(100)).unwrap();
        let err = ledger.release(account, "USDT", Decimal::from(101)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientEscrow { .. }));
    }

    #[test]
    fn test_transfer_pays_out_of_pool() {
        let (mut ledger, payer) = funded(1000);
        let payee = AccountId::new();
        ledger.escrow(payer, "USDT", Decimal::from(500)).unwrap();
        ledger.transfer("USDT", payee, Decimal::from(500)).unwrap();

        assert_eq!(ledger.balance(&payee, "USDT"), Decimal::from(500));
        assert_eq!(ledger.escrowed("USDT"), Decimal::ZERO);
        assert_eq!(ledger.total_supply("USDT"), Decimal::from(1000));
    }

    #[test]
    fn test_transfer_without_escrow_fails() {
        let mut ledger = InMemoryLedger::new();
        let payee = AccountId::new();
        let err = ledger.transfer("USDT", payee, Decimal::from(1)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientEscrow { .. }));
    }

    #[test]
    fn test_accounts_isolated() {
        let mut ledger = InMemoryLedger::new();
        let first = AccountId::new();
        let second = AccountId::new();
        ledger.deposit(first, "BTC", Decimal::from(10)).unwrap();
        ledger.deposit(second, "BTC", Decimal::from(5)).unwrap();

        ledger.escrow(first, "BTC", Decimal::from(10)).unwrap();
        assert_eq!(ledger.balance(&first, "BTC"), Decimal::ZERO);
        assert_eq!(ledger.balance(&second, "BTC"), Decimal::from(5));
    }
}
