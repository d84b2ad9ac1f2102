//! A single asset's representative token.
//!
//! Tracks per-holder balances and total supply. All mutations are atomic:
//! every new value is computed before any is written, so either the full
//! operation succeeds or the token is unchanged. Mutation goes through
//! [`AssetTokenRegistry`](crate::AssetTokenRegistry) or a
//! [`StagedToken`](crate::StagedToken); callers outside this crate only read.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use stockledger_types::{AssetId, LedgerError, Result, WalletAddress, amount};

/// Mintable, burnable, transferable balance table for one asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetToken {
    asset_id: AssetId,
    name: String,
    symbol: String,
    address: WalletAddress,
    balances: HashMap<WalletAddress, Decimal>,
    total_supply: Decimal,
}

impl AssetToken {
    pub(crate) fn new(asset_id: AssetId, name: String, symbol: String) -> Self {
        let address = WalletAddress::for_asset_token(&asset_id);
        Self {
            asset_id,
            name,
            symbol,
            address,
            balances: HashMap::new(),
            total_supply: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The token's contract address.
    #[must_use]
    pub fn address(&self) -> WalletAddress {
        self.address
    }

    #[must_use]
    pub fn balance_of(&self, holder: WalletAddress) -> Decimal {
        self.balances.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.total_supply
    }

    /// Number of holders with a non-zero balance.
    #[must_use]
    pub fn holders(&self) -> usize {
        self.balances.values().filter(|b| !b.is_zero()).count()
    }

    /// Sum of every holder's balance. Equals `total_supply` while the token
    /// is consistent.
    #[must_use]
    pub fn sum_of_balances(&self) -> Decimal {
        self.balances.values().copied().sum()
    }

    /// Fails with `InsufficientBalance` if `holder` has less than `amount`.
    pub fn ensure_balance(&self, holder: WalletAddress, amount: Decimal) -> Result<()> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Create `amount` new tokens for `to`.
    ///
    /// # Errors
    /// `InvalidAmount` if `amount <= 0`, `AmountOverflow` if the balance or
    /// supply would overflow.
    pub(crate) fn mint(&mut self, to: WalletAddress, amount: Decimal) -> Result<()> {
        amount::ensure_positive(amount)?;
        let balance = amount::checked_add(self.balance_of(to), amount)?;
        let supply = amount::checked_add(self.total_supply, amount)?;
        self.balances.insert(to, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Destroy `amount` of `holder`'s tokens.
    ///
    /// # Errors
    /// `InvalidAmount` if negative, `InsufficientBalance` if the holder has
    /// less than `amount`, `AmountOverflow` if the result loses precision.
    pub(crate) fn burn(&mut self, holder: WalletAddress, amount: Decimal) -> Result<()> {
        amount::ensure_non_negative(amount)?;
        self.ensure_balance(holder, amount)?;
        let balance = amount::checked_sub(self.balance_of(holder), amount)?;
        let supply = amount::checked_sub(self.total_supply, amount)?;
        self.balances.insert(holder, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Supply is unchanged.
    ///
    /// # Errors
    /// `InvalidAmount` if negative, `InsufficientBalance` if `from` has less
    /// than `amount`, `AmountOverflow` if either balance loses precision.
    pub(crate) fn transfer(
        &mut self,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        amount::ensure_non_negative(amount)?;
        self.ensure_balance(from, amount)?;
        if from == to {
            return Ok(());
        }
        let debited = amount::checked_sub(self.balance_of(from), amount)?;
        let credited = amount::checked_add(self.balance_of(to), amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AssetToken {
        AssetToken::new(AssetId::new("S"), "stock-name".into(), "stock-symbol".into())
    }

    #[test]
    fn mint_increases_balance_and_supply() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::new(100, 0)).unwrap();
        assert_eq!(t.balance_of(w), Decimal::new(100, 0));
        assert_eq!(t.total_supply(), Decimal::new(100, 0));
        assert_eq!(t.holders(), 1);
    }

    #[test]
    fn mint_rejects_non_positive() {
        let mut t = token();
        let w = WalletAddress::random();
        let err = t.mint(w, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
        assert_eq!(t.total_supply(), Decimal::ZERO);
    }

    #[test]
    fn burn_reduces_supply() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::new(100, 0)).unwrap();
        t.burn(w, Decimal::new(40, 0)).unwrap();
        assert_eq!(t.balance_of(w), Decimal::new(60, 0));
        assert_eq!(t.total_supply(), Decimal::new(60, 0));
    }

    #[test]
    fn burn_insufficient_leaves_token_unchanged() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::new(10, 0)).unwrap();
        let err = t.burn(w, Decimal::new(11, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(t.balance_of(w), Decimal::new(10, 0));
        assert_eq!(t.total_supply(), Decimal::new(10, 0));
    }

    #[test]
    fn transfer_keeps_supply() {
        let mut t = token();
        let a = WalletAddress::random();
        let b = WalletAddress::random();
        t.mint(a, Decimal::new(100, 0)).unwrap();
        t.transfer(a, b, Decimal::new(50, 0)).unwrap();
        assert_eq!(t.balance_of(a), Decimal::new(50, 0));
        assert_eq!(t.balance_of(b), Decimal::new(50, 0));
        assert_eq!(t.total_supply(), Decimal::new(100, 0));
        assert_eq!(t.sum_of_balances(), t.total_supply());
    }

    #[test]
    fn transfer_from_empty_holder_fails() {
        let mut t = token();
        let err = t
            .transfer(WalletAddress::random(), WalletAddress::random(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { available, .. } if available.is_zero()
        ));
    }

    #[test]
    fn address_is_derived_from_asset() {
        let t = token();
        assert_eq!(t.address(), WalletAddress::for_asset_token(&AssetId::new("S")));
    }

    #[test]
    fn mint_overflow_leaves_token_unchanged() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::MAX).unwrap();
        let err = t.mint(WalletAddress::random(), Decimal::ONE).unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert_eq!(t.total_supply(), Decimal::MAX);
        assert_eq!(t.holders(), 1);
    }

    #[test]
    fn dust_burn_on_large_balance_rejected() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::new(100_000_000_000, 0)).unwrap();
        let err = t.burn(w, Decimal::new(1, 18)).unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert_eq!(t.balance_of(w), Decimal::new(100_000_000_000, 0));
        assert_eq!(t.total_supply(), Decimal::new(100_000_000_000, 0));
    }

    #[test]
    fn transfer_to_self_is_noop() {
        let mut t = token();
        let w = WalletAddress::random();
        t.mint(w, Decimal::new(10, 0)).unwrap();
        t.transfer(w, w, Decimal::new(4, 0)).unwrap();
        assert_eq!(t.balance_of(w), Decimal::new(10, 0));
    }
}
