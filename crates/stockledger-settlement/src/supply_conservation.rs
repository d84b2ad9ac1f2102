//! Supply conservation invariant checker.
//!
//! Invariant for every deployed asset token:
//! ```text
//! total_supply == Σ(minted) - Σ(burned) == Σ(holder balances)
//! ```
//!
//! Transfers (sell escrow, escrow refunds) never change supply; only buy
//! settlements mint and sell settlements burn. If the invariant breaks,
//! balances were mutated outside the settlement engine.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stockledger_types::{AssetId, LedgerError, Result, amount};

/// Tracks per-asset mint and burn totals recorded by the settlement engine.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    minted: HashMap<AssetId, Decimal>,
    burned: HashMap<AssetId, Decimal>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Would `record_mint(asset, amount)` succeed?
    pub fn ensure_mint(&self, asset: &AssetId, amount: Decimal) -> Result<()> {
        amount::checked_add(self.total_minted(asset), amount).map(|_| ())
    }

    /// Would `record_burn(asset, amount)` succeed?
    pub fn ensure_burn(&self, asset: &AssetId, amount: Decimal) -> Result<()> {
        amount::checked_add(self.total_burned(asset), amount).map(|_| ())
    }

    /// # Errors
    /// `AmountOverflow` if the running total cannot hold `amount` exactly.
    pub fn record_mint(&mut self, asset: &AssetId, amount: Decimal) -> Result<()> {
        let total = amount::checked_add(self.total_minted(asset), amount)?;
        self.minted.insert(asset.clone(), total);
        Ok(())
    }

    /// # Errors
    /// `AmountOverflow` if the running total cannot hold `amount` exactly.
    pub fn record_burn(&mut self, asset: &AssetId, amount: Decimal) -> Result<()> {
        let total = amount::checked_add(self.total_burned(asset), amount)?;
        self.burned.insert(asset.clone(), total);
        Ok(())
    }

    #[must_use]
    pub fn total_minted(&self, asset: &AssetId) -> Decimal {
        self.minted.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_burned(&self, asset: &AssetId) -> Decimal {
        self.burned.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Expected supply for an asset: minted - burned.
    pub fn expected_supply(&self, asset: &AssetId) -> Result<Decimal> {
        amount::checked_sub(self.total_minted(asset), self.total_burned(asset))
    }

    /// Check a token's reported supply and its summed balances against the
    /// recorded history.
    ///
    /// # Errors
    /// [`LedgerError::SupplyInvariantViolation`] if either differs from
    /// minted - burned.
    pub fn verify(
        &self,
        asset: &AssetId,
        total_supply: Decimal,
        sum_of_balances: Decimal,
    ) -> Result<()> {
        let expected = self.expected_supply(asset)?;
        if total_supply != expected || sum_of_balances != expected {
            return Err(LedgerError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {asset}: supply {total_supply}, balances {sum_of_balances}, \
                     expected {expected} (minted={}, burned={})",
                    self.total_minted(asset),
                    self.total_burned(asset),
                ),
            });
        }
        Ok(())
    }
}
