//! The stablecoin balance ledger the settlement engine moves money on.
//!
//! The real stablecoin lives outside this workspace; [`StablecoinLedger`]
//! is the seam. [`InMemoryStablecoin`] is the reference implementation used
//! by tests and single-process deployments.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stockledger_types::{LedgerError, Result, WalletAddress, amount, constants};

/// Transferable balance with owner → spender allowances.
///
/// Implementations must make `transfer` and `transfer_from` atomic: on error
/// no balance or allowance changes.
pub trait StablecoinLedger {
    /// Display name, e.g. "USD Coin".
    fn name(&self) -> &str;

    /// Ticker, e.g. "USDC".
    fn symbol(&self) -> &str;

    fn balance_of(&self, holder: WalletAddress) -> Decimal;

    /// How much `spender` may still pull from `owner`.
    fn allowance(&self, owner: WalletAddress, spender: WalletAddress) -> Decimal;

    fn total_supply(&self) -> Decimal;

    /// Set (not add to) `spender`'s allowance from `owner`.
    fn approve(&mut self, owner: WalletAddress, spender: WalletAddress, amount: Decimal) -> Result<()>;

    /// Move `amount` from `from` to `to` on `from`'s authority.
    fn transfer(&mut self, from: WalletAddress, to: WalletAddress, amount: Decimal) -> Result<()>;

    /// Move `amount` from `from` to `to` on `spender`'s authority, consuming
    /// the allowance `from` granted `spender`.
    fn transfer_from(
        &mut self,
        spender: WalletAddress,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()>;
}

/// In-memory stablecoin with a fixed supply minted at construction.
#[derive(Debug, Clone)]
pub struct InMemoryStablecoin {
    name: String,
    symbol: String,
    balances: HashMap<WalletAddress, Decimal>,
    allowances: HashMap<(WalletAddress, WalletAddress), Decimal>,
    total_supply: Decimal,
}

impl Default for InMemoryStablecoin {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_STABLECOIN_NAME.to_string(),
            symbol: constants::DEFAULT_STABLECOIN_SYMBOL.to_string(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Decimal::ZERO,
        }
    }
}

impl InMemoryStablecoin {
    /// Create an empty stablecoin (zero supply) with the default USDC metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stablecoin whose whole `supply` is held by `holder`.
    #[must_use]
    pub fn with_supply(holder: WalletAddress, supply: Decimal) -> Self {
        let mut coin = Self::new();
        coin.balances.insert(holder, supply);
        coin.total_supply = supply;
        coin
    }

    /// Replace the display name and ticker.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.name = name.into();
        self.symbol = symbol.into();
        self
    }

    /// New `(from, to)` balances after moving `amount`, or the reason it
    /// cannot move. Nothing is written.
    fn moved(
        &self,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<(Decimal, Decimal)> {
        amount::ensure_non_negative(amount)?;
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok((available, available));
        }
        let debited = amount::checked_sub(available, amount)?;
        let credited = amount::checked_add(self.balance_of(to), amount)?;
        Ok((debited, credited))
    }
}

impl StablecoinLedger for InMemoryStablecoin {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, holder: WalletAddress) -> Decimal {
        self.balances.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    fn allowance(&self, owner: WalletAddress, spender: WalletAddress) -> Decimal {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn total_supply(&self) -> Decimal {
        self.total_supply
    }

    fn approve(&mut self, owner: WalletAddress, spender: WalletAddress, amount: Decimal) -> Result<()> {
        amount::ensure_non_negative(amount)?;
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn transfer(&mut self, from: WalletAddress, to: WalletAddress, amount: Decimal) -> Result<()> {
        let (debited, credited) = self.moved(from, to, amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: WalletAddress,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        amount::ensure_non_negative(amount)?;
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }
        let remaining = amount::checked_sub(allowed, amount)?;
        // Compute everything first: if the balance is short the allowance
        // stays untouched.
        let (debited, credited) = self.moved(from, to, amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        self.allowances.insert((from, spender), remaining);
        Ok(())
    }
}
