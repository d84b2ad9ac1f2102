//! Stablecoin gateway: the engine's only path to the stablecoin ledger.
//!
//! `pull` takes payment on a pre-granted allowance, `push` pays out of
//! custody. The `ensure_*` checks have no side effects and mirror every
//! failure the movement itself can hit, so the engine can validate a whole
//! settlement before it moves anything.

use rust_decimal::Decimal;
use stockledger_types::{LedgerError, Result, WalletAddress, amount};

use crate::stablecoin::StablecoinLedger;

/// Thin accessor over a [`StablecoinLedger`].
#[derive(Debug, Clone)]
pub struct StablecoinGateway<S> {
    ledger: S,
}

impl<S: StablecoinLedger> StablecoinGateway<S> {
    #[must_use]
    pub fn new(ledger: S) -> Self {
        Self { ledger }
    }

    /// Move `amount` from `from` to `to`, spending the allowance `from`
    /// granted `to`.
    ///
    /// # Errors
    /// `InsufficientAllowance` or `InsufficientBalance`; nothing moves.
    pub fn pull(&mut self, from: WalletAddress, to: WalletAddress, amount: Decimal) -> Result<()> {
        self.ledger.transfer_from(to, from, to, amount)?;
        tracing::debug!(%from, %to, %amount, "Stablecoin pulled");
        Ok(())
    }

    /// Pay `amount` from `from` (custody) to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance`; nothing moves.
    pub fn push(&mut self, from: WalletAddress, to: WalletAddress, amount: Decimal) -> Result<()> {
        self.ledger.transfer(from, to, amount)?;
        tracing::debug!(%from, %to, %amount, "Stablecoin pushed");
        Ok(())
    }

    /// Would `pull(from, spender, amount)` succeed?
    ///
    /// # Errors
    /// `InsufficientAllowance`, `InsufficientBalance`, or `AmountOverflow`.
    pub fn ensure_pullable(
        &self,
        from: WalletAddress,
        spender: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        let allowed = self.ledger.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }
        amount::checked_sub(allowed, amount)?;
        self.ensure_pushable(from, spender, amount)
    }

    /// Would `push(from, to, amount)` succeed?
    ///
    /// # Errors
    /// `InvalidAmount`, `InsufficientBalance`, or `AmountOverflow` if
    /// either balance would lose precision.
    pub fn ensure_pushable(
        &self,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        amount::ensure_non_negative(amount)?;
        let available = self.ledger.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from != to {
            amount::checked_sub(available, amount)?;
            amount::checked_add(self.ledger.balance_of(to), amount)?;
        }
        Ok(())
    }

    /// Ticker of the underlying stablecoin.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.ledger.symbol()
    }

    #[must_use]
    pub fn balance_of(&self, holder: WalletAddress) -> Decimal {
        self.ledger.balance_of(holder)
    }

    /// Read access to the underlying stablecoin.
    #[must_use]
    pub fn ledger(&self) -> &S {
        &self.ledger
    }

    /// Write access for out-of-band actions (deposits, approvals) that the
    /// settlement engine does not mediate.
    pub fn ledger_mut(&mut self) -> &mut S {
        &mut self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStablecoin;

    fn setup() -> (StablecoinGateway<InMemoryStablecoin>, WalletAddress, WalletAddress) {
        let wallet = WalletAddress::random();
        let custody = WalletAddress::random();
        let coin = InMemoryStablecoin::with_supply(wallet, Decimal::new(1000, 0));
        (StablecoinGateway::new(coin), wallet, custody)
    }

    #[test]
    fn pull_spends_allowance_granted_to_recipient() {
        let (mut gw, wallet, custody) = setup();
        gw.ledger_mut()
            .approve(wallet, custody, Decimal::new(500, 0))
            .unwrap();

        gw.pull(wallet, custody, Decimal::new(400, 0)).unwrap();
        assert_eq!(gw.balance_of(wallet), Decimal::new(600, 0));
        assert_eq!(gw.balance_of(custody), Decimal::new(400, 0));
        assert_eq!(gw.ledger().allowance(wallet, custody), Decimal::new(100, 0));
    }

    #[test]
    fn ensure_pullable_matches_pull() {
        let (mut gw, wallet, custody) = setup();
        let err = gw
            .ensure_pullable(wallet, custody, Decimal::new(10, 0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));

        gw.ledger_mut()
            .approve(wallet, custody, Decimal::new(5000, 0))
            .unwrap();
        let err = gw
            .ensure_pullable(wallet, custody, Decimal::new(2000, 0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert!(gw.ensure_pullable(wallet, custody, Decimal::new(1000, 0)).is_ok());
    }

    #[test]
    fn push_pays_out_of_custody() {
        let (mut gw, wallet, custody) = setup();
        gw.ledger_mut()
            .transfer(wallet, custody, Decimal::new(300, 0))
            .unwrap();

        gw.push(custody, wallet, Decimal::new(200, 0)).unwrap();
        assert_eq!(gw.balance_of(custody), Decimal::new(100, 0));

        let err = gw.push(custody, wallet, Decimal::new(101, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(gw.balance_of(custody), Decimal::new(100, 0));
    }

    #[test]
    fn ensure_pushable_catches_precision_loss() {
        let custody = WalletAddress::random();
        let wallet = WalletAddress::random();
        let coin = InMemoryStablecoin::with_supply(custody, Decimal::new(100_000_000_000, 0));
        let gw = StablecoinGateway::new(coin);

        let err = gw
            .ensure_pushable(custody, wallet, Decimal::new(1, 18))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert!(gw.ensure_pushable(custody, wallet, Decimal::ONE).is_ok());
        assert_eq!(gw.symbol(), "USDC");
    }
}
