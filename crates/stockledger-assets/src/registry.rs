//! Asset token registry: lazily deploys one token per asset.
//!
//! Arena layout: tokens live in a `Vec` and are addressed by
//! [`TokenHandle`]; a map resolves asset ids to handles. Entries are created
//! at most once per asset and never removed. The name and symbol given at
//! the first deployment win; later ones are ignored.
//!
//! Multi-step updates are staged: [`AssetTokenRegistry::stage`] hands out a
//! private copy of a token, the caller applies its mint/burn/transfer steps
//! to the copy, and [`AssetTokenRegistry::commit`] swaps it in. A failed
//! step leaves the registry untouched, and an undeployed asset is only
//! deployed on commit.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stockledger_types::{AssetId, LedgerError, Result, TokenHandle, WalletAddress};

use crate::token::AssetToken;

/// Outcome of [`AssetTokenRegistry::get_or_deploy_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub handle: TokenHandle,
    /// `true` if this call created the token.
    pub fresh: bool,
}

/// Working copy of one asset token.
///
/// Only the registry can create one, and changes take effect only through
/// [`AssetTokenRegistry::commit`].
#[derive(Debug)]
pub struct StagedToken {
    handle: Option<TokenHandle>,
    token: AssetToken,
}

impl StagedToken {
    /// The token as it will look after commit.
    #[must_use]
    pub fn token(&self) -> &AssetToken {
        &self.token
    }

    /// `true` if committing will deploy the token.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.handle.is_none()
    }

    /// Stage a mint. Same rules as [`AssetTokenRegistry::mint`].
    pub fn mint(&mut self, to: WalletAddress, amount: Decimal) -> Result<()> {
        self.token.mint(to, amount)
    }

    /// Stage a burn. Same rules as [`AssetTokenRegistry::burn`].
    pub fn burn(&mut self, holder: WalletAddress, amount: Decimal) -> Result<()> {
        self.token.burn(holder, amount)
    }

    /// Stage a transfer. Same rules as [`AssetTokenRegistry::transfer`].
    pub fn transfer(
        &mut self,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        self.token.transfer(from, to, amount)
    }
}

/// Owns every deployed asset token and the asset → token mapping.
#[derive(Debug, Default)]
pub struct AssetTokenRegistry {
    tokens: Vec<AssetToken>,
    by_asset: HashMap<AssetId, TokenHandle>,
}

impl AssetTokenRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the asset's token, deploying it on first use.
    pub fn get_or_deploy_token(
        &mut self,
        asset_id: &AssetId,
        asset_name: &str,
        asset_symbol: &str,
    ) -> Deployment {
        if let Some(handle) = self.by_asset.get(asset_id) {
            return Deployment {
                handle: *handle,
                fresh: false,
            };
        }

        let token = AssetToken::new(
            asset_id.clone(),
            asset_name.to_string(),
            asset_symbol.to_string(),
        );
        let handle = TokenHandle {
            index: self.tokens.len(),
            address: token.address(),
        };
        self.tokens.push(token);
        self.by_asset.insert(asset_id.clone(), handle);

        tracing::debug!(
            asset = %asset_id,
            token = %handle,
            name = asset_name,
            symbol = asset_symbol,
            "Asset token deployed"
        );

        Deployment {
            handle,
            fresh: true,
        }
    }

    /// Working copy of the asset's token, or of a fresh undeployed token
    /// named from `asset_name` / `asset_symbol` if the asset has none yet.
    #[must_use]
    pub fn stage(&self, asset_id: &AssetId, asset_name: &str, asset_symbol: &str) -> StagedToken {
        if let Some(handle) = self.get_token_handle(asset_id) {
            if let Some(token) = self.token(handle) {
                return StagedToken {
                    handle: Some(handle),
                    token: token.clone(),
                };
            }
        }
        StagedToken {
            handle: None,
            token: AssetToken::new(
                asset_id.clone(),
                asset_name.to_string(),
                asset_symbol.to_string(),
            ),
        }
    }

    /// Working copy of an already-deployed token.
    ///
    /// # Errors
    /// `UnknownToken` for a stale or foreign handle.
    pub fn stage_existing(&self, handle: TokenHandle) -> Result<StagedToken> {
        Ok(StagedToken {
            handle: Some(handle),
            token: self.require_token(handle)?.clone(),
        })
    }

    /// Apply a staged token, deploying it first if it is fresh.
    ///
    /// # Errors
    /// `UnknownToken` if the staged handle no longer resolves, `Internal` if
    /// a fresh token's asset was deployed in the meantime.
    pub fn commit(&mut self, staged: StagedToken) -> Result<Deployment> {
        let StagedToken { handle, token } = staged;
        let deployment = match handle {
            Some(handle) => Deployment {
                handle,
                fresh: false,
            },
            None => {
                if self.by_asset.contains_key(token.asset_id()) {
                    return Err(LedgerError::Internal(format!(
                        "asset {} deployed while staged",
                        token.asset_id()
                    )));
                }
                let asset_id = token.asset_id().clone();
                let (name, symbol) = (token.name().to_string(), token.symbol().to_string());
                self.get_or_deploy_token(&asset_id, &name, &symbol)
            }
        };
        *self.token_mut(deployment.handle)? = token;
        Ok(deployment)
    }

    /// Handle of an already-deployed asset token.
    #[must_use]
    pub fn get_token_handle(&self, asset_id: &AssetId) -> Option<TokenHandle> {
        self.by_asset.get(asset_id).copied()
    }

    /// Like [`get_token_handle`](Self::get_token_handle) but fails with
    /// `UnknownAsset` when the asset was never deployed.
    pub fn require_token_handle(&self, asset_id: &AssetId) -> Result<TokenHandle> {
        self.get_token_handle(asset_id)
            .ok_or_else(|| LedgerError::UnknownAsset(asset_id.clone()))
    }

    #[must_use]
    pub fn token(&self, handle: TokenHandle) -> Option<&AssetToken> {
        self.tokens
            .get(handle.index)
            .filter(|t| t.address() == handle.address)
    }

    /// Look up a deployed asset's token by asset id.
    #[must_use]
    pub fn token_for_asset(&self, asset_id: &AssetId) -> Option<&AssetToken> {
        self.get_token_handle(asset_id).and_then(|h| self.token(h))
    }

    /// Resolve a handle or fail with `UnknownToken`.
    pub fn require_token(&self, handle: TokenHandle) -> Result<&AssetToken> {
        self.token(handle).ok_or(LedgerError::UnknownToken(handle))
    }

    fn token_mut(&mut self, handle: TokenHandle) -> Result<&mut AssetToken> {
        self.tokens
            .get_mut(handle.index)
            .filter(|t| t.address() == handle.address)
            .ok_or(LedgerError::UnknownToken(handle))
    }

    /// Mint `amount` to `wallet`.
    ///
    /// # Errors
    /// `UnknownToken`, or `InvalidAmount` if `amount <= 0`.
    pub fn mint(&mut self, handle: TokenHandle, wallet: WalletAddress, amount: Decimal) -> Result<()> {
        self.token_mut(handle)?.mint(wallet, amount)
    }

    /// Burn `amount` from `holder`.
    ///
    /// # Errors
    /// `UnknownToken`, or `InsufficientBalance` if `holder` holds less.
    pub fn burn(&mut self, handle: TokenHandle, holder: WalletAddress, amount: Decimal) -> Result<()> {
        self.token_mut(handle)?.burn(holder, amount)
    }

    /// Transfer `amount` between holders.
    ///
    /// # Errors
    /// `UnknownToken`, or `InsufficientBalance` if `from` holds less.
    pub fn transfer(
        &mut self,
        handle: TokenHandle,
        from: WalletAddress,
        to: WalletAddress,
        amount: Decimal,
    ) -> Result<()> {
        self.token_mut(handle)?.transfer(from, to, amount)
    }

    /// Number of deployed tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All deployed tokens in deployment order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetToken> {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_deploys() {
        let mut reg = AssetTokenRegistry::new();
        let asset = AssetId::new("S");
        assert!(reg.get_token_handle(&asset).is_none());

        let d = reg.get_or_deploy_token(&asset, "stock-name", "stock-symbol");
        assert!(d.fresh);
        assert_eq!(d.handle.index, 0);
        assert_eq!(reg.get_token_handle(&asset), Some(d.handle));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn first_registration_wins() {
        let mut reg = AssetTokenRegistry::new();
        let asset = AssetId::new("S");
        let first = reg.get_or_deploy_token(&asset, "First Name", "FST");
        let second = reg.get_or_deploy_token(&asset, "Other Name", "OTH");
        assert!(!second.fresh);
        assert_eq!(first.handle, second.handle);

        let token = reg.token(first.handle).unwrap();
        assert_eq!(token.name(), "First Name");
        assert_eq!(token.symbol(), "FST");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn assets_get_distinct_tokens() {
        let mut reg = AssetTokenRegistry::new();
        let a = reg.get_or_deploy_token(&AssetId::new("A"), "A", "A").handle;
        let b = reg.get_or_deploy_token(&AssetId::new("B"), "B", "B").handle;
        assert_ne!(a, b);
        assert_eq!(b.index, 1);
    }

    #[test]
    fn mint_burn_transfer_through_handle() {
        let mut reg = AssetTokenRegistry::new();
        let h = reg.get_or_deploy_token(&AssetId::new("S"), "S", "S").handle;
        let w = WalletAddress::random();
        let custody = WalletAddress::random();

        reg.mint(h, w, Decimal::new(100, 0)).unwrap();
        reg.transfer(h, w, custody, Decimal::new(50, 0)).unwrap();
        reg.burn(h, custody, Decimal::new(40, 0)).unwrap();

        let t = reg.token(h).unwrap();
        assert_eq!(t.balance_of(w), Decimal::new(50, 0));
        assert_eq!(t.balance_of(custody), Decimal::new(10, 0));
        assert_eq!(t.total_supply(), Decimal::new(60, 0));
    }

    #[test]
    fn unknown_asset_and_handle() {
        let mut reg = AssetTokenRegistry::new();
        let err = reg.require_token_handle(&AssetId::new("nope")).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAsset(_)));

        let bogus = TokenHandle {
            index: 3,
            address: WalletAddress::ZERO,
        };
        let err = reg
            .mint(bogus, WalletAddress::random(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownToken(_)));
    }

    #[test]
    fn staged_changes_apply_only_on_commit() {
        let mut reg = AssetTokenRegistry::new();
        let asset = AssetId::new("S");
        let w = WalletAddress::random();

        let mut staged = reg.stage(&asset, "stock-name", "stock-symbol");
        assert!(staged.is_fresh());
        staged.mint(w, Decimal::new(100, 0)).unwrap();
        assert!(reg.get_token_handle(&asset).is_none());

        let d = reg.commit(staged).unwrap();
        assert!(d.fresh);
        let t = reg.token(d.handle).unwrap();
        assert_eq!(t.name(), "stock-name");
        assert_eq!(t.balance_of(w), Decimal::new(100, 0));
        assert_eq!(t.total_supply(), Decimal::new(100, 0));
    }

    #[test]
    fn failed_staged_step_leaves_registry_untouched() {
        let mut reg = AssetTokenRegistry::new();
        let asset = AssetId::new("S");
        let custody = WalletAddress::random();
        let w = WalletAddress::random();
        let h = reg.get_or_deploy_token(&asset, "S", "S").handle;
        reg.mint(h, custody, Decimal::new(50, 0)).unwrap();

        let mut staged = reg.stage_existing(h).unwrap();
        staged.burn(custody, Decimal::new(40, 0)).unwrap();
        // Only 10 left in the copy.
        let err = staged.transfer(custody, w, Decimal::new(20, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        drop(staged);

        let t = reg.token(h).unwrap();
        assert_eq!(t.balance_of(custody), Decimal::new(50, 0));
        assert_eq!(t.total_supply(), Decimal::new(50, 0));
    }

    #[test]
    fn commit_after_concurrent_deploy_is_rejected() {
        let mut reg = AssetTokenRegistry::new();
        let asset = AssetId::new("S");
        let staged = reg.stage(&asset, "Late", "LATE");
        reg.get_or_deploy_token(&asset, "Early", "ERLY");
        let err = reg.commit(staged).unwrap_err();
        assert!(matches!(err, LedgerError::Internal(_)));
        assert_eq!(reg.token_for_asset(&asset).unwrap().name(), "Early");
    }

    #[test]
    fn iter_in_deployment_order() {
        let mut reg = AssetTokenRegistry::new();
        reg.get_or_deploy_token(&AssetId::new("B"), "B", "B");
        reg.get_or_deploy_token(&AssetId::new("A"), "A", "A");
        let ids: Vec<&str> = reg.iter().map(|t| t.asset_id().as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
    }
}
