//! Settlement engine: order creation, escrow, and manager settlement.
//!
//! Escrow is asymmetric:
//! - **Buy**: nothing moves at creation. At settlement the engine pulls the
//!   settled stablecoin on the wallet's allowance and mints the settled
//!   tokens to the wallet.
//! - **Sell**: the full `amount` of tokens moves into custody at creation.
//!   At settlement the engine burns the settled tokens from custody, pays
//!   the settled stablecoin out of custody, and returns the rest of the
//!   escrow to the wallet.
//!
//! Every operation checks all of its preconditions before the first
//! mutation, so a failure leaves orders, tokens, stablecoin, and the audit
//! trail exactly as they were.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockledger_assets::{AssetToken, AssetTokenRegistry, StablecoinGateway, StablecoinLedger};
use stockledger_types::{
    AssetId, LedgerConfig, LedgerError, LedgerEvent, LedgerEventKind, Order, OrderId, OrderRequest,
    OrderType, Result, TokenHandle, WalletAddress, amount,
};

use crate::access::{AccessControl, ManagerCapability};
use crate::order_registry::OrderRegistry;
use crate::supply_conservation::SupplyConservation;

/// The ledger: owns the order log, asset tokens, and stablecoin gateway.
///
/// Transitions take `&mut self`, reads take `&self`; wrap in
/// [`SharedLedger`](crate::SharedLedger) to share across threads.
#[derive(Debug)]
pub struct SettlementEngine<S> {
    config: LedgerConfig,
    access: AccessControl,
    orders: OrderRegistry,
    tokens: AssetTokenRegistry,
    stablecoin: StablecoinGateway<S>,
    supply: SupplyConservation,
    events: Vec<LedgerEvent>,
}

impl<S: StablecoinLedger> SettlementEngine<S> {
    /// Build a ledger over `stablecoin`.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation or its stablecoin
    /// name/symbol differ from `stablecoin`'s.
    pub fn new(config: LedgerConfig, stablecoin: S) -> Result<Self> {
        config.validate()?;
        if stablecoin.name() != config.stablecoin.name
            || stablecoin.symbol() != config.stablecoin.symbol
        {
            return Err(LedgerError::Configuration(format!(
                "stablecoin is {} ({}), config expects {} ({})",
                stablecoin.name(),
                stablecoin.symbol(),
                config.stablecoin.name,
                config.stablecoin.symbol,
            )));
        }
        tracing::info!(
            manager = %config.manager,
            custody = %config.custody,
            stablecoin = %config.stablecoin.symbol,
            "Ledger started"
        );
        Ok(Self {
            access: AccessControl::new(config.manager),
            orders: OrderRegistry::with_limit(config.order_limit()),
            tokens: AssetTokenRegistry::new(),
            stablecoin: StablecoinGateway::new(stablecoin),
            supply: SupplyConservation::new(),
            events: Vec::new(),
            config,
        })
    }

    // -----------------------------------------------------------------
    // Order creation (open to any wallet)
    // -----------------------------------------------------------------

    /// Record a buy order. No balance moves; the wallet is expected to have
    /// approved the custody account for at least `amount` of stablecoin, but
    /// that allowance is neither checked nor consumed here.
    ///
    /// # Errors
    /// `InvalidAmount`, `OrderLimitExceeded`.
    pub fn create_buy_order(&mut self, wallet: WalletAddress, request: OrderRequest) -> Result<OrderId> {
        let now = Utc::now();
        let asset_id = request.asset_id.clone();
        let amount = request.amount;

        let order_id = self
            .orders
            .create_order(wallet, OrderType::Buy, request, now)?;

        self.record_created(order_id, wallet, OrderType::Buy, asset_id, amount, now);
        Ok(order_id)
    }

    /// Record a sell order and escrow `amount` tokens from the wallet into
    /// custody. The asset's token must already exist.
    ///
    /// # Errors
    /// `InvalidAmount`, `OrderLimitExceeded`, `UnknownAsset` if the asset was
    /// never deployed, `InsufficientBalance` if the wallet holds fewer than
    /// `amount` tokens.
    pub fn create_sell_order(&mut self, wallet: WalletAddress, request: OrderRequest) -> Result<OrderId> {
        let now = Utc::now();
        let asset_id = request.asset_id.clone();
        let amount = request.amount;
        let custody = self.config.custody;

        self.orders.ensure_can_create(wallet, amount)?;
        let handle = self.tokens.require_token_handle(&asset_id)?;
        self.tokens.require_token(handle)?.ensure_balance(wallet, amount)?;

        self.tokens.transfer(handle, wallet, custody, amount)?;
        tracing::debug!(
            asset = %asset_id,
            %wallet,
            %amount,
            "Sell escrow taken into custody"
        );

        let order_id = self
            .orders
            .create_order(wallet, OrderType::Sell, request, now)?;

        self.record_created(order_id, wallet, OrderType::Sell, asset_id, amount, now);
        Ok(order_id)
    }

    fn record_created(
        &mut self,
        order_id: OrderId,
        wallet: WalletAddress,
        order_type: OrderType,
        asset_id: AssetId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) {
        tracing::info!(
            order = %order_id,
            %wallet,
            side = %order_type,
            asset = %asset_id,
            %amount,
            "Order created"
        );
        self.push_event(
            LedgerEventKind::OrderCreated {
                order_id,
                wallet,
                order_type,
                asset_id,
                amount,
            },
            now,
        );
    }

    // -----------------------------------------------------------------
    // Settlement (manager only)
    // -----------------------------------------------------------------

    /// Settle `wallet`'s order on behalf of `caller`.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is the manager, then everything
    /// [`settle_as`](Self::settle_as) can return.
    pub fn settle(
        &mut self,
        caller: WalletAddress,
        wallet: WalletAddress,
        order_id: OrderId,
        settled_stablecoin_amount: Decimal,
        settled_token_amount: Decimal,
    ) -> Result<()> {
        let capability = self.access.authorize(caller).inspect_err(|_| {
            tracing::warn!(%caller, order = %order_id, "Rejected settle from non-manager");
        })?;
        self.settle_as(
            &capability,
            wallet,
            order_id,
            settled_stablecoin_amount,
            settled_token_amount,
        )
    }

    /// Settle with an already-issued manager capability.
    ///
    /// The amounts are trusted input. For buys they are not bounded by the
    /// order's requested `amount`; for sells the token amount is capped by the
    /// escrow.
    ///
    /// # Errors
    /// - `Unauthorized` if the capability was issued for another manager
    /// - `OrderNotFound` if `wallet` has no order `order_id`
    /// - `AlreadySettled` if the order is already final
    /// - `InvalidAmount` if either amount is negative
    /// - Buy: `InsufficientAllowance` / `InsufficientBalance` on the pull
    /// - Sell: `SettledTokenExceedsEscrow`, or `InsufficientBalance` if
    ///   custody cannot cover the payout
    pub fn settle_as(
        &mut self,
        capability: &ManagerCapability,
        wallet: WalletAddress,
        order_id: OrderId,
        settled_stablecoin_amount: Decimal,
        settled_token_amount: Decimal,
    ) -> Result<()> {
        if !self.access.is_manager(capability.manager()) {
            return Err(LedgerError::Unauthorized {
                caller: capability.manager(),
            });
        }
        let order = self.orders.settleable(wallet, order_id)?.clone();
        amount::ensure_non_negative(settled_stablecoin_amount)?;
        amount::ensure_non_negative(settled_token_amount)?;

        let now = Utc::now();
        match order.order_type {
            OrderType::Buy => {
                self.settle_buy(&order, settled_stablecoin_amount, settled_token_amount, now)?;
            }
            OrderType::Sell => {
                self.settle_sell(&order, settled_stablecoin_amount, settled_token_amount)?;
            }
        }

        self.orders.mark_settled(
            order_id,
            settled_stablecoin_amount,
            settled_token_amount,
            now,
        )?;

        tracing::info!(
            order = %order_id,
            %wallet,
            side = %order.order_type,
            asset = %order.asset_id,
            stablecoin = %settled_stablecoin_amount,
            symbol = self.stablecoin.symbol(),
            tokens = %settled_token_amount,
            "Order settled"
        );
        self.push_event(
            LedgerEventKind::OrderSettled {
                order_id,
                wallet,
                settled_stablecoin_amount,
                settled_token_amount,
            },
            now,
        );
        Ok(())
    }

    fn settle_buy(
        &mut self,
        order: &Order,
        stablecoin: Decimal,
        tokens: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let custody = self.config.custody;

        // Checks. A fresh token is only deployed on commit, so a failed
        // check leaves no token behind.
        self.stablecoin
            .ensure_pullable(order.wallet, custody, stablecoin)?;
        let mut staged =
            self.tokens
                .stage(&order.asset_id, &order.asset_name, &order.asset_symbol);
        if !tokens.is_zero() {
            staged.mint(order.wallet, tokens)?;
        }
        self.supply.ensure_mint(&order.asset_id, tokens)?;

        // Effects.
        self.stablecoin.pull(order.wallet, custody, stablecoin)?;
        let deployment = self.tokens.commit(staged)?;
        self.supply.record_mint(&order.asset_id, tokens)?;

        if deployment.fresh {
            self.push_event(
                LedgerEventKind::TokenDeployed {
                    asset_id: order.asset_id.clone(),
                    handle: deployment.handle,
                    name: order.asset_name.clone(),
                    symbol: order.asset_symbol.clone(),
                },
                now,
            );
        }
        Ok(())
    }

    fn settle_sell(&mut self, order: &Order, stablecoin: Decimal, tokens: Decimal) -> Result<()> {
        let custody = self.config.custody;
        let escrowed = order.escrowed_tokens();

        // Checks.
        if tokens > escrowed {
            return Err(LedgerError::SettledTokenExceedsEscrow {
                order_id: order.order_id,
                settled: tokens,
                escrowed,
            });
        }
        let handle = self.tokens.require_token_handle(&order.asset_id)?;
        let refund = order.escrow_refund(tokens);
        let mut staged = self.tokens.stage_existing(handle)?;
        staged.burn(custody, tokens)?;
        staged.transfer(custody, order.wallet, refund)?;
        self.stablecoin
            .ensure_pushable(custody, order.wallet, stablecoin)?;
        self.supply.ensure_burn(&order.asset_id, tokens)?;

        // Effects.
        self.stablecoin.push(custody, order.wallet, stablecoin)?;
        self.tokens.commit(staged)?;
        self.supply.record_burn(&order.asset_id, tokens)?;

        tracing::debug!(
            order = %order.order_id,
            burned = %tokens,
            refunded = %refund,
            "Sell escrow released"
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// All of `wallet`'s orders in creation order.
    #[must_use]
    pub fn get_orders(&self, wallet: WalletAddress) -> Vec<Order> {
        self.orders.get_orders(wallet)
    }

    #[must_use]
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Handle of the asset's token, if it has been deployed.
    #[must_use]
    pub fn get_token_handle(&self, asset_id: &AssetId) -> Option<TokenHandle> {
        self.tokens.get_token_handle(asset_id)
    }

    #[must_use]
    pub fn token(&self, handle: TokenHandle) -> Option<&AssetToken> {
        self.tokens.token(handle)
    }

    #[must_use]
    pub fn token_for_asset(&self, asset_id: &AssetId) -> Option<&AssetToken> {
        self.tokens.token_for_asset(asset_id)
    }

    /// Token balance of `holder` for an asset; zero if never deployed.
    #[must_use]
    pub fn token_balance(&self, asset_id: &AssetId, holder: WalletAddress) -> Decimal {
        self.token_for_asset(asset_id)
            .map_or(Decimal::ZERO, |t| t.balance_of(holder))
    }

    #[must_use]
    pub fn stablecoin_balance(&self, holder: WalletAddress) -> Decimal {
        self.stablecoin.balance_of(holder)
    }

    /// The underlying stablecoin.
    #[must_use]
    pub fn stablecoin(&self) -> &S {
        self.stablecoin.ledger()
    }

    /// Mutable stablecoin access for out-of-band deposits and approvals.
    pub fn stablecoin_mut(&mut self) -> &mut S {
        self.stablecoin.ledger_mut()
    }

    #[must_use]
    pub fn manager(&self) -> WalletAddress {
        self.access.manager()
    }

    #[must_use]
    pub fn custody(&self) -> WalletAddress {
        self.config.custody
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Append-only audit trail.
    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Check that the asset token's supply equals minted minus burned and
    /// the sum of holder balances.
    ///
    /// # Errors
    /// `UnknownAsset`, or `SupplyInvariantViolation`.
    pub fn verify_supply(&self, asset_id: &AssetId) -> Result<()> {
        let token = self
            .token_for_asset(asset_id)
            .ok_or_else(|| LedgerError::UnknownAsset(asset_id.clone()))?;
        self.supply
            .verify(asset_id, token.total_supply(), token.sum_of_balances())
            .inspect_err(|e| tracing::error!(asset = %asset_id, error = %e, "Supply check failed"))
    }

    /// [`verify_supply`](Self::verify_supply) for every deployed token.
    ///
    /// # Errors
    /// The first `SupplyInvariantViolation` found.
    pub fn verify_all_supply(&self) -> Result<()> {
        self.tokens
            .iter()
            .try_for_each(|token| self.verify_supply(token.asset_id()))
    }

    fn push_event(&mut self, kind: LedgerEventKind, at: DateTime<Utc>) {
        let sequence = self.events.len() as u64;
        self.events.push(LedgerEvent { sequence, kind, at });
    }
}
