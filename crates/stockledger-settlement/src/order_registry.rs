//! Append-only order log.
//!
//! Orders are stored in one `Vec` indexed by id (ids come from a single
//! ledger-wide counter, so id == position) plus a per-wallet index that
//! preserves creation order. Records are never removed; only the settlement
//! fields change, once, through the crate-private [`OrderRegistry::mark_settled`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockledger_types::{
    LedgerError, Order, OrderId, OrderRequest, OrderStatus, OrderType, Result, WalletAddress,
    amount,
};

/// Owns every order record.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: Vec<Order>,
    by_wallet: HashMap<WalletAddress, Vec<OrderId>>,
    next_id: OrderId,
    max_per_wallet: Option<usize>,
}

impl OrderRegistry {
    /// Create an empty registry with no per-wallet order cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that refuses more than `max` orders per wallet.
    #[must_use]
    pub fn with_limit(max: Option<usize>) -> Self {
        Self {
            max_per_wallet: max,
            ..Self::default()
        }
    }

    /// Would `create_order(wallet, _, request with amount)` succeed?
    ///
    /// # Errors
    /// `InvalidAmount` if `amount <= 0`, `OrderLimitExceeded` if the wallet
    /// is at its cap.
    pub fn ensure_can_create(&self, wallet: WalletAddress, amount: Decimal) -> Result<()> {
        amount::ensure_positive(amount)?;
        if let Some(max) = self.max_per_wallet {
            if self.wallet_order_count(wallet) >= max {
                return Err(LedgerError::OrderLimitExceeded { wallet, max });
            }
        }
        Ok(())
    }

    /// Append a new unsettled order and return its id.
    pub fn create_order(
        &mut self,
        wallet: WalletAddress,
        order_type: OrderType,
        request: OrderRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderId> {
        self.ensure_can_create(wallet, request.amount)?;

        let order_id = self.next_id;
        self.next_id = order_id.next();
        self.orders
            .push(Order::new(order_id, order_type, wallet, request, now));
        self.by_wallet.entry(wallet).or_default().push(order_id);
        Ok(order_id)
    }

    /// All of `wallet`'s orders in creation order. Empty if none.
    #[must_use]
    pub fn get_orders(&self, wallet: WalletAddress) -> Vec<Order> {
        self.by_wallet
            .get(&wallet)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        usize::try_from(order_id.0)
            .ok()
            .and_then(|idx| self.orders.get(idx))
    }

    /// The order `wallet` owns under `order_id`, if it can still be settled.
    ///
    /// # Errors
    /// `OrderNotFound` if the id is unknown or belongs to another wallet,
    /// `AlreadySettled` if it reached its terminal state.
    pub fn settleable(&self, wallet: WalletAddress, order_id: OrderId) -> Result<&Order> {
        let order = self
            .get(order_id)
            .filter(|o| o.wallet == wallet)
            .ok_or(LedgerError::OrderNotFound(order_id))?;
        if order.status() == OrderStatus::Settled {
            return Err(LedgerError::AlreadySettled(order_id));
        }
        Ok(order)
    }

    /// Write the settlement fields. Only the settlement engine calls this.
    ///
    /// # Errors
    /// `OrderNotFound` for an unknown id, `AlreadySettled` if already settled
    /// (the record is left untouched).
    pub(crate) fn mark_settled(
        &mut self,
        order_id: OrderId,
        settled_stablecoin_amount: Decimal,
        settled_token_amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<&Order> {
        let order = usize::try_from(order_id.0)
            .ok()
            .and_then(|idx| self.orders.get_mut(idx))
            .ok_or(LedgerError::OrderNotFound(order_id))?;
        if order.settled {
            return Err(LedgerError::AlreadySettled(order_id));
        }
        order.settled = true;
        order.settled_stablecoin_amount = settled_stablecoin_amount;
        order.settled_token_amount = settled_token_amount;
        order.settled_at = Some(now);
        Ok(order)
    }

    #[must_use]
    pub fn wallet_order_count(&self, wallet: WalletAddress) -> usize {
        self.by_wallet.get(&wallet).map_or(0, Vec::len)
    }

    /// Total orders across all wallets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
