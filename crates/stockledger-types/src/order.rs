//! Order types for the StockLedger settlement ledger.
//!
//! An order has an immutable identity (id, type, asset, wallet, amount,
//! creation time) and settlement fields that are written exactly once when
//! the manager settles it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, OrderId, WalletAddress};

/// Direction of an order.
///
/// Buy spends stablecoin to receive asset tokens; Sell escrows asset tokens
/// to receive stablecoin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle state of an order. `Settled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Settled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// What a wallet submits when creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub asset_id: AssetId,
    /// Token name, used only if this order causes the asset's first deployment.
    pub asset_name: String,
    /// Token symbol, same first-registration-wins rule as `asset_name`.
    pub asset_symbol: String,
    /// Buy: stablecoin to spend. Sell: tokens offered.
    pub amount: Decimal,
}

impl OrderRequest {
    #[must_use]
    pub fn new(
        asset_id: impl Into<AssetId>,
        asset_name: impl Into<String>,
        asset_symbol: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_name: asset_name.into(),
            asset_symbol: asset_symbol.into(),
            amount,
        }
    }
}

/// A recorded order.
///
/// `settled`, `settled_at`, and the two settled amounts change together,
/// once. `settled_at` is `None` until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub order_type: OrderType,
    pub asset_id: AssetId,
    pub asset_name: String,
    pub asset_symbol: String,
    pub wallet: WalletAddress,
    pub amount: Decimal,
    pub settled: bool,
    pub settled_stablecoin_amount: Decimal,
    pub settled_token_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// A freshly created, unsettled order.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        order_type: OrderType,
        wallet: WalletAddress,
        request: OrderRequest,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            order_type,
            asset_id: request.asset_id,
            asset_name: request.asset_name,
            asset_symbol: request.asset_symbol,
            wallet,
            amount: request.amount,
            settled: false,
            settled_stablecoin_amount: Decimal::ZERO,
            settled_token_amount: Decimal::ZERO,
            created_at,
            settled_at: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> OrderStatus {
        if self.settled {
            OrderStatus::Settled
        } else {
            OrderStatus::Created
        }
    }

    /// Tokens held in custody for this order: the full `amount` for an open
    /// sell order, zero otherwise.
    #[must_use]
    pub fn escrowed_tokens(&self) -> Decimal {
        match (self.order_type, self.settled) {
            (OrderType::Sell, false) => self.amount,
            _ => Decimal::ZERO,
        }
    }

    /// Tokens handed back to the wallet when an open sell settles for
    /// `settled_token_amount` (at most [`escrowed_tokens`](Self::escrowed_tokens)).
    #[must_use]
    pub fn escrow_refund(&self, settled_token_amount: Decimal) -> Decimal {
        self.escrowed_tokens() - settled_token_amount
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(order_id: u64, order_type: OrderType, amount: Decimal) -> Self {
        Self::new(
            OrderId(order_id),
            order_type,
            WalletAddress::random(),
            OrderRequest::new("TEST", "Test Stock", "TST", amount),
            Utc::now(),
        )
    }
}
