//! Error types for the StockLedger settlement ledger.
//!
//! All errors use the `SL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Balance errors
//! - 3xx: Asset token errors
//! - 4xx: Access control errors
//! - 8xx: Safety invariant errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AssetId, OrderId, TokenHandle, WalletAddress};

/// Central error enum for all StockLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// No order with this id exists (for the given wallet).
    #[error("SL_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order has already reached its terminal settled state.
    #[error("SL_ERR_101: Order already settled: {0}")]
    AlreadySettled(OrderId),

    /// Non-positive amount, negative settlement amount, or too many
    /// fractional digits.
    #[error("SL_ERR_102: Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    /// A sell settlement tried to consume more tokens than were escrowed.
    #[error("SL_ERR_103: Settled token amount {settled} exceeds escrowed {escrowed} for {order_id}")]
    SettledTokenExceedsEscrow {
        order_id: OrderId,
        settled: Decimal,
        escrowed: Decimal,
    },

    /// The wallet already holds the configured maximum number of orders.
    #[error("SL_ERR_104: Order limit exceeded for wallet {wallet}: max {max}")]
    OrderLimitExceeded { wallet: WalletAddress, max: usize },

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough balance to perform the movement.
    #[error("SL_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The spender's allowance from the owner is too small.
    #[error("SL_ERR_201: Insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Decimal, allowed: Decimal },

    /// A balance, supply, or allowance update would overflow or round away
    /// fractional digits.
    #[error("SL_ERR_202: Amount overflow: {reason}")]
    AmountOverflow { reason: String },

    // =================================================================
    // Asset Token Errors (3xx)
    // =================================================================
    /// No token has been deployed for this asset.
    #[error("SL_ERR_300: Unknown asset: {0}")]
    UnknownAsset(AssetId),

    /// A token handle that does not point into the registry.
    #[error("SL_ERR_301: Unknown token handle: {0}")]
    UnknownToken(TokenHandle),

    // =================================================================
    // Access Control Errors (4xx)
    // =================================================================
    /// Only the manager may settle orders.
    #[error("SL_ERR_400: Unauthorized caller {caller}: settlement is manager-only")]
    Unauthorized { caller: WalletAddress },

    // =================================================================
    // Safety Errors (8xx)
    // =================================================================
    /// Token supply no longer matches minted minus burned.
    #[error("SL_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Shorthand for [`LedgerError::InvalidAmount`].
    pub fn invalid_amount(amount: Decimal, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            amount,
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
