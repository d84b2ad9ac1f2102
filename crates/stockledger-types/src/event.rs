//! Audit events emitted by the ledger.
//!
//! Every committed transition (order created, token deployed, order settled)
//! appends one [`LedgerEvent`]. Failed operations append nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, OrderId, OrderType, TokenHandle, WalletAddress};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    /// A wallet created an order. For sells, `amount` tokens are now escrowed.
    OrderCreated {
        order_id: OrderId,
        wallet: WalletAddress,
        order_type: OrderType,
        asset_id: AssetId,
        amount: Decimal,
    },
    /// An asset's token was deployed on first use.
    TokenDeployed {
        asset_id: AssetId,
        handle: TokenHandle,
        name: String,
        symbol: String,
    },
    /// The manager settled an order.
    OrderSettled {
        order_id: OrderId,
        wallet: WalletAddress,
        settled_stablecoin_amount: Decimal,
        settled_token_amount: Decimal,
    },
}

impl LedgerEventKind {
    /// Short uppercase tag for log lines.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "ORDER_CREATED",
            Self::TokenDeployed { .. } => "TOKEN_DEPLOYED",
            Self::OrderSettled { .. } => "ORDER_SETTLED",
        }
    }
}

impl std::fmt::Display for LedgerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One entry of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the trail, starting at 0, gap-free.
    pub sequence: u64,
    pub kind: LedgerEventKind,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        let kind = LedgerEventKind::OrderSettled {
            order_id: OrderId(1),
            wallet: WalletAddress::ZERO,
            settled_stablecoin_amount: Decimal::new(200, 0),
            settled_token_amount: Decimal::new(40, 0),
        };
        assert_eq!(format!("{kind}"), "ORDER_SETTLED");
    }

    #[test]
    fn event_serializes_kind_by_name() {
        let event = LedgerEvent {
            sequence: 0,
            kind: LedgerEventKind::TokenDeployed {
                asset_id: AssetId::new("S"),
                handle: TokenHandle {
                    index: 0,
                    address: WalletAddress::for_asset_token(&AssetId::new("S")),
                },
                name: "stock-name".into(),
                symbol: "stock-symbol".into(),
            },
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("TokenDeployed"));
        assert!(json.contains("stock-symbol"));
    }
}
