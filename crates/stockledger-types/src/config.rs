//! Configuration types for a StockLedger instance.

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result, WalletAddress, constants};

/// Configuration for a single ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only address allowed to settle orders. Fixed for the ledger's lifetime.
    pub manager: WalletAddress,
    /// The ledger's own account: receives buy payments and sell escrow.
    pub custody: WalletAddress,
    /// Stablecoin the ledger settles against.
    #[serde(default)]
    pub stablecoin: StablecoinConfig,
    /// Maximum orders a single wallet may create (0 = unlimited).
    #[serde(default)]
    pub max_orders_per_wallet: usize,
}

/// Descriptive metadata of the settlement stablecoin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StablecoinConfig {
    pub name: String,
    pub symbol: String,
}

impl Default for StablecoinConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_STABLECOIN_NAME.to_string(),
            symbol: constants::DEFAULT_STABLECOIN_SYMBOL.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Config with default stablecoin metadata and no order limit.
    #[must_use]
    pub fn new(manager: WalletAddress, custody: WalletAddress) -> Self {
        Self {
            manager,
            custody,
            stablecoin: StablecoinConfig::default(),
            max_orders_per_wallet: constants::DEFAULT_MAX_ORDERS_PER_WALLET,
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::Configuration(format!("malformed ledger config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// `Configuration` if the manager and custody accounts coincide or the
    /// stablecoin symbol is empty.
    pub fn validate(&self) -> Result<()> {
        if self.manager == self.custody {
            return Err(LedgerError::Configuration(
                "manager and custody must be distinct accounts".into(),
            ));
        }
        if self.stablecoin.symbol.trim().is_empty() {
            return Err(LedgerError::Configuration(
                "stablecoin symbol must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The per-wallet order cap, if one is configured.
    #[must_use]
    pub fn order_limit(&self) -> Option<usize> {
        (self.max_orders_per_wallet > 0).then_some(self.max_orders_per_wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LedgerConfig::new(WalletAddress::repeat(1), WalletAddress::repeat(2));
        assert_eq!(cfg.stablecoin.symbol, "USDC");
        assert_eq!(cfg.order_limit(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_fills_defaults() {
        let json = r#"{
            "manager": "0x0101010101010101010101010101010101010101",
            "custody": "0x0202020202020202020202020202020202020202"
        }"#;
        let cfg = LedgerConfig::from_json(json).unwrap();
        assert_eq!(cfg.manager, WalletAddress::repeat(1));
        assert_eq!(cfg.custody, WalletAddress::repeat(2));
        assert_eq!(cfg.stablecoin.name, "USD Coin");
        assert_eq!(cfg.max_orders_per_wallet, 0);
    }

    #[test]
    fn from_json_reads_order_limit() {
        let json = r#"{
            "manager": "0x0101010101010101010101010101010101010101",
            "custody": "0x0202020202020202020202020202020202020202",
            "stablecoin": { "name": "Tether", "symbol": "USDT" },
            "max_orders_per_wallet": 3
        }"#;
        let cfg = LedgerConfig::from_json(json).unwrap();
        assert_eq!(cfg.stablecoin.symbol, "USDT");
        assert_eq!(cfg.order_limit(), Some(3));
    }

    #[test]
    fn manager_equal_to_custody_rejected() {
        let cfg = LedgerConfig::new(WalletAddress::repeat(1), WalletAddress::repeat(1));
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = LedgerConfig::from_json("{ \"manager\": 5 }").unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }
}
