//! System-wide constants for the StockLedger settlement ledger.

/// Fractional digits carried by every stablecoin and token amount.
pub const AMOUNT_SCALE: u32 = 18;

/// Domain tag hashed into deterministic token contract addresses.
pub const TOKEN_ADDRESS_DOMAIN: &[u8] = b"stockledger:token:v1:";

/// Default stablecoin display name.
pub const DEFAULT_STABLECOIN_NAME: &str = "USD Coin";

/// Default stablecoin ticker.
pub const DEFAULT_STABLECOIN_SYMBOL: &str = "USDC";

/// Maximum orders per wallet (0 = unlimited).
pub const DEFAULT_MAX_ORDERS_PER_WALLET: usize = 0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "StockLedger";
