//! Identifiers used throughout StockLedger.
//!
//! Order ids are a single ledger-wide counter, wallets and token contracts
//! are 20-byte addresses, and deployed asset tokens are addressed by an
//! arena handle.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{LedgerError, constants};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Ledger-wide order identifier.
///
/// Assigned from one serializing counter starting at 0, so ids are strictly
/// increasing across all wallets and never reused. Defaults to [`OrderId::FIRST`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl OrderId {
    /// The first id handed out by a fresh ledger.
    pub const FIRST: Self = Self(0);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WalletAddress
// ---------------------------------------------------------------------------

/// A 20-byte account address. Used for client wallets, the manager, the
/// ledger's own custody account, and deployed token contracts.
///
/// Displays and (de)serializes as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct WalletAddress(pub [u8; 20]);

impl WalletAddress {
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Deterministic token contract address for an asset.
    ///
    /// `sha256(domain || asset_id)` truncated to 20 bytes, so the same asset
    /// always maps to the same token address.
    #[must_use]
    pub fn for_asset_token(asset_id: &AssetId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::TOKEN_ADDRESS_DOMAIN);
        hasher.update(asset_id.as_str().as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[..20]);
        Self(bytes)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for WalletAddress {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| LedgerError::Configuration(format!("invalid address {s:?}: {e}")))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|raw: Vec<u8>| {
            LedgerError::Configuration(format!(
                "invalid address {s:?}: expected 20 bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Opaque identifier of a tokenized stock-like asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenHandle
// ---------------------------------------------------------------------------

/// Handle to a deployed asset token: its slot in the registry arena plus
/// the token's contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenHandle {
    pub index: usize,
    pub address: WalletAddress,
}

impl fmt::Display for TokenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}@{}", self.index, self.address)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl WalletAddress {
    /// A random address.
    #[must_use]
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// An address whose every byte is `byte`. Handy for readable fixtures.
    #[must_use]
    pub fn repeat(byte: u8) -> Self {
        Self([byte; 20])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_next_is_strictly_increasing() {
        let a = OrderId::FIRST;
        let b = a.next();
        assert_eq!(b, OrderId(1));
        assert!(a < b);
    }

    #[test]
    fn wallet_address_hex_roundtrip() {
        let addr = WalletAddress::repeat(0xab);
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        let back: WalletAddress = text.parse().unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn wallet_address_accepts_missing_prefix() {
        let addr: WalletAddress = "0101010101010101010101010101010101010101".parse().unwrap();
        assert_eq!(addr, WalletAddress::repeat(1));
    }

    #[test]
    fn wallet_address_rejects_wrong_length() {
        let err = "0xdeadbeef".parse::<WalletAddress>().unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn wallet_address_serializes_as_string() {
        let addr = WalletAddress::repeat(2);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn asset_token_address_is_deterministic() {
        let a = WalletAddress::for_asset_token(&AssetId::new("AAPL"));
        let b = WalletAddress::for_asset_token(&AssetId::new("AAPL"));
        let c = WalletAddress::for_asset_token(&AssetId::new("MSFT"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, WalletAddress::ZERO);
    }

    #[test]
    fn random_addresses_differ() {
        assert_ne!(WalletAddress::random(), WalletAddress::random());
    }
}
