//! # stockledger-types
//!
//! Shared types, errors, and configuration for the **StockLedger**
//! custodial settlement ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`WalletAddress`], [`AssetId`], [`TokenHandle`]
//! - **Order model**: [`Order`], [`OrderType`], [`OrderStatus`], [`OrderRequest`]
//! - **Audit trail**: [`LedgerEvent`], [`LedgerEventKind`]
//! - **Configuration**: [`LedgerConfig`], [`StablecoinConfig`]
//! - **Errors**: [`LedgerError`] with `SL_ERR_` prefix codes
//! - **Amounts**: validation helpers in [`amount`]
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use stockledger_types::{Order, OrderType, WalletAddress, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;

// Amount helpers and constants are accessed via their modules
// (`stockledger_types::amount::ensure_positive`, `constants::AMOUNT_SCALE`).
