//! # stockledger-settlement
//!
//! **Settlement plane**: order registry, manager access control, escrow,
//! and settlement of orders against the asset and stablecoin ledgers.
//!
//! ## Architecture
//!
//! 1. **OrderRegistry**: append-only order log with a ledger-wide id counter
//! 2. **AccessControl**: one fixed manager; issues `ManagerCapability`
//! 3. **SettlementEngine**: escrow at sell creation, pull at buy settlement,
//!    burn/payout/refund at sell settlement; all-or-nothing transitions
//! 4. **SupplyConservation**: minted − burned must equal token supply
//! 5. **SharedLedger**: `Arc<RwLock<_>>` handle for concurrent callers
//!
//! ## Order Flow
//!
//! ```text
//! wallet → create_buy_order ─────────────────────────→ OrderRegistry (Created)
//! wallet → create_sell_order → escrow tokens → custody → OrderRegistry (Created)
//! manager → settle → authorize → move balances → mark_settled (Settled)
//! ```

pub mod access;
pub mod engine;
pub mod order_registry;
pub mod shared;
pub mod supply_conservation;

pub use access::{AccessControl, ManagerCapability};
pub use engine::SettlementEngine;
pub use order_registry::OrderRegistry;
pub use shared::SharedLedger;
pub use supply_conservation::SupplyConservation;
