//! # stockledger-assets
//!
//! **Balance plane**: the two balance ledgers the settlement engine moves
//! value on.
//!
//! ## Architecture
//!
//! 1. **AssetToken**: one mintable/burnable balance table per asset
//! 2. **AssetTokenRegistry**: deploys tokens lazily, one per asset id,
//!    and issues mint/burn/transfer against them, directly or through a
//!    [`StagedToken`] copy committed in one step
//! 3. **StablecoinLedger**: trait seam for the external stablecoin
//!    (allowance-based `transfer_from`), with [`InMemoryStablecoin`]
//! 4. **StablecoinGateway**: `pull` (allowance) and `push` (custody payout)
//!
//! Every mutation here is individually atomic. Cross-ledger atomicity is the
//! settlement engine's job.

pub mod gateway;
pub mod registry;
pub mod stablecoin;
pub mod token;

pub use gateway::StablecoinGateway;
pub use registry::{AssetTokenRegistry, Deployment, StagedToken};
pub use stablecoin::{InMemoryStablecoin, StablecoinLedger};
pub use token::AssetToken;
