//! Manager access control.
//!
//! One manager address is fixed when the ledger is built. Settlement is
//! capability-gated: [`AccessControl::authorize`] turns a caller address into
//! a [`ManagerCapability`], and only code holding one can finalize orders.
//! Neither type can be built outside this crate; the only `AccessControl`
//! a caller can reach is the one a
//! [`SettlementEngine`](crate::SettlementEngine) owns.

use stockledger_types::{LedgerError, Result, WalletAddress};

/// Proof that the holder authenticated as the manager.
///
/// Only [`AccessControl::authorize`] issues one:
///
/// ```compile_fail
/// use stockledger_settlement::ManagerCapability;
/// use stockledger_types::WalletAddress;
///
/// let forged = ManagerCapability { manager: WalletAddress::ZERO };
/// ```
#[derive(Debug)]
pub struct ManagerCapability {
    manager: WalletAddress,
}

impl ManagerCapability {
    /// The manager this capability was issued to.
    #[must_use]
    pub fn manager(&self) -> WalletAddress {
        self.manager
    }
}

/// Holds the single designated manager. No rotation.
///
/// Built only by the settlement engine from its config:
///
/// ```compile_fail
/// use stockledger_settlement::AccessControl;
/// use stockledger_types::WalletAddress;
///
/// let forged = AccessControl::new(WalletAddress::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct AccessControl {
    manager: WalletAddress,
}

impl AccessControl {
    #[must_use]
    pub(crate) fn new(manager: WalletAddress) -> Self {
        Self { manager }
    }

    #[must_use]
    pub fn manager(&self) -> WalletAddress {
        self.manager
    }

    #[must_use]
    pub fn is_manager(&self, caller: WalletAddress) -> bool {
        caller == self.manager
    }

    /// Issue a capability if `caller` is the manager.
    ///
    /// # Errors
    /// `Unauthorized` for any other caller.
    pub fn authorize(&self, caller: WalletAddress) -> Result<ManagerCapability> {
        if !self.is_manager(caller) {
            return Err(LedgerError::Unauthorized { caller });
        }
        Ok(ManagerCapability {
            manager: self.manager,
        })
    }
}
