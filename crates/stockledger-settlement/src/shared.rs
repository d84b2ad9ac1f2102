//! Thread-safe handle to a ledger.
//!
//! Creation and settlement take the write lock and run to completion before
//! any other transition starts; reads take the read lock and therefore only
//! ever see state between transitions.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use stockledger_assets::StablecoinLedger;
use stockledger_types::{
    AssetId, LedgerError, Order, OrderId, OrderRequest, Result, TokenHandle, WalletAddress,
};

use crate::engine::SettlementEngine;

/// Cloneable, `Send + Sync` (for `S: Send + Sync`) wrapper around a
/// [`SettlementEngine`].
#[derive(Debug)]
pub struct SharedLedger<S> {
    inner: Arc<RwLock<SettlementEngine<S>>>,
}

impl<S> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StablecoinLedger> SharedLedger<S> {
    #[must_use]
    pub fn new(engine: SettlementEngine<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SettlementEngine<S>>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Internal("ledger lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SettlementEngine<S>>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Internal("ledger lock poisoned".into()))
    }

    pub fn create_buy_order(&self, wallet: WalletAddress, request: OrderRequest) -> Result<OrderId> {
        self.write()?.create_buy_order(wallet, request)
    }

    pub fn create_sell_order(&self, wallet: WalletAddress, request: OrderRequest) -> Result<OrderId> {
        self.write()?.create_sell_order(wallet, request)
    }

    pub fn settle(
        &self,
        caller: WalletAddress,
        wallet: WalletAddress,
        order_id: OrderId,
        settled_stablecoin_amount: Decimal,
        settled_token_amount: Decimal,
    ) -> Result<()> {
        self.write()?.settle(
            caller,
            wallet,
            order_id,
            settled_stablecoin_amount,
            settled_token_amount,
        )
    }

    pub fn get_orders(&self, wallet: WalletAddress) -> Result<Vec<Order>> {
        Ok(self.read()?.get_orders(wallet))
    }

    pub fn get_token_handle(&self, asset_id: &AssetId) -> Result<Option<TokenHandle>> {
        Ok(self.read()?.get_token_handle(asset_id))
    }

    /// Run `f` against a consistent snapshot of the ledger.
    pub fn with_engine<T>(&self, f: impl FnOnce(&SettlementEngine<S>) -> T) -> Result<T> {
        Ok(f(&*self.read()?))
    }

    /// Run `f` with exclusive access, e.g. for out-of-band stablecoin moves.
    pub fn with_engine_mut<T>(&self, f: impl FnOnce(&mut SettlementEngine<S>) -> T) -> Result<T> {
        Ok(f(&mut *self.write()?))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use stockledger_assets::InMemoryStablecoin;
    use stockledger_types::LedgerConfig;

    #[test]
    fn concurrent_creators_get_unique_sequential_ids() {
        let manager = WalletAddress::random();
        let engine = SettlementEngine::new(
            LedgerConfig::new(manager, WalletAddress::random()),
            InMemoryStablecoin::new(),
        )
        .unwrap();
        let ledger = SharedLedger::new(engine);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    let wallet = WalletAddress::random();
                    for _ in 0..25 {
                        ledger
                            .create_buy_order(
                                wallet,
                                OrderRequest::new("S", "S", "S", Decimal::ONE),
                            )
                            .unwrap();
                    }
                    wallet
                })
            })
            .collect();
        let wallets: Vec<WalletAddress> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let mut ids: Vec<u64> = wallets
            .iter()
            .flat_map(|w| ledger.get_orders(*w).unwrap())
            .map(|o| o.order_id.0)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..100).collect::<Vec<u64>>());

        for wallet in &wallets {
            let orders = ledger.get_orders(*wallet).unwrap();
            assert_eq!(orders.len(), 25);
            assert!(orders.windows(2).all(|w| w[0].order_id < w[1].order_id));
        }
    }

    #[test]
    fn with_engine_mut_for_deposits() {
        let manager = WalletAddress::random();
        let wallet = WalletAddress::random();
        let engine = SettlementEngine::new(
            LedgerConfig::new(manager, WalletAddress::random()),
            InMemoryStablecoin::with_supply(manager, Decimal::new(10, 0)),
        )
        .unwrap();
        let ledger = SharedLedger::new(engine);
        ledger
            .with_engine_mut(|e| e.stablecoin_mut().transfer(manager, wallet, Decimal::new(4, 0)))
            .unwrap()
            .unwrap();
        let balance = ledger.with_engine(|e| e.stablecoin_balance(wallet)).unwrap();
        assert_eq!(balance, Decimal::new(4, 0));
    }
}
