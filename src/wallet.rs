// Wallet store and account/network watcher

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::blockchain::LotteryClient;

/// Last-known wallet address, shared by every handler. Empty when no
/// account is connected. Each event overwrites it.
#[derive(Clone, Default)]
pub struct WalletStore {
    address: Arc<RwLock<String>>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> String {
        self.address.read().await.clone()
    }

    pub async fn set(&self, address: &str) {
        *self.address.write().await = address.to_lowercase();
    }

    pub async fn clear(&self) {
        self.address.write().await.clear();
    }
}

/// Polls the wallet endpoint for account and network changes.
///
/// An account change overwrites the store. A network change is handled as a
/// full reload: the store is cleared and the connection re-monitored.
pub struct WalletWatcher {
    client: Arc<LotteryClient>,
    interval: Duration,
}

impl WalletWatcher {
    pub fn new(client: Arc<LotteryClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub async fn run(&self) {
        info!("Starting wallet watcher (every {:?})", self.interval);

        let mut chain_id = self.client.chain_id().await.ok();
        let _ = self.client.monitor_wallet_connection().await;

        loop {
            tokio::time::sleep(self.interval).await;
            chain_id = self.tick(chain_id).await;
        }
    }

    /// One observation step. Returns the chain id to compare against next.
    pub async fn tick(&self, last_chain_id: Option<String>) -> Option<String> {
        let current = match self.client.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Wallet watcher could not read chain id: {}", e);
                return last_chain_id;
            }
        };

        if last_chain_id.is_some() && current != last_chain_id {
            info!(
                "Network changed from {:?} to {:?}, reloading wallet state",
                last_chain_id, current
            );
            self.client.wallet_store().clear().await;
            let _ = self.client.monitor_wallet_connection().await;
            return current;
        }

        let known = self.client.wallet_store().get().await;
        match self.client.wallet_accounts().await {
            Ok(accounts) => {
                let first = accounts.first().map(|a| a.to_lowercase()).unwrap_or_default();
                if first != known {
                    info!("Wallet account changed: {:?} -> {:?}", known, first);
                    let _ = self.client.monitor_wallet_connection().await;
                }
            }
            Err(e) => warn!("Wallet watcher could not read accounts: {}", e),
        }

        current
    }
}
