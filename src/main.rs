// DappLottery Backend Server
// Serves lottery page data from mock generators or the lottery contract

use anyhow::Result;
use dapp_lottery::config::{Config, DataSource};
use dapp_lottery::wallet::WalletWatcher;
use dapp_lottery::{router, shutdown, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("dapp_lottery=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting DappLottery Backend Server");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Data source: {:?}", config.data_source);
    info!("  RPC provider: {}", config.rpc_url.as_deref().unwrap_or("<none>"));
    info!("  Wallet endpoint: {}", config.wallet_url.as_deref().unwrap_or("<none>"));
    info!("  Contract: {:?}", config.contract_address);
    info!("  Server Port: {}", config.port);

    if config.data_source == DataSource::Chain && config.rpc_url.is_none() {
        warn!("RPC_URL is not set, contract reads will fail");
    }

    let state = Arc::new(AppState::from_config(&config));

    // Watch wallet account/network changes in background
    if state.client.has_wallet() && !config.wallet_watch.is_zero() {
        let watcher = WalletWatcher::new(state.client.clone(), config.wallet_watch);
        tokio::spawn(async move { watcher.run().await });
    }

    let app = router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DappLottery Backend listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
