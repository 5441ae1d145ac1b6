// DappLottery backend
// Page data and contract access for the lottery front-end

pub mod blockchain;
pub mod config;
pub mod contract;
pub mod error;
pub mod format;
pub mod mock;
pub mod models;
pub mod pages;
pub mod rpc;
pub mod shutdown;
pub mod units;
pub mod wallet;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use blockchain::LotteryClient;
use config::{Config, DataSource};
use rpc::{HttpTransport, JsonRpcTransport};
use wallet::WalletStore;

/// Application state shared across handlers
pub struct AppState {
    pub data_source: DataSource,
    pub client: Arc<LotteryClient>,
}

impl AppState {
    /// Build the contract client from configuration. Missing RPC or wallet
    /// URLs leave the corresponding transport unset.
    pub fn from_config(config: &Config) -> Self {
        let provider = config
            .rpc_url
            .as_ref()
            .map(|url| Arc::new(HttpTransport::new(url.clone())) as Arc<dyn JsonRpcTransport>);
        let wallet = config
            .wallet_url
            .as_ref()
            .map(|url| Arc::new(HttpTransport::new(url.clone())) as Arc<dyn JsonRpcTransport>);

        let client = LotteryClient::new(
            config.contract_address,
            provider,
            wallet,
            WalletStore::new(),
        )
        .with_receipt_timing(config.receipt_poll, config.receipt_timeout);

        Self {
            data_source: config.data_source,
            client: Arc::new(client),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(pages::health_check))
        // Pages
        .route("/", get(pages::home))
        .route("/jackpots/:jackpot_id", get(pages::jackpot))
        .route("/results/:result_id", get(pages::result))
        // Contract API
        .route("/api/jackpots", get(pages::home).post(pages::create_lottery))
        .route("/api/jackpots/:jackpot_id/tickets", post(pages::buy_ticket))
        .route(
            "/api/jackpots/:jackpot_id/lucky-numbers",
            post(pages::import_lucky_numbers),
        )
        .route("/api/jackpots/:jackpot_id/draw", post(pages::draw_winners))
        .route("/api/wallet", get(pages::get_wallet))
        .route("/api/wallet/connect", post(pages::connect_wallet))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
