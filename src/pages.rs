// Page and API handlers.
//
// Each page handler performs the page's server-side fetch and returns its
// props as JSON, from either the mock generators or the contract.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::blockchain::report_error;
use crate::config::DataSource;
use crate::error::{ApiError, ClientError};
use crate::mock;
use crate::models::{
    BuyTicketRequest, CreateLotteryRequest, DrawWinnersRequest, HomePage,
    ImportLuckyNumbersRequest, JackpotPage, ResultPage, TransactionResponse, WalletResponse,
};
use crate::AppState;

pub const HOME_LOTTERIES: usize = 7;
pub const MOCK_PURCHASED_NUMBERS: usize = 5;
pub const MOCK_PARTICIPANTS: usize = 6;
/// Upper bound on lucky numbers imported in one transaction
pub const MAX_LUCKY_NUMBERS: usize = 1000;

fn require_chain(state: &AppState) -> Result<(), ApiError> {
    match state.data_source {
        DataSource::Chain => Ok(()),
        DataSource::Mock => Err(ApiError::MockSource),
    }
}

/// Writes need the chain source and a wallet; checked before any RPC read.
fn require_wallet(state: &AppState) -> Result<(), ApiError> {
    require_chain(state)?;
    if !state.client.has_wallet() {
        report_error(&ClientError::NoWallet);
        return Err(ClientError::NoWallet.into());
    }
    Ok(())
}

/// Home page: all lotteries
pub async fn home(State(state): State<Arc<AppState>>) -> Result<Json<HomePage>, ApiError> {
    let jackpots = match state.data_source {
        DataSource::Mock => mock::generate_lotteries(HOME_LOTTERIES),
        DataSource::Chain => state.client.get_lotteries().await?,
    };
    Ok(Json(HomePage { jackpots }))
}

/// Jackpot page: one lottery with its lucky and purchased numbers
pub async fn jackpot(
    State(state): State<Arc<AppState>>,
    Path(jackpot_id): Path<u64>,
) -> Result<Json<JackpotPage>, ApiError> {
    let page = match state.data_source {
        DataSource::Mock => JackpotPage {
            lottery: mock::generate_lottery(jackpot_id),
            lottery_numbers: mock::generate_lucky_numbers(MOCK_PURCHASED_NUMBERS * 2),
            numbers_purchased: mock::get_purchased_numbers(MOCK_PURCHASED_NUMBERS),
        },
        DataSource::Chain => {
            let client = &state.client;
            let (lottery, lottery_numbers, numbers_purchased) = tokio::try_join!(
                client.get_lottery(jackpot_id),
                client.get_lucky_numbers(jackpot_id),
                client.get_purchased_numbers(jackpot_id),
            )?;
            JackpotPage {
                lottery,
                lottery_numbers,
                numbers_purchased,
            }
        }
    };
    Ok(Json(page))
}

/// Result page: lottery, participants and, once drawn, the draw result
pub async fn result(
    State(state): State<Arc<AppState>>,
    Path(result_id): Path<u64>,
) -> Result<Json<ResultPage>, ApiError> {
    let page = match state.data_source {
        DataSource::Mock => ResultPage {
            lottery: mock::generate_lottery(result_id),
            participant_list: mock::generate_lottery_participants(MOCK_PARTICIPANTS),
            lottery_result: None,
        },
        DataSource::Chain => {
            let client = &state.client;
            let (lottery, participant_list) = tokio::try_join!(
                client.get_lottery(result_id),
                client.get_participants(result_id),
            )?;
            let lottery_result = if lottery.drawn {
                Some(client.get_lottery_result(result_id).await?)
            } else {
                None
            };
            ResultPage {
                lottery,
                participant_list,
                lottery_result,
            }
        }
    };
    Ok(Json(page))
}

pub async fn create_lottery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLotteryRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    require_chain(&state)?;
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }
    info!("Creating lottery {:?}", req.title);
    let transaction_hash = state.client.create_lottery(&req).await?;
    Ok(Json(TransactionResponse { transaction_hash }))
}

/// Buy a ticket at the lottery's current ticket price
pub async fn buy_ticket(
    State(state): State<Arc<AppState>>,
    Path(jackpot_id): Path<u64>,
    Json(req): Json<BuyTicketRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    require_wallet(&state)?;
    let lottery = state.client.get_lottery(jackpot_id).await?;
    let transaction_hash = state
        .client
        .buy_ticket(jackpot_id, req.lucky_number_id, &lottery.ticket_price)
        .await?;
    Ok(Json(TransactionResponse { transaction_hash }))
}

pub async fn import_lucky_numbers(
    State(state): State<Arc<AppState>>,
    Path(jackpot_id): Path<u64>,
    Json(req): Json<ImportLuckyNumbersRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    require_chain(&state)?;
    let requested = match (&req.lucky_numbers, req.count) {
        (Some(numbers), _) => numbers.len(),
        (None, Some(count)) => count,
        (None, None) => 0,
    };
    if requested > MAX_LUCKY_NUMBERS {
        return Err(ApiError::BadRequest(format!(
            "at most {} lucky numbers can be imported at once",
            MAX_LUCKY_NUMBERS
        )));
    }
    require_wallet(&state)?;
    let numbers = match (req.lucky_numbers, req.count) {
        (Some(numbers), _) => numbers,
        (None, Some(count)) => mock::generate_lucky_numbers(count),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either luckyNumbers or count is required".into(),
            ))
        }
    };
    if numbers.is_empty() {
        return Err(ApiError::BadRequest("no lucky numbers to import".into()));
    }
    info!("Importing {} lucky numbers into lottery {}", numbers.len(), jackpot_id);
    let transaction_hash = state
        .client
        .import_lucky_numbers(jackpot_id, &numbers)
        .await?;
    Ok(Json(TransactionResponse { transaction_hash }))
}

pub async fn draw_winners(
    State(state): State<Arc<AppState>>,
    Path(jackpot_id): Path<u64>,
    Json(req): Json<DrawWinnersRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    require_chain(&state)?;
    if req.number_of_winners == 0 {
        return Err(ApiError::BadRequest("numberOfWinners must be at least 1".into()));
    }
    let transaction_hash = state
        .client
        .draw_winners(jackpot_id, req.number_of_winners)
        .await?;
    Ok(Json(TransactionResponse { transaction_hash }))
}

pub async fn get_wallet(State(state): State<Arc<AppState>>) -> Json<WalletResponse> {
    Json(WalletResponse {
        address: state.client.wallet_store().get().await,
    })
}

pub async fn connect_wallet(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WalletResponse>, ApiError> {
    let address = state.client.connect_wallet().await?;
    Ok(Json(WalletResponse { address }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let source = match state.data_source {
        DataSource::Mock => "mock",
        DataSource::Chain => "chain",
    };
    let wallet = state.client.wallet_store().get().await;

    Json(json!({
        "status": "healthy",
        "data_source": source,
        "provider": if state.client.has_provider() { "configured" } else { "missing" },
        "wallet": if state.client.has_wallet() { "configured" } else { "missing" },
        "account": wallet,
    }))
}
