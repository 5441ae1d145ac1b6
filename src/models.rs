// Display records and request/response bodies for the lottery backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lottery round reshaped for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lottery {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub owner: String,
    pub prize: String,
    pub ticket_price: String,
    pub created_at: String,
    pub draws_at: String,
    pub expires_at: u64,
    pub winners: u64,
    pub participants: u64,
    pub drawn: bool,
}

/// A ticket holder of a lottery round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub account: String,
    pub lottery_number: String,
    pub paid: bool,
}

/// Outcome of a drawn lottery round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryResult {
    pub id: u64,
    pub completed: bool,
    pub paid_out: bool,
    pub timestamp: String,
    pub share_per_winner: String,
    pub winners: Vec<Participant>,
}

/// Home page props
#[derive(Debug, Serialize, Deserialize)]
pub struct HomePage {
    pub jackpots: Vec<Lottery>,
}

/// Jackpot page props
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JackpotPage {
    pub lottery: Lottery,
    pub lottery_numbers: Vec<String>,
    pub numbers_purchased: Vec<String>,
}

/// Result page props. `lottery_result` is empty until the round is drawn.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub lottery: Lottery,
    pub participant_list: Vec<Participant>,
    pub lottery_result: Option<LotteryResult>,
}

/// Request to create a new lottery round
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotteryRequest {
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(deserialize_with = "amount_string")]
    pub prize: String,
    #[serde(deserialize_with = "amount_string")]
    pub ticket_price: String,
    /// Milliseconds since the epoch
    pub expires_at: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyTicketRequest {
    pub lucky_number_id: u64,
}

/// Either an explicit list of lucky numbers, or a count to generate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLuckyNumbersRequest {
    #[serde(default)]
    pub lucky_numbers: Option<Vec<String>>,
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawWinnersRequest {
    pub number_of_winners: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub transaction_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub address: String,
}

/// Accept ether amounts as either JSON strings or numbers.
fn amount_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected an ether amount, got {}",
            other
        ))),
    }
}
