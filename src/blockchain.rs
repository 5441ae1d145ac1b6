// Contract client wrapper for the DappLottery contract.
//
// Reads go to the JSON-RPC provider with a throwaway `from` identity. Writes
// go to the wallet endpoint, which signs on behalf of the connected account.
// Every accessor checks its transport first and reports failures through
// `report_error`; nothing is retried.

use ethabi::ethereum_types::U256;
use ethabi::{Address, Token};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::contract::{
    decode_lotteries, decode_lottery, decode_lottery_result, decode_lucky_numbers,
    decode_participants, format_address, structure_lotteries, structure_lottery,
    structure_lottery_result, structure_participants, Method,
};
use crate::error::ClientError;
use crate::models::{CreateLotteryRequest, Lottery, LotteryResult, Participant};
use crate::rpc::{hex_data, JsonRpcTransport};
use crate::units::to_wei;
use crate::wallet::WalletStore;

pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(1);
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Log a client failure. Callers decide whether to surface it further.
pub fn report_error(error: &ClientError) {
    error!("{}", error);
}

pub struct LotteryClient {
    provider: Option<Arc<dyn JsonRpcTransport>>,
    wallet: Option<Arc<dyn JsonRpcTransport>>,
    contract: Address,
    reader: Address,
    store: WalletStore,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl LotteryClient {
    pub fn new(
        contract: Address,
        provider: Option<Arc<dyn JsonRpcTransport>>,
        wallet: Option<Arc<dyn JsonRpcTransport>>,
        store: WalletStore,
    ) -> Self {
        let reader = Address::from(rand::random::<[u8; 20]>());
        Self {
            provider,
            wallet,
            contract,
            reader,
            store,
            receipt_poll: DEFAULT_RECEIPT_POLL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_receipt_timing(mut self, poll: Duration, timeout: Duration) -> Self {
        self.receipt_poll = poll;
        self.receipt_timeout = timeout;
        self
    }

    pub fn wallet_store(&self) -> &WalletStore {
        &self.store
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn JsonRpcTransport>, ClientError> {
        self.provider.as_ref().ok_or(ClientError::NoProvider)
    }

    fn wallet(&self) -> Result<&Arc<dyn JsonRpcTransport>, ClientError> {
        self.wallet.as_ref().ok_or(ClientError::NoWallet)
    }

    // ----------------------------------------------------------------------
    // Wallet
    // ----------------------------------------------------------------------

    /// Ask the wallet for account access and store the first account.
    pub async fn connect_wallet(&self) -> Result<String, ClientError> {
        async {
            let wallet = self.wallet()?;
            let accounts = accounts(wallet.request("eth_requestAccounts", json!([])).await?)?;
            let first = accounts.into_iter().next().ok_or(ClientError::NoAccount)?;
            self.store.set(&first).await;
            info!("Wallet connected: {}", first);
            Ok::<_, ClientError>(self.store.get().await)
        }
        .await
        .inspect_err(report_error)
    }

    /// Sync the store with the wallet's currently exposed accounts. Clears
    /// the store when there are none.
    pub async fn monitor_wallet_connection(&self) -> Result<String, ClientError> {
        async {
            let accounts = self.wallet_accounts().await?;
            match accounts.first() {
                Some(first) => {
                    self.store.set(first).await;
                    Ok::<_, ClientError>(self.store.get().await)
                }
                None => {
                    self.store.clear().await;
                    Err(ClientError::NoAccount)
                }
            }
        }
        .await
        .inspect_err(report_error)
    }

    pub async fn wallet_accounts(&self) -> Result<Vec<String>, ClientError> {
        let wallet = self.wallet()?;
        accounts(wallet.request("eth_accounts", json!([])).await?)
    }

    pub async fn chain_id(&self) -> Result<String, ClientError> {
        let wallet = self.wallet()?;
        let value = wallet.request("eth_chainId", json!([])).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::decode(format!("invalid chain id: {}", value)))
    }

    // ----------------------------------------------------------------------
    // Reads
    // ----------------------------------------------------------------------

    async fn call(&self, method: Method, tokens: &[Token]) -> Result<Vec<u8>, ClientError> {
        let provider = self.provider()?;
        debug!("eth_call {} on {}", method.name(), provider.endpoint());
        let tx = json!({
            "from": format_address(&self.reader),
            "to": format_address(&self.contract),
            "data": format!("0x{}", hex::encode(method.encode(tokens))),
        });
        let result = provider.request("eth_call", json!([tx, "latest"])).await?;
        hex_data(&result)
    }

    pub async fn get_lotteries(&self) -> Result<Vec<Lottery>, ClientError> {
        self.call(Method::GetLotteries, &[])
            .await
            .and_then(|data| decode_lotteries(&data))
            .map(structure_lotteries)
            .inspect_err(report_error)
    }

    pub async fn get_lottery(&self, id: u64) -> Result<Lottery, ClientError> {
        self.call(Method::GetLottery, &[uint(id)])
            .await
            .and_then(|data| decode_lottery(&data))
            .and_then(|raw| {
                // unknown ids come back as a zeroed struct; real ids start at 1
                if raw.id.is_zero() {
                    Err(ClientError::NotFound(id))
                } else {
                    Ok(structure_lottery(raw))
                }
            })
            .inspect_err(report_error)
    }

    pub async fn get_lucky_numbers(&self, id: u64) -> Result<Vec<String>, ClientError> {
        self.call(Method::GetLotteryLuckyNumbers, &[uint(id)])
            .await
            .and_then(|data| decode_lucky_numbers(&data))
            .inspect_err(report_error)
    }

    pub async fn get_participants(&self, id: u64) -> Result<Vec<Participant>, ClientError> {
        self.call(Method::GetLotteryParticipants, &[uint(id)])
            .await
            .and_then(|data| decode_participants(&data))
            .map(structure_participants)
            .inspect_err(report_error)
    }

    /// Lottery numbers already bought, in participant order.
    pub async fn get_purchased_numbers(&self, id: u64) -> Result<Vec<String>, ClientError> {
        self.get_participants(id).await.map(|participants| {
            participants
                .into_iter()
                .map(|p| p.lottery_number)
                .collect()
        })
    }

    pub async fn get_lottery_result(&self, id: u64) -> Result<LotteryResult, ClientError> {
        self.call(Method::GetLotteryResult, &[uint(id)])
            .await
            .and_then(|data| decode_lottery_result(&data))
            .map(structure_lottery_result)
            .inspect_err(report_error)
    }

    // ----------------------------------------------------------------------
    // Writes
    // ----------------------------------------------------------------------

    /// Current wallet account, asking the wallet if the store is empty.
    async fn sender(&self) -> Result<String, ClientError> {
        let known = self.store.get().await;
        if !known.is_empty() {
            return Ok(known);
        }
        let first = self
            .wallet_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoAccount)?;
        self.store.set(&first).await;
        Ok(self.store.get().await)
    }

    /// Send a contract transaction through the wallet and wait until it is
    /// mined. Returns the transaction hash.
    async fn transact(
        &self,
        method: Method,
        tokens: &[Token],
        value: U256,
    ) -> Result<String, ClientError> {
        let wallet = self.wallet()?;
        let from = self.sender().await?;
        let tx = json!({
            "from": from,
            "to": format_address(&self.contract),
            "data": format!("0x{}", hex::encode(method.encode(tokens))),
            "value": format!("{:#x}", value),
        });

        let hash = wallet.request("eth_sendTransaction", json!([tx])).await?;
        let hash = hash
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::decode(format!("invalid transaction hash: {}", hash)))?;
        info!(
            "Sent {} transaction {} via {}",
            method.name(),
            hash,
            wallet.endpoint()
        );

        self.wait_for_receipt(wallet.as_ref(), &hash).await?;
        info!("Transaction {} mined", hash);
        Ok(hash)
    }

    async fn wait_for_receipt(
        &self,
        transport: &dyn JsonRpcTransport,
        hash: &str,
    ) -> Result<(), ClientError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt = transport
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if !receipt.is_null() {
                return match receipt["status"].as_str() {
                    Some("0x0") => Err(ClientError::Reverted(hash.to_string())),
                    _ => Ok(()),
                };
            }
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout(hash.to_string()));
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }

    pub async fn buy_ticket(
        &self,
        id: u64,
        lucky_number_id: u64,
        ticket_price: &str,
    ) -> Result<String, ClientError> {
        async {
            self.wallet()?;
            let value = to_wei(ticket_price)?;
            self.transact(Method::BuyTicket, &[uint(id), uint(lucky_number_id)], value)
                .await
        }
        .await
        .inspect_err(report_error)
    }

    pub async fn create_lottery(
        &self,
        params: &CreateLotteryRequest,
    ) -> Result<String, ClientError> {
        async {
            self.wallet()?;
            let tokens = [
                Token::String(params.title.clone()),
                Token::String(params.description.clone()),
                Token::String(params.image.clone()),
                Token::Uint(to_wei(&params.prize)?),
                Token::Uint(to_wei(&params.ticket_price)?),
                uint(params.expires_at),
            ];
            self.transact(Method::CreateLottery, &tokens, U256::zero())
                .await
        }
        .await
        .inspect_err(report_error)
    }

    pub async fn import_lucky_numbers(
        &self,
        id: u64,
        lucky_numbers: &[String],
    ) -> Result<String, ClientError> {
        let numbers = Token::Array(
            lucky_numbers
                .iter()
                .cloned()
                .map(Token::String)
                .collect(),
        );
        self.transact(Method::ImportLuckyNumbers, &[uint(id), numbers], U256::zero())
            .await
            .inspect_err(report_error)
    }

    pub async fn draw_winners(
        &self,
        id: u64,
        number_of_winners: u64,
    ) -> Result<String, ClientError> {
        self.transact(
            Method::RandomlySelectWinners,
            &[uint(id), uint(number_of_winners)],
            U256::zero(),
        )
        .await
        .inspect_err(report_error)
    }
}

fn uint(value: u64) -> Token {
    Token::Uint(U256::from(value))
}

fn accounts(value: Value) -> Result<Vec<String>, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::decode(format!("invalid account list: {}", e)))
}
