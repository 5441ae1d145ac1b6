use axum::{extract::State, routing::post, Json, Router};
use dapp_lottery::config::Config;
use dapp_lottery::contract::{Method, RawLottery, RawLotteryResult, RawParticipant};
use dapp_lottery::models::{HomePage, JackpotPage, ResultPage, TransactionResponse};
use dapp_lottery::pages::MAX_LUCKY_NUMBERS;
use dapp_lottery::wallet::WalletWatcher;
use dapp_lottery::{router, AppState};
use ethabi::ethereum_types::U256;
use ethabi::{Address, ParamType, Token};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory stand-in for a node plus wallet, speaking Ethereum JSON-RPC.
#[derive(Default)]
struct FakeNode {
    lotteries: Vec<RawLottery>,
    lucky_numbers: Vec<String>,
    participants: Vec<RawParticipant>,
    accounts: Vec<String>,
    chain_id: String,
    revert: bool,
    sent: Vec<Value>,
    methods: Vec<String>,
}

type Shared = Arc<Mutex<FakeNode>>;

fn raw_lottery(id: u64, drawn: bool) -> RawLottery {
    RawLottery {
        id: U256::from(id),
        title: format!("Lottery {}", id),
        description: "on-chain".to_string(),
        image: "https://example.com/l.png".to_string(),
        prize: U256::exp10(18) * U256::from(25u64),
        ticket_price: U256::exp10(16) * U256::from(2u64),
        participants: U256::from(2u64),
        winners: U256::from(if drawn { 1u64 } else { 0 }),
        drawn,
        owner: Address::from([0xEE; 20]),
        created_at: U256::from(1_678_806_566u64),
        expires_at: U256::from(1_700_000_000_000u64),
    }
}

fn participant(byte: u8, number: &str) -> RawParticipant {
    RawParticipant {
        account: Address::from([byte; 20]),
        lottery_number: number.to_string(),
        paid: false,
    }
}

fn hex_result(tokens: &[Token]) -> Value {
    json!(format!("0x{}", hex::encode(ethabi::encode(tokens))))
}

fn handle_call(node: &FakeNode, data: &[u8]) -> Value {
    let (selector, args) = data.split_at(4);
    let id = if args.is_empty() {
        0
    } else {
        ethabi::decode(&[ParamType::Uint(256)], &args[..32]).unwrap()[0]
            .clone()
            .into_uint()
            .unwrap()
            .low_u64()
    };
    let lottery = |id: u64| {
        node.lotteries
            .iter()
            .find(|l| l.id == U256::from(id))
            .cloned()
            .unwrap_or_else(|| {
                let mut empty = raw_lottery(0, false);
                empty.title.clear();
                empty
            })
    };

    if selector == Method::GetLotteries.selector() {
        hex_result(&[Token::Array(
            node.lotteries.iter().cloned().map(RawLottery::into_token).collect(),
        )])
    } else if selector == Method::GetLottery.selector() {
        hex_result(&[lottery(id).into_token()])
    } else if selector == Method::GetLotteryLuckyNumbers.selector() {
        hex_result(&[Token::Array(
            node.lucky_numbers.iter().cloned().map(Token::String).collect(),
        )])
    } else if selector == Method::GetLotteryParticipants.selector() {
        hex_result(&[Token::Array(
            node.participants.iter().cloned().map(RawParticipant::into_token).collect(),
        )])
    } else if selector == Method::GetLotteryResult.selector() {
        let result = RawLotteryResult {
            id: U256::from(id),
            completed: true,
            paid_out: true,
            timestamp: U256::from(1_678_806_566u64),
            share_per_winner: U256::exp10(18) * U256::from(25u64),
            winners: node.participants.iter().take(1).cloned().collect(),
        };
        hex_result(&[result.into_token()])
    } else {
        panic!("unknown selector {}", hex::encode(selector));
    }
}

async fn rpc(State(node): State<Shared>, Json(req): Json<Value>) -> Json<Value> {
    let mut node = node.lock().unwrap();
    let method = req["method"].as_str().unwrap().to_string();
    node.methods.push(method.clone());
    let params = &req["params"];
    let result = match method.as_str() {
        "eth_call" => {
            let data = params[0]["data"].as_str().unwrap().trim_start_matches("0x");
            handle_call(&node, &hex::decode(data).unwrap())
        }
        "eth_accounts" | "eth_requestAccounts" => json!(node.accounts),
        "eth_chainId" => json!(node.chain_id),
        "eth_sendTransaction" => {
            node.sent.push(params[0].clone());
            json!(format!("0x{:064x}", node.sent.len()))
        }
        "eth_getTransactionReceipt" => {
            let status = if node.revert { "0x0" } else { "0x1" };
            json!({ "transactionHash": params[0], "status": status })
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": { "code": -32601, "message": format!("method {} not found", other) }
            }))
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": req["id"], "result": result }))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_node(node: FakeNode) -> (Shared, String) {
    let shared = Arc::new(Mutex::new(node));
    let app = Router::new().route("/", post(rpc)).with_state(shared.clone());
    (shared.clone(), serve(app).await)
}

fn chain_config(node_url: &str, with_wallet: bool) -> Config {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("DATA_SOURCE", "chain".to_string()),
        ("CONTRACT_ADDRESS", format!("0x{}", "5f".repeat(20))),
        ("RPC_URL", node_url.to_string()),
        ("RECEIPT_POLL_MS", "5".to_string()),
        ("RECEIPT_TIMEOUT_SECS", "2".to_string()),
    ]);
    if with_wallet {
        vars.insert("WALLET_URL", node_url.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

async fn spawn_chain_app(node: FakeNode) -> (Shared, Arc<AppState>, String) {
    spawn_chain_app_with(node, true).await
}

async fn spawn_chain_app_with(
    node: FakeNode,
    with_wallet: bool,
) -> (Shared, Arc<AppState>, String) {
    let (shared, node_url) = spawn_node(node).await;
    let state = Arc::new(AppState::from_config(&chain_config(&node_url, with_wallet)));
    let base = serve(router(state.clone())).await;
    (shared, state, base)
}

fn default_node() -> FakeNode {
    FakeNode {
        lotteries: vec![raw_lottery(2, false), raw_lottery(1, true)],
        lucky_numbers: vec!["abc123".into(), "def456".into(), "ghi789".into()],
        participants: vec![participant(0xA1, "abc123"), participant(0xB2, "def456")],
        accounts: vec!["0x00000000000000000000000000000000000000AA".into()],
        chain_id: "0x7a69".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn home_page_reads_contract_in_order() {
    let (_, _, base) = spawn_chain_app(default_node()).await;

    let page: HomePage = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<u64> = page.jackpots.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(page.jackpots[0].prize, "25.0");
    assert_eq!(page.jackpots[0].ticket_price, "0.02");
    assert_eq!(page.jackpots[0].owner, format!("0x{}", "ee".repeat(20)));
    assert_eq!(page.jackpots[0].created_at, "Tue, Mar 14, 2023");
}

#[tokio::test]
async fn jackpot_page_combines_three_reads() {
    let (_, _, base) = spawn_chain_app(default_node()).await;

    let page: JackpotPage = reqwest::get(format!("{}/jackpots/2", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.lottery.id, 2);
    assert_eq!(page.lottery_numbers, vec!["abc123", "def456", "ghi789"]);
    assert_eq!(page.numbers_purchased, vec!["abc123", "def456"]);
}

#[tokio::test]
async fn unknown_jackpot_is_not_found() {
    let (_, _, base) = spawn_chain_app(default_node()).await;
    let resp = reqwest::get(format!("{}/jackpots/99", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn jackpot_zero_is_not_found() {
    let (_, _, base) = spawn_chain_app(default_node()).await;
    let resp = reqwest::get(format!("{}/jackpots/0", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn buy_ticket_without_wallet_skips_the_lottery_read() {
    let (node, _, base) = spawn_chain_app_with(default_node(), false).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/jackpots/2/tickets", base))
        .json(&json!({ "luckyNumberId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    assert!(node.lock().unwrap().methods.is_empty());
}

#[tokio::test]
async fn lucky_number_import_is_capped() {
    let (node, _, base) = spawn_chain_app(default_node()).await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "count": 1_000_000_000_000u64 }),
        json!({ "count": MAX_LUCKY_NUMBERS + 1 }),
        json!({ "luckyNumbers": vec!["abc123"; MAX_LUCKY_NUMBERS + 1] }),
    ] {
        let resp = client
            .post(format!("{}/api/jackpots/2/lucky-numbers", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
    assert!(node.lock().unwrap().methods.is_empty());

    let resp = client
        .post(format!("{}/api/jackpots/2/lucky-numbers", base))
        .json(&json!({ "count": MAX_LUCKY_NUMBERS }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn result_page_includes_result_once_drawn() {
    let (_, _, base) = spawn_chain_app(default_node()).await;

    let drawn: ResultPage = reqwest::get(format!("{}/results/1", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let result = drawn.lottery_result.expect("drawn lottery has a result");
    assert_eq!(result.share_per_winner, "25.0");
    assert_eq!(result.winners.len(), 1);
    assert_eq!(result.winners[0].account, format!("0x{}", "a1".repeat(20)));

    let open: ResultPage = reqwest::get(format!("{}/results/2", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(open.lottery_result.is_none());
    assert_eq!(open.participant_list.len(), 2);
}

#[tokio::test]
async fn buy_ticket_pays_the_ticket_price() {
    let (node, _, base) = spawn_chain_app(default_node()).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/jackpots/2/tickets", base))
        .json(&json!({ "luckyNumberId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let tx: TransactionResponse = resp.json().await.unwrap();
    assert_eq!(tx.transaction_hash, format!("0x{:064x}", 1));

    let node = node.lock().unwrap();
    let sent = &node.sent[0];
    // 0.02 ether
    assert_eq!(sent["value"], "0x470de4df820000");
    assert_eq!(sent["from"], format!("0x{}", "0".repeat(38) + "aa"));
    let data = sent["data"].as_str().unwrap();
    assert!(data.starts_with(&format!("0x{}", hex::encode(Method::BuyTicket.selector()))));
}

#[tokio::test]
async fn create_and_import_and_draw() {
    let (node, _, base) = spawn_chain_app(default_node()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/jackpots", base))
        .json(&json!({
            "title": "New round",
            "description": "fresh",
            "image": "https://example.com/n.png",
            "prize": "100",
            "ticketPrice": 0.05,
            "expiresAt": 1_800_000_000_000u64
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/api/jackpots/2/lucky-numbers", base))
        .json(&json!({ "count": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/api/jackpots/2/draw", base))
        .json(&json!({ "numberOfWinners": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/api/jackpots/2/draw", base))
        .json(&json!({ "numberOfWinners": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let node = node.lock().unwrap();
    assert_eq!(node.sent.len(), 3);

    let import_data =
        hex::decode(node.sent[1]["data"].as_str().unwrap().trim_start_matches("0x")).unwrap();
    let tokens = ethabi::decode(
        &Method::ImportLuckyNumbers.inputs(),
        &import_data[4..],
    )
    .unwrap();
    assert_eq!(tokens[1].clone().into_array().unwrap().len(), 4);
}

#[tokio::test]
async fn reverted_draw_is_reported() {
    let mut node = default_node();
    node.revert = true;
    let (_, _, base) = spawn_chain_app(node).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/jackpots/1/draw", base))
        .json(&json!({ "numberOfWinners": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn connect_wallet_stores_account() {
    let (_, state, base) = spawn_chain_app(default_node()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/api/wallet/connect", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let expected = format!("0x{}", "0".repeat(38) + "aa");
    assert_eq!(body["address"], expected);
    assert_eq!(state.client.wallet_store().get().await, expected);
}

#[tokio::test]
async fn watcher_follows_account_and_network_changes() {
    let (node, state, _) = spawn_chain_app(default_node()).await;
    let watcher = WalletWatcher::new(state.client.clone(), Duration::from_millis(10));
    let store = state.client.wallet_store();

    let chain = watcher.tick(None).await;
    assert_eq!(chain.as_deref(), Some("0x7a69"));
    assert_eq!(store.get().await, format!("0x{}", "0".repeat(38) + "aa"));

    node.lock().unwrap().accounts = vec![format!("0x{}", "bb".repeat(20))];
    let chain = watcher.tick(chain).await;
    assert_eq!(store.get().await, format!("0x{}", "bb".repeat(20)));

    {
        let mut node = node.lock().unwrap();
        node.chain_id = "0x1".into();
        node.accounts.clear();
    }
    let chain = watcher.tick(chain).await;
    assert_eq!(chain.as_deref(), Some("0x1"));
    assert_eq!(store.get().await, "");
}
