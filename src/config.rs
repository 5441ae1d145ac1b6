// Configuration loaded from the environment (and `.env`)

use anyhow::{anyhow, Context, Result};
use ethabi::Address;
use std::time::Duration;

use crate::contract::parse_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Generated fake data, no contract access
    Mock,
    /// Reads and writes against the deployed contract
    Chain,
}

impl std::str::FromStr for DataSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(DataSource::Mock),
            "chain" => Ok(DataSource::Chain),
            other => Err(anyhow!("unknown DATA_SOURCE {:?} (expected mock or chain)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_source: DataSource,
    pub rpc_url: Option<String>,
    pub wallet_url: Option<String>,
    pub contract_address: Address,
    pub receipt_poll: Duration,
    pub receipt_timeout: Duration,
    /// Zero disables the wallet watcher
    pub wallet_watch: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "4000".to_string())
            .parse::<u16>()
            .context("PORT must be a port number")?;
        let data_source: DataSource = var("DATA_SOURCE")
            .unwrap_or_else(|| "mock".to_string())
            .parse()?;

        let contract_address = match (var("CONTRACT_ADDRESS"), data_source) {
            (Some(addr), _) => parse_address(&addr)
                .map_err(|e| anyhow!("CONTRACT_ADDRESS is invalid: {}", e))?,
            (None, DataSource::Mock) => Address::zero(),
            (None, DataSource::Chain) => {
                return Err(anyhow!("CONTRACT_ADDRESS must be set for the chain data source"))
            }
        };

        let millis = |key: &str, default: u64| -> Result<u64> {
            var(key)
                .map(|v| v.parse::<u64>().with_context(|| format!("{} must be an integer", key)))
                .unwrap_or(Ok(default))
        };

        Ok(Config {
            port,
            data_source,
            rpc_url: var("RPC_URL"),
            wallet_url: var("WALLET_URL"),
            contract_address,
            receipt_poll: Duration::from_millis(millis("RECEIPT_POLL_MS", 1000)?),
            receipt_timeout: Duration::from_secs(millis("RECEIPT_TIMEOUT_SECS", 120)?),
            wallet_watch: Duration::from_secs(millis("WALLET_WATCH_SECS", 5)?),
        })
    }
}
