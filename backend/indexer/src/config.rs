//! Indexer configuration, read from environment variables.
//!
//! `NETWORK` picks the default RPC endpoint; `RPC_URL` overrides it. Mainnet
//! has no default and needs `RPC_URL`.

use crate::errors::{IndexerError, Result};

/// Network the FundMe deployment lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Local quickstart node; the contract is bound to the mock price feed.
    Local,
    Testnet,
    Mainnet,
}

impl Network {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "local" | "standalone" => Ok(Self::Local),
            "testnet" => Ok(Self::Testnet),
            "mainnet" | "public" => Ok(Self::Mainnet),
            other => Err(IndexerError::Config(format!("Unknown NETWORK: {other}"))),
        }
    }

    pub fn default_rpc_url(&self) -> Option<&'static str> {
        match self {
            Self::Local => Some("http://localhost:8000/soroban/rpc"),
            Self::Testnet => Some("https://soroban-testnet.stellar.org"),
            Self::Mainnet => None,
        }
    }

    /// Development networks run against the mock feed.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Local)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    /// Soroban RPC endpoint
    pub rpc_url: String,
    /// The FundMe contract address (Strkey format)
    pub contract_id: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) to poll the RPC for new events
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = Network::from_name(&lookup("NETWORK").unwrap_or_else(|| "testnet".into()))?;

        let rpc_url = match lookup("RPC_URL") {
            Some(url) => url,
            None => network
                .default_rpc_url()
                .map(String::from)
                .ok_or_else(|| {
                    IndexerError::Config(format!("RPC_URL is required on {network:?}"))
                })?,
        };

        Ok(Config {
            network,
            rpc_url,
            contract_id: lookup("CONTRACT_ID").ok_or_else(|| {
                IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
            })?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./fund_me_events.db".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or(&lookup, "START_LEDGER", 0)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw}"))),
        None => Ok(default),
    }
}
