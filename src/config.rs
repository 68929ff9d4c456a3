//! Application configuration
//!
//! Defaults point at the Mean Finance DCA v2 subgraph on Polygon and the
//! DefiLlama coins API; every endpoint can be overridden through the
//! environment (loaded from `.env` by `main` before parsing).

use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/mean-finance/dca-v2-yf-polygon";
const DEFAULT_PRICE_API_URL: &str = "https://coins.llama.fi";
const DEFAULT_CHAIN_SLUG: &str = "polygon";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// GraphQL endpoint of the positions subgraph
    pub subgraph_url: String,

    /// Base URL of the price oracle
    pub price_api_url: String,

    /// Chain prefix used in oracle keys (`polygon` in `polygon:0xabc`)
    pub chain_slug: String,

    /// Cadence of the store's reconciliation loop
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            chain_slug: DEFAULT_CHAIN_SLUG.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    /// Build the config from defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("DCADASH_SUBGRAPH_URL") {
            config.subgraph_url = value;
        }
        if let Ok(value) = std::env::var("DCADASH_PRICE_API_URL") {
            config.price_api_url = value.trim_end_matches('/').to_string();
        }
        if let Ok(value) = std::env::var("DCADASH_CHAIN") {
            config.chain_slug = value;
        }
        if let Ok(value) = std::env::var("DCADASH_POLL_INTERVAL_SECS") {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("invalid DCADASH_POLL_INTERVAL_SECS: {value:?}"))?;
            config.poll_interval = Duration::from_secs(secs.max(1));
        }

        Url::parse(&config.subgraph_url).context("invalid subgraph URL")?;
        Url::parse(&config.price_api_url).context("invalid price API URL")?;

        Ok(config)
    }
}
