//! Price oracle client
//!
//! Bulk USD price lookup against a DefiLlama-style coins API. Tokens the
//! oracle does not know are silently omitted from the result; callers must
//! treat absence as "unknown", never as zero. A partial miss never fails the
//! batch.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PricesResponse {
    coins: HashMap<String, CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    price: f64,
}

/// Price oracle client
pub struct PriceClient {
    client: Client,
    base_url: String,
    /// Chain prefix for oracle keys, e.g. `polygon` in `polygon:0xabc`
    chain_slug: String,
}

impl PriceClient {
    pub fn new(base_url: impl Into<String>, chain_slug: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            chain_slug: chain_slug.into(),
        })
    }

    /// Fetch current USD prices for a set of token addresses.
    ///
    /// The result maps token address to price; addresses without a known
    /// price are absent.
    pub async fn current_prices(&self, token_addresses: &[String]) -> Result<HashMap<String, f64>> {
        if token_addresses.is_empty() {
            return Ok(HashMap::new());
        }

        let coins = token_addresses
            .iter()
            .map(|address| format!("{}:{}", self.chain_slug, address))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/prices/current/{}", self.base_url, coins);

        debug!(%url, "fetching token prices");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send price request")?
            .error_for_status()
            .context("Price oracle returned an error status")?;

        let parsed: PricesResponse = response
            .json()
            .await
            .context("Failed to parse price response")?;

        let prices = token_addresses
            .iter()
            .filter_map(|address| {
                let key = format!("{}:{}", self.chain_slug, address);
                parsed
                    .coins
                    .get(&key)
                    .map(|coin| (address.clone(), coin.price))
            })
            .collect();

        Ok(prices)
    }
}
