//! Indexer (subgraph) query client
//!
//! Fetches every position owned by an address via cursor pagination: pages by
//! last-seen id until a page comes back shorter than the page size. The query
//! itself orders by id ascending (the cursor field must be monotonic); the
//! merged result is re-ordered by creation time descending before mapping.

pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::types::Position;
use types::{GraphqlResponse, PositionsData, RawPosition, SubgraphError};

/// Statuses other than ACTIVE/COMPLETED are filtered server-side; swap
/// history is capped at the 1000 most recent records, descending.
const POSITIONS_QUERY: &str = r#"
query getCurrentPositions($address: String!, $first: Int, $lastId: String) {
  positions(
    orderBy: id
    orderDirection: asc
    where: { id_gt: $lastId, user: $address, status_in: [ACTIVE, COMPLETED] }
    first: $first
  ) {
    id
    totalSwaps
    user
    createdAtTimestamp
    from {
      address: id
      decimals
      name
      symbol
    }
    to {
      address: id
      decimals
      name
      symbol
    }
    status
    swapInterval {
      interval
    }
    rate
    remainingSwaps
    remainingLiquidity
    toWithdraw
    history(
      orderBy: createdAtBlock
      orderDirection: desc
      first: 1000
      where: { action: SWAPPED }
    ) {
      createdAtTimestamp
      ... on SwappedAction {
        swapped
        rate
      }
    }
  }
}
"#;

const DEFAULT_PAGE_SIZE: usize = 100;

// Safety limit to prevent infinite pagination
const MAX_PAGES: usize = 50;

/// Subgraph query client
pub struct SubgraphClient {
    client: Client,
    url: String,
    page_size: usize,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch all positions for an owner address, creation-descending.
    pub async fn positions_for(&self, address: &str) -> Result<Vec<Position>> {
        let mut raw_positions: Vec<RawPosition> = Vec::new();
        let mut last_id = String::new();
        let mut pages = 0;

        loop {
            let page = self.query_page(address, &last_id).await?;
            let page_len = page.len();
            debug!(page_len, last_id = %last_id, "fetched subgraph page");

            if let Some(last) = page.last() {
                last_id = last.id.clone();
            }
            raw_positions.extend(page);
            pages += 1;

            if page_len < self.page_size {
                break;
            }
            if pages >= MAX_PAGES {
                warn!(%address, pages, "stopping pagination at the page limit");
                break;
            }
        }

        raw_positions.sort_by_key(|raw| std::cmp::Reverse(raw.created_at()));

        raw_positions
            .into_iter()
            .map(RawPosition::into_position)
            .collect()
    }

    /// Fetch a single page after the given id cursor.
    async fn query_page(&self, address: &str, last_id: &str) -> Result<Vec<RawPosition>> {
        let body = serde_json::json!({
            "query": POSITIONS_QUERY,
            "variables": {
                "address": address,
                "first": self.page_size,
                "lastId": last_id,
            },
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("Failed to send positions query")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SubgraphError::Api(format!("HTTP {}: {}", status, text)).into());
        }

        let envelope: GraphqlResponse<PositionsData> = response
            .json()
            .await
            .context("Failed to parse positions response")?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(SubgraphError::Api(messages.join("; ")).into());
        }

        let data = envelope
            .data
            .ok_or_else(|| SubgraphError::Api("response missing data".to_string()))?;

        Ok(data.positions)
    }
}
