//! Position data source
//!
//! `PositionSource` is the seam the reconciliation store depends on; the
//! concrete `PositionService` combines the subgraph client, the price oracle
//! and a transaction tracker. Submission is simulated: a fixed latency then a
//! tracker registration, standing in for real on-chain submission/signing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::config::AppConfig;
use crate::prices::PriceClient;
use crate::subgraph::SubgraphClient;
use crate::tracker::{MockTracker, TrackerError, TransactionTracker, TxStatus};
use crate::types::Position;

/// Simulated network latency for submitting a modification
const SUBMISSION_LATENCY: Duration = Duration::from_millis(200);

/// The store's view of its collaborators: indexer fetch-all, bulk prices,
/// and the modification submit/poll pair.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// All positions for an owner, creation-descending.
    async fn fetch_positions(&self, address: &str) -> Result<Vec<Position>>;

    /// Current USD prices by token address; unknown tokens absent.
    async fn fetch_prices(&self, token_addresses: &[String]) -> Result<HashMap<String, f64>>;

    /// Submit a position modification, returning its tracking id.
    async fn submit_modification(&self) -> Result<String>;

    /// Poll a previously submitted modification.
    async fn modification_status(&self, tracking_id: &str) -> Result<TxStatus, TrackerError>;
}

/// Live data source backed by the subgraph, the price oracle and a tracker.
pub struct PositionService {
    subgraph: SubgraphClient,
    oracle: PriceClient,
    tracker: Arc<dyn TransactionTracker>,
}

impl PositionService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            subgraph: SubgraphClient::new(config.subgraph_url.clone())?,
            oracle: PriceClient::new(config.price_api_url.clone(), config.chain_slug.clone())?,
            tracker: Arc::new(MockTracker::new()),
        })
    }

    /// Substitute a different confirmation backend.
    pub fn with_tracker(mut self, tracker: Arc<dyn TransactionTracker>) -> Self {
        self.tracker = tracker;
        self
    }
}

#[async_trait]
impl PositionSource for PositionService {
    async fn fetch_positions(&self, address: &str) -> Result<Vec<Position>> {
        self.subgraph.positions_for(address).await
    }

    async fn fetch_prices(&self, token_addresses: &[String]) -> Result<HashMap<String, f64>> {
        self.oracle.current_prices(token_addresses).await
    }

    async fn submit_modification(&self) -> Result<String> {
        tokio::time::sleep(SUBMISSION_LATENCY).await;
        let tracking_id = self.tracker.submit().await;
        debug!(%tracking_id, "modification submitted");
        Ok(tracking_id)
    }

    async fn modification_status(&self, tracking_id: &str) -> Result<TxStatus, TrackerError> {
        self.tracker.poll(tracking_id).await
    }
}
