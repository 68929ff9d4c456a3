//! Position reconciliation store
//!
//! Central orchestrator: holds confirmed positions fetched from the data
//! source, overlays optimistic state for mutations whose outcome is still
//! unknown, and resolves the overlay against the tracker on a fixed interval.
//!
//! Pending state is kept as a tagged per-position entry
//! (`Confirmed` / `Pending { confirmed, optimistic, tracking_id }`), so "at
//! most one pending change per position" holds structurally; a new mutation
//! on a position that already has a pending change overwrites it,
//! last-writer-wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::decimal::to_raw;
use crate::service::PositionSource;
use crate::tracker::{TrackerError, TxStatus};
use crate::types::{Position, PositionStatus, TokenPriceInfo};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Mutation referenced a position the store does not know
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// addFunds on a position with nothing left to schedule; accepting it
    /// would divide by zero when recomputing the rate
    #[error("position {0} has no remaining swaps")]
    NoRemainingSwaps(String),

    /// addFunds amount that cannot be represented as a raw amount
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Failure from the data source (indexer, oracle or submission)
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Notification surfaced when a pending modification reaches a terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ModificationConfirmed { position_id: String },
    ModificationFailed { position_id: String },
}

/// Per-position reconciliation state
enum TrackedPosition {
    /// Only the indexer-confirmed state exists
    Confirmed(Position),
    /// A locally-issued mutation is awaiting confirmation; `optimistic`
    /// shadows `confirmed` in every read until the tracker resolves
    Pending {
        confirmed: Position,
        optimistic: Position,
        tracking_id: String,
    },
}

impl TrackedPosition {
    fn id(&self) -> &str {
        &self.confirmed_ref().id
    }

    fn confirmed_ref(&self) -> &Position {
        match self {
            TrackedPosition::Confirmed(position) => position,
            TrackedPosition::Pending { confirmed, .. } => confirmed,
        }
    }

    fn visible(&self) -> &Position {
        match self {
            TrackedPosition::Confirmed(position) => position,
            TrackedPosition::Pending { optimistic, .. } => optimistic,
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, TrackedPosition::Pending { .. })
    }

    /// Drop any overlay, keeping the confirmed state
    fn into_confirmed(self) -> Self {
        match self {
            TrackedPosition::Pending { confirmed, .. } => TrackedPosition::Confirmed(confirmed),
            confirmed => confirmed,
        }
    }
}

struct StoreState {
    entries: Vec<TrackedPosition>,
    token_info: HashMap<String, TokenPriceInfo>,
    loading: bool,
    address: Option<String>,
}

/// Reconciliation store over a pluggable data source.
///
/// All state lives behind a single RwLock; reconcile ticks compute their
/// poll results from one snapshot and apply them under one write lock, so a
/// tick never interleaves with a mutation's optimistic registration.
pub struct PositionStore<S> {
    source: Arc<S>,
    state: RwLock<StoreState>,
    /// Bumped by every `set_active_address`; in-flight reloads compare their
    /// epoch before writing so a slow older fetch never clobbers newer state
    epoch: AtomicU64,
    events: broadcast::Sender<StoreEvent>,
}

impl<S: PositionSource + 'static> PositionStore<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            source,
            state: RwLock::new(StoreState {
                entries: Vec::new(),
                token_info: HashMap::new(),
                loading: false,
                address: None,
            }),
            epoch: AtomicU64::new(0),
            events,
        }
    }

    /// Positions for display: optimistic state shadows confirmed state.
    pub async fn visible_positions(&self) -> Vec<Position> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .map(|entry| entry.visible().clone())
            .collect()
    }

    /// Current USD price info by token address. Absent tokens are unknown,
    /// not zero.
    pub async fn token_info(&self) -> HashMap<String, TokenPriceInfo> {
        self.state.read().await.token_info.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn has_pending_change(&self, position_id: &str) -> bool {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .any(|entry| entry.id() == position_id && entry.is_pending())
    }

    /// Subscribe to terminal-status notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Switch the active address and reload positions and prices.
    ///
    /// Pending overlays are cleared immediately; position ids are globally
    /// unique, so overlays from the previous address could never resolve
    /// against the new one anyway. A reload that loses the race to a newer
    /// `set_active_address` call discards its results.
    pub async fn set_active_address(&self, address: &str) -> Result<(), StoreError> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.address = Some(address.to_string());
            state.entries = std::mem::take(&mut state.entries)
                .into_iter()
                .map(TrackedPosition::into_confirmed)
                .collect();
        }

        let result = self.reload(address, epoch).await;

        // Loading clears on the error path too, unless a newer call owns it
        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) == epoch {
            state.loading = false;
        }
        result
    }

    async fn reload(&self, address: &str, epoch: u64) -> Result<(), StoreError> {
        let positions = self.source.fetch_positions(address).await?;

        let mut token_addresses: Vec<String> = Vec::new();
        for position in &positions {
            for token in [&position.from, &position.to] {
                if !token_addresses.contains(&token.address) {
                    token_addresses.push(token.address.clone());
                }
            }
        }

        let prices = self.source.fetch_prices(&token_addresses).await?;

        let mut token_info = HashMap::new();
        for position in &positions {
            for token in [&position.from, &position.to] {
                if let Some(price) = prices.get(&token.address) {
                    token_info.insert(
                        token.address.clone(),
                        TokenPriceInfo {
                            price_usd: *price,
                            symbol: token.symbol.clone(),
                        },
                    );
                }
            }
        }

        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(%address, "discarding stale reload");
            return Ok(());
        }

        info!(
            %address,
            positions = positions.len(),
            priced_tokens = token_info.len(),
            "loaded positions"
        );
        state.entries = positions.into_iter().map(TrackedPosition::Confirmed).collect();
        state.token_info = token_info;
        Ok(())
    }

    /// Claim all swapped-but-unwithdrawn funds. Optimistically zeroes
    /// `to_withdraw`. Returns the tracking id of the submission.
    pub async fn withdraw(&self, position_id: &str) -> Result<String, StoreError> {
        let mut optimistic = self.confirmed_position(position_id).await?;
        optimistic.to_withdraw = 0;
        self.register_pending(position_id, optimistic).await
    }

    /// Terminate the position. Optimistically zeroes every live counter and
    /// marks it completed.
    pub async fn close(&self, position_id: &str) -> Result<String, StoreError> {
        let mut optimistic = self.confirmed_position(position_id).await?;
        optimistic.rate = 0;
        optimistic.remaining_liquidity = 0;
        optimistic.to_withdraw = 0;
        optimistic.remaining_swaps = 0;
        optimistic.status = PositionStatus::Completed;
        self.register_pending(position_id, optimistic).await
    }

    /// Top up the position's liquidity, spreading it over the remaining
    /// schedule. The recomputed rate keeps `remaining_liquidity =
    /// rate * remaining_swaps`.
    pub async fn add_funds(
        &self,
        position_id: &str,
        amount: Decimal,
    ) -> Result<String, StoreError> {
        let mut optimistic = self.confirmed_position(position_id).await?;
        if optimistic.remaining_swaps == 0 {
            return Err(StoreError::NoRemainingSwaps(position_id.to_string()));
        }

        let raw_amount = to_raw(amount, optimistic.from.decimals)
            .ok_or(StoreError::InvalidAmount(amount))?;
        optimistic.remaining_liquidity += raw_amount;
        optimistic.rate = optimistic.remaining_liquidity / optimistic.remaining_swaps as i128;
        self.register_pending(position_id, optimistic).await
    }

    async fn confirmed_position(&self, position_id: &str) -> Result<Position, StoreError> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .find(|entry| entry.id() == position_id)
            .map(|entry| entry.confirmed_ref().clone())
            .ok_or_else(|| StoreError::InvalidPosition(position_id.to_string()))
    }

    /// Submit the modification, then install the optimistic overlay. The
    /// overlay is visible to readers as soon as this returns.
    async fn register_pending(
        &self,
        position_id: &str,
        optimistic: Position,
    ) -> Result<String, StoreError> {
        let tracking_id = self.source.submit_modification().await?;

        let mut state = self.state.write().await;
        let entry = state
            .entries
            .iter_mut()
            .find(|entry| entry.id() == position_id)
            // The position can vanish mid-submit if the address changed
            .ok_or_else(|| StoreError::InvalidPosition(position_id.to_string()))?;

        debug!(%position_id, %tracking_id, "registered pending change");
        *entry = TrackedPosition::Pending {
            confirmed: entry.confirmed_ref().clone(),
            optimistic,
            tracking_id: tracking_id.clone(),
        };
        Ok(tracking_id)
    }

    /// One reconciliation tick: poll every pending entry concurrently, then
    /// apply all outcomes under a single write lock.
    ///
    /// Success promotes the optimistic state to confirmed; failure (and
    /// `NotFound`, the tracker-side-expiry case) drops the overlay and the
    /// confirmed position stands. A poll error for one entry never affects
    /// the rest of the batch.
    pub async fn reconcile_once(&self) {
        let pending: Vec<(String, String)> = {
            let state = self.state.read().await;
            state
                .entries
                .iter()
                .filter_map(|entry| match entry {
                    TrackedPosition::Pending { tracking_id, .. } => {
                        Some((entry.id().to_string(), tracking_id.clone()))
                    }
                    TrackedPosition::Confirmed(_) => None,
                })
                .collect()
        };

        if pending.is_empty() {
            return;
        }

        let polls = join_all(
            pending
                .iter()
                .map(|(_, tracking_id)| self.source.modification_status(tracking_id)),
        )
        .await;

        let mut state = self.state.write().await;
        for ((position_id, tracking_id), status) in pending.into_iter().zip(polls) {
            let Some(entry) = state
                .entries
                .iter_mut()
                .find(|entry| entry.id() == position_id)
            else {
                continue;
            };
            let (confirmed, optimistic) = match &*entry {
                TrackedPosition::Pending {
                    confirmed,
                    optimistic,
                    tracking_id: current,
                    // A newer mutation overwrote this entry after the
                    // snapshot; its outcome belongs to the next tick
                } if *current == tracking_id => (confirmed.clone(), optimistic.clone()),
                _ => continue,
            };

            match status {
                Ok(TxStatus::Pending) => {}
                Ok(TxStatus::Success) => {
                    info!(%position_id, %tracking_id, "modification confirmed");
                    *entry = TrackedPosition::Confirmed(optimistic);
                    let _ = self.events.send(StoreEvent::ModificationConfirmed {
                        position_id: position_id.clone(),
                    });
                }
                Ok(TxStatus::Failure) => {
                    warn!(%position_id, %tracking_id, "modification failed");
                    *entry = TrackedPosition::Confirmed(confirmed);
                    let _ = self.events.send(StoreEvent::ModificationFailed {
                        position_id: position_id.clone(),
                    });
                }
                Err(TrackerError::NotFound(_)) => {
                    warn!(%position_id, %tracking_id, "tracking id expired, dropping overlay");
                    *entry = TrackedPosition::Confirmed(confirmed);
                    let _ = self.events.send(StoreEvent::ModificationFailed {
                        position_id: position_id.clone(),
                    });
                }
            }
        }
    }

    /// Spawn the periodic reconciliation loop. The loop runs until the
    /// returned handle is stopped or dropped.
    pub fn spawn_reconciler(self: &Arc<Self>, poll_interval: Duration) -> ReconcilerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => store.reconcile_once().await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("reconciliation loop stopped");
        });

        ReconcilerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Cancellation handle for the reconciliation loop. Dropping the handle also
/// stops the loop (the watch sender closes).
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
