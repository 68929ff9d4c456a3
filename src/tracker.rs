//! Transaction status tracking
//!
//! Models the eventual outcome of a submitted position modification as a
//! three-state machine: `Pending` resolves once into `Success` or `Failure`
//! and stays there. The store only depends on the `TransactionTracker` trait,
//! so the mock below can be swapped for a real chain-confirmation backend
//! without touching the reconciliation logic.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

/// Status of a submitted modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Submitted, outcome not yet known
    Pending,
    /// Terminal: the modification was confirmed
    Success,
    /// Terminal: the modification was dropped or reverted
    Failure,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Unknown or expired tracking id. The store treats this the same as
    /// `Failure`: drop the optimistic overlay, keep the confirmed position.
    #[error("transaction not found: {0}")]
    NotFound(String),
}

/// Contract for a transaction-confirmation backend.
///
/// Production implementations must keep terminal statuses stable and
/// queryable by id, and report `NotFound` for unknown or expired ids.
#[async_trait]
pub trait TransactionTracker: Send + Sync {
    /// Register a freshly submitted modification and return its tracking id.
    /// Returns as soon as the submission is accepted; callers must not assume
    /// completion.
    async fn submit(&self) -> String;

    /// Report the current status for a tracking id.
    async fn poll(&self, tracking_id: &str) -> Result<TxStatus, TrackerError>;
}

/// In-memory stand-in for a real confirmation service.
///
/// A pending entry resolves to a random terminal status on poll, modelling
/// real-world confirmation races. Once terminal, later polls return the same
/// status.
#[derive(Debug, Default)]
pub struct MockTracker {
    transactions: DashMap<String, TxStatus>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionTracker for MockTracker {
    async fn submit(&self) -> String {
        let tracking_id = Uuid::new_v4().to_string();
        self.transactions
            .insert(tracking_id.clone(), TxStatus::Pending);
        tracking_id
    }

    async fn poll(&self, tracking_id: &str) -> Result<TxStatus, TrackerError> {
        let mut entry = self
            .transactions
            .get_mut(tracking_id)
            .ok_or_else(|| TrackerError::NotFound(tracking_id.to_string()))?;

        if *entry == TxStatus::Pending {
            *entry = match rand::rng().random_range(0..3) {
                0 => TxStatus::Pending,
                1 => TxStatus::Success,
                _ => TxStatus::Failure,
            };
        }

        Ok(*entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let tracker = MockTracker::new();
        let result = tracker.poll("no-such-id").await;
        assert!(matches!(result, Err(TrackerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submitted_ids_are_unique_and_tracked() {
        let tracker = MockTracker::new();
        let first = tracker.submit().await;
        let second = tracker.submit().await;
        assert_ne!(first, second);
        assert!(tracker.poll(&first).await.is_ok());
        assert!(tracker.poll(&second).await.is_ok());
    }

    #[tokio::test]
    async fn test_terminal_status_is_stable() {
        let tracker = MockTracker::new();
        let id = tracker.submit().await;

        // Poll until the nondeterministic resolution lands on a terminal
        // status, then verify it never changes again.
        let mut status = tracker.poll(&id).await.expect("tracked id");
        while !status.is_terminal() {
            status = tracker.poll(&id).await.expect("tracked id");
        }
        for _ in 0..10 {
            assert_eq!(tracker.poll(&id).await.expect("tracked id"), status);
        }
    }
}
