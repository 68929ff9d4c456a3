//! Core domain types for DCA positions
//!
//! These are the internal, already-parsed representations. Raw subgraph
//! response shapes live in `subgraph::types` and are mapped into these
//! structs at the client boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw on-chain integer amount, scaled by a token's decimal count.
///
/// ERC-20 amounts at up to 18 decimals fit comfortably in an i128; display
/// conversion goes through string manipulation (see `decimal::to_decimal`)
/// rather than float math on the raw value.
pub type RawAmount = i128;

/// An ERC-20 token as reported by the subgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// On-chain address, unique id
    pub address: String,

    pub name: String,

    pub symbol: String,

    /// Decimal places the raw amounts are scaled by
    pub decimals: u32,
}

/// One historical execution of a position's swap schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Amount of `to`-token received, scaled by `to.decimals`
    pub amount_bought: RawAmount,

    /// Amount of `from`-token spent, scaled by `from.decimals`
    pub cost_paid: RawAmount,

    /// Execution time, unix seconds
    pub timestamp_seconds: i64,
}

impl SwapRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp_seconds, 0).unwrap_or_default()
    }
}

/// Lifecycle status of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    /// Still scheduled for future swaps
    Active,
    /// Terminal; closed positions never reactivate
    Completed,
}

/// A recurring scheduled swap commitment between two tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Stable id assigned by the indexer
    pub id: String,

    /// Owner address
    pub owner: String,

    /// Token being sold each swap
    pub from: Token,

    /// Token being bought each swap
    pub to: Token,

    pub status: PositionStatus,

    /// Cadence between scheduled swaps, in seconds (>= 1)
    pub swap_interval_seconds: i64,

    /// `from`-token committed per swap, scaled by `from.decimals`
    pub rate: RawAmount,

    /// Unspent `from`-token balance, scaled by `from.decimals`
    pub remaining_liquidity: RawAmount,

    /// Unclaimed `to`-token balance, scaled by `to.decimals`
    pub to_withdraw: RawAmount,

    /// Scheduled executions left
    pub remaining_swaps: u64,

    /// Scheduled executions since creation
    pub total_swaps: u64,

    /// Execution history, descending by recency (index 0 = most recent).
    /// Immutable client-side; the set only grows server-side between fetches.
    pub swaps: Vec<SwapRecord>,
}

impl Position {
    /// Most recent swap, if any
    pub fn latest_swap(&self) -> Option<&SwapRecord> {
        self.swaps.first()
    }

    /// Oldest swap, if any
    pub fn oldest_swap(&self) -> Option<&SwapRecord> {
        self.swaps.last()
    }
}

/// Current USD price info for a token, keyed by token address in the store.
/// Refreshed wholesale on every address change, never incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPriceInfo {
    pub price_usd: f64,
    pub symbol: String,
}

/// A display amount paired with the symbol it is denominated in
#[derive(Debug, Clone, PartialEq)]
pub struct AmountWithSymbol {
    pub amount: f64,
    pub symbol: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn token(address: &str, symbol: &str, decimals: u32) -> Token {
        Token {
            address: address.to_string(),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }

    /// A position with no swap history and round numbers, for store tests
    pub fn position(id: &str) -> Position {
        Position {
            id: id.to_string(),
            owner: "0xowner".to_string(),
            from: token("0xfrom", "USDC", 2),
            to: token("0xto", "WETH", 18),
            status: PositionStatus::Active,
            swap_interval_seconds: 3600,
            rate: 100,
            remaining_liquidity: 1000,
            to_withdraw: 42,
            remaining_swaps: 10,
            total_swaps: 20,
            swaps: Vec::new(),
        }
    }
}
