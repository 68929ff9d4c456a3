//! Raw subgraph response types and their mapping into the domain model
//!
//! The subgraph reports every numeric amount as a decimal string; parsing
//! into `RawAmount` happens here so the rest of the crate never sees strings.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::{Position, PositionStatus, RawAmount, SwapRecord, Token};

/// Subgraph error types
#[derive(Debug, thiserror::Error)]
pub enum SubgraphError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("subgraph error: {0}")]
    Api(String),

    #[error("unknown position status: {0}")]
    UnknownStatus(String),
}

/// GraphQL envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Payload of the positions query
#[derive(Debug, Deserialize)]
pub struct PositionsData {
    pub positions: Vec<RawPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToken {
    pub address: String,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct RawSwapInterval {
    pub interval: String,
}

/// One history entry; amount fields are only present on swap actions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHistoryEntry {
    pub created_at_timestamp: String,
    pub swapped: Option<String>,
    pub rate: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    pub id: String,
    pub user: String,
    pub from: RawToken,
    pub to: RawToken,
    pub status: String,
    pub swap_interval: RawSwapInterval,
    pub rate: String,
    pub remaining_swaps: String,
    pub remaining_liquidity: String,
    pub to_withdraw: String,
    pub total_swaps: String,
    pub created_at_timestamp: String,
    pub history: Vec<RawHistoryEntry>,
}

fn parse_amount(value: &str, field: &str) -> Result<RawAmount> {
    value
        .parse::<RawAmount>()
        .with_context(|| format!("invalid {field} amount: {value:?}"))
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        Token {
            address: raw.address,
            name: raw.name,
            symbol: raw.symbol,
            decimals: raw.decimals,
        }
    }
}

impl RawPosition {
    /// Creation timestamp, used to order the merged fetch-all result
    pub fn created_at(&self) -> i64 {
        self.created_at_timestamp.parse().unwrap_or(0)
    }

    pub fn into_position(self) -> Result<Position> {
        let status = match self.status.as_str() {
            "ACTIVE" => PositionStatus::Active,
            "COMPLETED" => PositionStatus::Completed,
            other => return Err(SubgraphError::UnknownStatus(other.to_string()).into()),
        };

        let swaps = self
            .history
            .into_iter()
            .map(|entry| {
                Ok(SwapRecord {
                    amount_bought: parse_amount(entry.swapped.as_deref().unwrap_or("0"), "swapped")?,
                    cost_paid: parse_amount(entry.rate.as_deref().unwrap_or("0"), "swap rate")?,
                    timestamp_seconds: entry
                        .created_at_timestamp
                        .parse()
                        .with_context(|| "invalid swap timestamp")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Position {
            owner: self.user,
            from: self.from.into(),
            to: self.to.into(),
            status,
            swap_interval_seconds: self
                .swap_interval
                .interval
                .parse()
                .with_context(|| "invalid swap interval")?,
            rate: parse_amount(&self.rate, "rate")?,
            remaining_liquidity: parse_amount(&self.remaining_liquidity, "remainingLiquidity")?,
            to_withdraw: parse_amount(&self.to_withdraw, "toWithdraw")?,
            remaining_swaps: self
                .remaining_swaps
                .parse()
                .with_context(|| "invalid remainingSwaps")?,
            total_swaps: self
                .total_swaps
                .parse()
                .with_context(|| "invalid totalSwaps")?,
            id: self.id,
            swaps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_position_json() -> serde_json::Value {
        serde_json::json!({
            "id": "pos-1",
            "user": "0xowner",
            "from": {"address": "0xa", "decimals": 6, "name": "USD Coin", "symbol": "USDC"},
            "to": {"address": "0xb", "decimals": 18, "name": "Wrapped Ether", "symbol": "WETH"},
            "status": "ACTIVE",
            "swapInterval": {"interval": "86400"},
            "rate": "2500000",
            "remainingSwaps": "7",
            "remainingLiquidity": "17500000",
            "toWithdraw": "0",
            "totalSwaps": "30",
            "createdAtTimestamp": "1700000000",
            "history": [
                {"createdAtTimestamp": "1700086400", "swapped": "1000000000000000", "rate": "2500000"},
                {"createdAtTimestamp": "1700000000", "swapped": "990000000000000", "rate": "2500000"}
            ]
        })
    }

    #[test]
    fn test_maps_raw_position() {
        let raw: RawPosition = serde_json::from_value(raw_position_json()).expect("deserialize");
        assert_eq!(raw.created_at(), 1_700_000_000);

        let position = raw.into_position().expect("map");
        assert_eq!(position.id, "pos-1");
        assert_eq!(position.status, PositionStatus::Active);
        assert_eq!(position.swap_interval_seconds, 86_400);
        assert_eq!(position.rate, 2_500_000);
        assert_eq!(position.remaining_liquidity, 17_500_000);
        assert_eq!(position.remaining_swaps, 7);
        assert_eq!(position.swaps.len(), 2);
        assert_eq!(position.swaps[0].amount_bought, 1_000_000_000_000_000);
        assert_eq!(position.swaps[0].cost_paid, 2_500_000);
        assert_eq!(position.swaps[1].timestamp_seconds, 1_700_000_000);
    }

    #[test]
    fn test_rejects_unknown_status() {
        let mut value = raw_position_json();
        value["status"] = serde_json::json!("TERMINATED");
        let raw: RawPosition = serde_json::from_value(value).expect("deserialize");
        assert!(raw.into_position().is_err());
    }

    #[test]
    fn test_rejects_malformed_amount() {
        let mut value = raw_position_json();
        value["rate"] = serde_json::json!("not-a-number");
        let raw: RawPosition = serde_json::from_value(value).expect("deserialize");
        assert!(raw.into_position().is_err());
    }
}
