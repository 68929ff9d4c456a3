//! Derived financial insights for a position
//!
//! Pure functions over a position's immutable swap history plus its live
//! counters. Nothing here is persisted; callers recompute on demand from the
//! store's merged view.

use chrono::{DateTime, Duration, Utc};

use crate::decimal::to_decimal;
use crate::types::{AmountWithSymbol, Position, PositionStatus};

/// Summary figures and schedule dates for a position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionInsights {
    /// Total ever committed: still-unswapped liquidity plus historical costs
    pub allocation: AmountWithSymbol,

    /// Unspent `from`-token balance
    pub remaining_liquidity: AmountWithSymbol,

    /// Sum of all historical buys, in `to`-token
    pub swapped: AmountWithSymbol,

    /// Unclaimed `to`-token balance
    pub to_withdraw: AmountWithSymbol,

    /// `from`-token committed per swap
    pub rate: AmountWithSymbol,

    /// Timestamp of the oldest swap; absent with no history
    pub starting_date: Option<DateTime<Utc>>,

    /// One interval past the most recent swap; only for active positions
    pub next_swap_date: Option<DateTime<Utc>>,

    /// Most recent swap plus the remaining schedule; absent with no history
    pub ending_date: Option<DateTime<Utc>>,
}

/// Compute the insight summary for a position.
pub fn position_insights(position: &Position) -> PositionInsights {
    let from_decimals = position.from.decimals;
    let to_decimals = position.to.decimals;

    let remaining_liquidity = AmountWithSymbol {
        amount: to_decimal(position.remaining_liquidity, from_decimals),
        symbol: position.from.symbol.clone(),
    };

    let to_withdraw = AmountWithSymbol {
        amount: to_decimal(position.to_withdraw, to_decimals),
        symbol: position.to.symbol.clone(),
    };

    let swapped = AmountWithSymbol {
        amount: position
            .swaps
            .iter()
            .map(|swap| to_decimal(swap.amount_bought, to_decimals))
            .sum(),
        symbol: position.to.symbol.clone(),
    };

    let historical_cost: f64 = position
        .swaps
        .iter()
        .map(|swap| to_decimal(swap.cost_paid, from_decimals))
        .sum();

    let allocation = AmountWithSymbol {
        amount: remaining_liquidity.amount + historical_cost,
        symbol: position.from.symbol.clone(),
    };

    let rate = AmountWithSymbol {
        amount: to_decimal(position.rate, from_decimals),
        symbol: position.from.symbol.clone(),
    };

    let interval_secs = position.swap_interval_seconds;

    let starting_date = position.oldest_swap().map(|swap| swap.timestamp());

    let next_swap_date = match position.status {
        PositionStatus::Active => position
            .latest_swap()
            .and_then(|swap| swap.timestamp().checked_add_signed(schedule_offset(interval_secs, 1))),
        PositionStatus::Completed => None,
    };

    let ending_date = position.latest_swap().and_then(|swap| {
        swap.timestamp()
            .checked_add_signed(schedule_offset(interval_secs, position.remaining_swaps))
    });

    PositionInsights {
        allocation,
        remaining_liquidity,
        swapped,
        to_withdraw,
        rate,
        starting_date,
        next_swap_date,
        ending_date,
    }
}

/// One marker in the liquidity-usage projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPoint {
    pub timestamp: DateTime<Utc>,

    /// `to`-token bought at this marker; zero for synthetic markers
    pub bought: f64,

    /// `from`-token committed at this marker; zero for pre/post markers
    pub committed: f64,

    /// Running cumulative committed total
    pub total_committed: f64,

    /// Running cumulative bought total. Synthetic markers contribute nothing,
    /// so the series freezes once the schedule passes its last real swap.
    pub total_bought: f64,
}

/// Duration covering `steps` swap intervals. Computed in i64 seconds and
/// saturated, so an absurdly long schedule never wraps the projected dates.
fn schedule_offset(interval_secs: i64, steps: u64) -> Duration {
    let steps = i64::try_from(steps).unwrap_or(i64::MAX);
    Duration::try_seconds(interval_secs.saturating_mul(steps)).unwrap_or(Duration::MAX)
}

/// Number of synthetic markers padded before the first and after the last
/// scheduled swap, so plots have flat lead-in/lead-out segments.
const PROJECTION_PADDING: u64 = 2;

/// Build the chronological liquidity-usage projection for a position.
///
/// Combines the padding markers, all real swaps re-ordered ascending, and one
/// synthetic marker per not-yet-executed swap at the position's current rate.
/// Empty when the position has no swap history.
pub fn projection(position: &Position) -> Vec<ProjectionPoint> {
    let (Some(oldest), Some(latest)) = (position.oldest_swap(), position.latest_swap()) else {
        return Vec::new();
    };

    let from_decimals = position.from.decimals;
    let to_decimals = position.to.decimals;
    let interval_secs = position.swap_interval_seconds;

    struct RawMarker {
        timestamp: DateTime<Utc>,
        bought: crate::types::RawAmount,
        committed: crate::types::RawAmount,
    }

    let mut markers = Vec::with_capacity(
        position.swaps.len() + position.remaining_swaps as usize + 2 * PROJECTION_PADDING as usize,
    );

    for offset in (1..=PROJECTION_PADDING).rev() {
        markers.push(RawMarker {
            timestamp: oldest.timestamp() - schedule_offset(interval_secs, offset),
            bought: 0,
            committed: 0,
        });
    }

    for swap in position.swaps.iter().rev() {
        markers.push(RawMarker {
            timestamp: swap.timestamp(),
            bought: swap.amount_bought,
            committed: swap.cost_paid,
        });
    }

    for offset in 1..=position.remaining_swaps {
        markers.push(RawMarker {
            timestamp: latest.timestamp() + schedule_offset(interval_secs, offset),
            bought: 0,
            committed: position.rate,
        });
    }

    for offset in 1..=PROJECTION_PADDING {
        markers.push(RawMarker {
            timestamp: latest.timestamp()
                + schedule_offset(interval_secs, position.remaining_swaps.saturating_add(offset)),
            bought: 0,
            committed: 0,
        });
    }

    let mut total_committed = 0.0;
    let mut total_bought = 0.0;
    markers
        .into_iter()
        .map(|marker| {
            let bought = to_decimal(marker.bought, to_decimals);
            let committed = to_decimal(marker.committed, from_decimals);
            total_committed += committed;
            total_bought += bought;
            ProjectionPoint {
                timestamp: marker.timestamp,
                bought,
                committed,
                total_committed,
                total_bought,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;
    use crate::types::SwapRecord;

    fn position_with_swaps() -> Position {
        let mut position = fixtures::position("pos-1");
        // Descending by recency: index 0 is the most recent
        position.swaps = vec![
            SwapRecord {
                amount_bought: 2_000,
                cost_paid: 100,
                timestamp_seconds: 7_200,
            },
            SwapRecord {
                amount_bought: 1_000,
                cost_paid: 100,
                timestamp_seconds: 3_600,
            },
        ];
        position
    }

    #[test]
    fn test_no_swaps_has_no_dates() {
        let insights = position_insights(&fixtures::position("pos-1"));
        assert!(insights.starting_date.is_none());
        assert!(insights.next_swap_date.is_none());
        assert!(insights.ending_date.is_none());
    }

    #[test]
    fn test_schedule_dates_from_history() {
        let position = position_with_swaps();
        let insights = position_insights(&position);

        let starting = insights.starting_date.expect("starting date");
        assert_eq!(starting.timestamp(), 3_600);

        // Most recent swap + one interval
        let next = insights.next_swap_date.expect("next swap date");
        assert_eq!(next.timestamp(), 7_200 + 3_600);

        // Most recent swap + remaining schedule
        let ending = insights.ending_date.expect("ending date");
        assert_eq!(ending.timestamp(), 7_200 + 10 * 3_600);
    }

    #[test]
    fn test_schedule_dates_survive_large_swap_counts() {
        // A remaining-swaps count past i32::MAX must extend the schedule,
        // not wrap it backwards
        let mut position = position_with_swaps();
        position.swap_interval_seconds = 1;
        position.remaining_swaps = 5_000_000_000;
        let insights = position_insights(&position);

        let ending = insights.ending_date.expect("ending date");
        assert_eq!(ending.timestamp(), 7_200 + 5_000_000_000);

        let next = insights.next_swap_date.expect("next swap date");
        assert_eq!(next.timestamp(), 7_200 + 1);
    }

    #[test]
    fn test_completed_position_has_no_next_swap() {
        let mut position = position_with_swaps();
        position.status = PositionStatus::Completed;
        let insights = position_insights(&position);
        assert!(insights.next_swap_date.is_none());
        // Other dates still derive from history
        assert!(insights.starting_date.is_some());
        assert!(insights.ending_date.is_some());
    }

    #[test]
    fn test_allocation_is_liquidity_plus_costs() {
        let position = position_with_swaps();
        let insights = position_insights(&position);

        // from.decimals = 2: liquidity 1000 -> 10.00, costs 100+100 -> 2.00
        assert_eq!(insights.remaining_liquidity.amount, 10.0);
        assert_eq!(insights.allocation.amount, 12.0);
        assert_eq!(insights.allocation.symbol, "USDC");
    }

    #[test]
    fn test_swapped_sums_buys_in_to_token() {
        let mut position = position_with_swaps();
        position.to.decimals = 3;
        let insights = position_insights(&position);
        assert_eq!(insights.swapped.amount, 3.0);
        assert_eq!(insights.swapped.symbol, "WETH");
    }

    #[test]
    fn test_projection_empty_without_history() {
        assert!(projection(&fixtures::position("pos-1")).is_empty());
    }

    #[test]
    fn test_projection_shape_and_ordering() {
        let position = position_with_swaps();
        let points = projection(&position);

        // 2 pre + 2 real + 10 remaining + 2 post
        assert_eq!(points.len(), 16);
        assert!(points
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));

        // Lead-in markers sit one and two intervals before the first swap
        assert_eq!(points[0].timestamp.timestamp(), 3_600 - 2 * 3_600);
        assert_eq!(points[1].timestamp.timestamp(), 3_600 - 3_600);
    }

    #[test]
    fn test_projection_running_totals() {
        let mut position = position_with_swaps();
        position.to.decimals = 3;
        let points = projection(&position);

        // Committed: 2 real swaps at 1.00 then 10 scheduled at rate 1.00
        assert_eq!(points[3].total_committed, 2.0);
        let last = points.last().expect("non-empty");
        assert_eq!(last.total_committed, 12.0);

        // Bought freezes after the last real swap; synthetic markers add 0
        assert_eq!(points[3].total_bought, 3.0);
        assert_eq!(last.total_bought, 3.0);
    }
}
