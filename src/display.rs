//! Console rendering for positions and projections
//!
//! Presentation glue for the CLI; the core read model lives in `store` and
//! `insights`.

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::insights::{position_insights, projection, ProjectionPoint};
use crate::types::{Position, PositionStatus};

fn shorter_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

fn format_amount(amount: f64, symbol: &str) -> String {
    format!("{amount:.4} {symbol}")
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_display(status: PositionStatus, pending: bool) -> String {
    let rendered = match status {
        PositionStatus::Active => "ACTIVE".bright_green().to_string(),
        PositionStatus::Completed => "COMPLETED".bright_blue().to_string(),
    };
    if pending {
        format!("{} {}", rendered, "(pending)".bright_yellow())
    } else {
        rendered
    }
}

/// Render the positions summary table. `pending_ids` marks positions whose
/// displayed state is an unconfirmed optimistic overlay.
pub fn positions_table(positions: &[Position], pending_ids: &[String]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Position",
            "Pair",
            "Status",
            "Rate",
            "Remaining",
            "Swapped",
            "To Withdraw",
            "Allocation",
            "Next Swap",
        ]);

    for position in positions {
        let insights = position_insights(position);
        let pending = pending_ids.iter().any(|id| id == &position.id);
        table.add_row(vec![
            shorter_address(&position.id),
            format!("{} -> {}", position.from.symbol, position.to.symbol),
            status_display(position.status, pending),
            format_amount(insights.rate.amount, &insights.rate.symbol),
            format_amount(
                insights.remaining_liquidity.amount,
                &insights.remaining_liquidity.symbol,
            ),
            format_amount(insights.swapped.amount, &insights.swapped.symbol),
            format_amount(insights.to_withdraw.amount, &insights.to_withdraw.symbol),
            format_amount(insights.allocation.amount, &insights.allocation.symbol),
            format_date(insights.next_swap_date),
        ]);
    }

    table
}

/// Render the liquidity-usage projection for one position.
pub fn projection_table(position: &Position) -> Table {
    let points: Vec<ProjectionPoint> = projection(position);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Date".to_string(),
            format!("Committed ({})", position.from.symbol),
            format!("Bought ({})", position.to.symbol),
            "Total Committed".to_string(),
            "Total Bought".to_string(),
        ]);

    for point in &points {
        table.add_row(vec![
            point.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.4}", point.committed),
            format!("{:.4}", point.bought),
            format!("{:.4}", point.total_committed),
            format!("{:.4}", point.total_bought),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorter_address() {
        assert_eq!(
            shorter_address("0x1234567890abcdef1234"),
            "0x1234...1234"
        );
        assert_eq!(shorter_address("pos-1"), "pos-1");
    }

    #[test]
    fn test_format_date_absent() {
        assert_eq!(format_date(None), "-");
    }
}
