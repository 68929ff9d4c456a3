use anyhow::{bail, Result};
use clap::Args;

use crate::config::AppConfig;
use crate::display::projection_table;
use crate::insights::position_insights;

#[derive(Args)]
pub struct ProjectionArgs {
    /// Owner address
    pub address: String,

    /// Position id as assigned by the indexer
    pub position_id: String,
}

pub async fn execute(config: &AppConfig, args: ProjectionArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;

    let positions = store.visible_positions().await;
    let Some(position) = positions.iter().find(|p| p.id == args.position_id) else {
        bail!("position {} not found for {}", args.position_id, args.address);
    };

    let insights = position_insights(position);
    println!(
        "{} -> {} | rate {:.4} {} | allocation {:.4} {}",
        position.from.symbol,
        position.to.symbol,
        insights.rate.amount,
        insights.rate.symbol,
        insights.allocation.amount,
        insights.allocation.symbol,
    );
    match insights.starting_date {
        Some(date) => println!("started {}", date.format("%Y-%m-%d %H:%M")),
        None => println!("no swaps executed yet"),
    }

    let table = projection_table(position);
    if position.swaps.is_empty() {
        println!("nothing to project");
    } else {
        println!("{table}");
    }

    Ok(())
}
