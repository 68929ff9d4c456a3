use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;
use crate::display::positions_table;

#[derive(Args)]
pub struct PositionsArgs {
    /// Owner address
    pub address: String,
}

pub async fn execute(config: &AppConfig, args: PositionsArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;

    let positions = store.visible_positions().await;
    if positions.is_empty() {
        println!("No positions found for {}", args.address);
        return Ok(());
    }

    let mut pending_ids = Vec::new();
    for position in &positions {
        if store.has_pending_change(&position.id).await {
            pending_ids.push(position.id.clone());
        }
    }

    println!("{}", positions_table(&positions, &pending_ids));

    let token_info = store.token_info().await;
    if !token_info.is_empty() {
        println!("\nToken prices:");
        let mut entries: Vec<_> = token_info.iter().collect();
        entries.sort_by(|a, b| a.1.symbol.cmp(&b.1.symbol));
        for (address, info) in entries {
            println!("  {} ({}): ${:.4}", info.symbol, address, info.price_usd);
        }
    }

    Ok(())
}
