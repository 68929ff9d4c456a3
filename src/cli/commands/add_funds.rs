use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use crate::config::AppConfig;

#[derive(Args)]
pub struct AddFundsArgs {
    /// Owner address
    pub address: String,

    /// Position id to top up
    pub position_id: String,

    /// Amount in `from`-token units, e.g. 5.00
    pub amount: Decimal,
}

pub async fn execute(config: &AppConfig, args: AddFundsArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;
    let tracking_id = store.add_funds(&args.position_id, args.amount).await?;
    println!(
        "Submitted add-funds of {} (tracking id {tracking_id}), awaiting confirmation...",
        args.amount
    );
    super::await_resolution(&store, config, &args.position_id).await
}
