use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct WithdrawArgs {
    /// Owner address
    pub address: String,

    /// Position id to withdraw from
    pub position_id: String,
}

pub async fn execute(config: &AppConfig, args: WithdrawArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;
    let tracking_id = store.withdraw(&args.position_id).await?;
    println!("Submitted withdraw (tracking id {tracking_id}), awaiting confirmation...");
    super::await_resolution(&store, config, &args.position_id).await
}
