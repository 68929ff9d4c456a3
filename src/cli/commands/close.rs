use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct CloseArgs {
    /// Owner address
    pub address: String,

    /// Position id to close
    pub position_id: String,
}

pub async fn execute(config: &AppConfig, args: CloseArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;
    let tracking_id = store.close(&args.position_id).await?;
    println!("Submitted close (tracking id {tracking_id}), awaiting confirmation...");
    super::await_resolution(&store, config, &args.position_id).await
}
