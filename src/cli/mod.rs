//! CLI for dcadash
//!
//! Thin presentation layer over the position store: clap for argument
//! parsing, one module per command under `commands/`.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::AppConfig;
use commands::add_funds::AddFundsArgs;
use commands::close::CloseArgs;
use commands::positions::PositionsArgs;
use commands::projection::ProjectionArgs;
use commands::watch::WatchArgs;
use commands::withdraw::WithdrawArgs;

#[derive(Parser)]
#[command(name = "dcadash")]
#[command(version)]
#[command(about = "Dashboard for recurring token-swap (DCA) positions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List an address's positions with derived insights
    Positions(PositionsArgs),

    /// Print the liquidity-usage projection for one position
    Projection(ProjectionArgs),

    /// Withdraw all swapped funds from a position
    Withdraw(WithdrawArgs),

    /// Close a position, returning unspent liquidity
    Close(CloseArgs),

    /// Add funds to a position's remaining schedule
    AddFunds(AddFundsArgs),

    /// Run the reconciliation loop and stream modification outcomes
    Watch(WatchArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        crate::logging::init_logging()?;
        let config = AppConfig::from_env()?;

        match self.command {
            Commands::Positions(args) => commands::positions::execute(&config, args).await,
            Commands::Projection(args) => commands::projection::execute(&config, args).await,
            Commands::Withdraw(args) => commands::withdraw::execute(&config, args).await,
            Commands::Close(args) => commands::close::execute(&config, args).await,
            Commands::AddFunds(args) => commands::add_funds::execute(&config, args).await,
            Commands::Watch(args) => commands::watch::execute(&config, args).await,
        }
    }
}
