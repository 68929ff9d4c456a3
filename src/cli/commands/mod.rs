pub mod add_funds;
pub mod close;
pub mod positions;
pub mod projection;
pub mod watch;
pub mod withdraw;

use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::AppConfig;
use crate::service::PositionService;
use crate::store::{PositionStore, StoreEvent};

/// Build a store for the live backend and load the address's positions.
pub(crate) async fn loaded_store(
    config: &AppConfig,
    address: &str,
) -> Result<Arc<PositionStore<PositionService>>> {
    let service = Arc::new(PositionService::from_config(config)?);
    let store = Arc::new(PositionStore::new(service));
    store.set_active_address(address).await?;
    Ok(store)
}

/// Run the reconciliation loop until the given position's pending change
/// reaches a terminal state, then report the outcome.
pub(crate) async fn await_resolution(
    store: &Arc<PositionStore<PositionService>>,
    config: &AppConfig,
    position_id: &str,
) -> Result<()> {
    let mut events = store.subscribe();
    let handle = store.spawn_reconciler(config.poll_interval);

    loop {
        match events.recv().await? {
            StoreEvent::ModificationConfirmed { position_id: id } if id == position_id => {
                println!("{} Modification confirmed for {}", "OK".bright_green(), id);
                break;
            }
            StoreEvent::ModificationFailed { position_id: id } if id == position_id => {
                println!(
                    "{} Modification failed for {}; position unchanged",
                    "FAILED".bright_red(),
                    id
                );
                break;
            }
            _ => {}
        }
    }

    handle.stop().await;
    Ok(())
}
