use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tokio::sync::broadcast::error::RecvError;

use crate::config::AppConfig;
use crate::store::StoreEvent;

#[derive(Args)]
pub struct WatchArgs {
    /// Owner address
    pub address: String,
}

fn event_line(event: &StoreEvent) -> String {
    match event {
        StoreEvent::ModificationConfirmed { position_id } => format!(
            "{} Modification confirmed for {}",
            "OK".bright_green(),
            position_id
        ),
        StoreEvent::ModificationFailed { position_id } => format!(
            "{} Modification failed for {}; position unchanged",
            "FAILED".bright_red(),
            position_id
        ),
    }
}

/// Run the reconciliation loop indefinitely, printing every terminal
/// outcome as it lands, until interrupted.
pub async fn execute(config: &AppConfig, args: WatchArgs) -> Result<()> {
    let store = super::loaded_store(config, &args.address).await?;
    println!(
        "Watching {} position(s) for {} (Ctrl-C to stop)",
        store.visible_positions().await.len(),
        args.address
    );

    let mut events = store.subscribe();
    let handle = store.spawn_reconciler(config.poll_interval);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => println!("{}", event_line(&event)),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event stream lagged, some outcomes were dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_line_names_the_position_and_outcome() {
        let confirmed = event_line(&StoreEvent::ModificationConfirmed {
            position_id: "pos-1".to_string(),
        });
        assert!(confirmed.contains("pos-1"));
        assert!(confirmed.contains("confirmed"));

        let failed = event_line(&StoreEvent::ModificationFailed {
            position_id: "pos-2".to_string(),
        });
        assert!(failed.contains("pos-2"));
        assert!(failed.contains("failed"));
    }
}
