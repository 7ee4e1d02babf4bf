//! Background tasks feeding PostgreSQL.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::PostgresPersistence;
use crate::domain::{EventBus, Ledger};

/// Appends every event published on `event_bus` to the event log.
///
/// Write failures are logged and skipped; the in-process ledger already
/// holds the state they describe.
pub fn spawn_event_logger(store: PostgresPersistence, event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = store.save_event(&event).await {
                        tracing::error!(error = %e, event_type = event.event_type_str(), "failed to append event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event logger fell behind, events dropped from log");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("event logger stopped");
    })
}

/// Snapshots the ledger every `interval_secs`, pruning snapshots older
/// than `cleanup_after_days` (0 keeps everything).
pub fn spawn_snapshotter(
    store: PostgresPersistence,
    ledger: Arc<Ledger>,
    interval_secs: u64,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = ledger.snapshot().await;
            match store.save_snapshot(&snapshot).await {
                Ok(id) => {
                    tracing::debug!(snapshot_id = id, records = snapshot.record_count(), "ledger snapshot saved");
                }
                Err(e) => tracing::error!(error = %e, "failed to save ledger snapshot"),
            }
            if cleanup_after_days > 0 {
                match store.delete_old_snapshots(cleanup_after_days).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(deleted = n, "pruned old ledger snapshots"),
                    Err(e) => tracing::error!(error = %e, "failed to prune ledger snapshots"),
                }
            }
        }
    })
}
