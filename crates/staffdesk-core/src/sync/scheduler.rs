//! Periodic sync driver

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::{CycleOutcome, SyncEngine};
use crate::auth::SessionProvider;
use crate::config::DEFAULT_SYNC_INTERVAL_SECS;
use crate::db::LocalStore;
use crate::remote::RemoteStore;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS);

/// Run a sync cycle immediately and then every `interval` until `shutdown`
/// resolves.
///
/// Ticks that fall due while a cycle is still running are dropped rather than
/// queued. An in-flight cycle is abandoned at shutdown; its writes are per-row
/// and the next run picks up where it stopped.
pub async fn run_scheduler<L, R, S, F>(engine: &SyncEngine<L, R, S>, interval: Duration, shutdown: F)
where
    L: LocalStore,
    R: RemoteStore,
    S: SessionProvider,
    F: Future<Output = ()>,
{
    let period = if interval.is_zero() {
        tracing::warn!("Sync interval must be positive, using {DEFAULT_SYNC_INTERVAL:?}");
        DEFAULT_SYNC_INTERVAL
    } else {
        interval
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!("Sync scheduler started, interval={}s", period.as_secs());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tracing::debug!("Sync scheduler tick");
        tokio::select! {
            () = &mut shutdown => break,
            outcome = engine.run_sync_cycle() => {
                if let CycleOutcome::Completed(report) = outcome {
                    let failed = report.failed_collections();
                    if !failed.is_empty() {
                        tracing::warn!("Sync cycle finished with failed collections: {failed:?}");
                    }
                }
            }
        }
    }

    tracing::info!("Sync scheduler stopped");
}
