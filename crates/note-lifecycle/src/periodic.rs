//! Periodic rebuild trigger.
//!
//! A plain interval task, not a cron schedule: the sleep duration is
//! re-read from the runtime config at the top of every cycle, so a PATCH to
//! the interval takes effect on the next cycle without a restart.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::job::{RebuildReason, TriggerOutcome};
use crate::manager::LifecycleManager;

/// Spawn the periodic trigger task.
///
/// Triggers go through the same entry point as manual requests; a cycle
/// that overlaps a running job is skipped, not queued. The task exits when
/// `shutdown` is cancelled.
pub fn spawn_periodic_rebuild(
    manager: LifecycleManager,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let interval_secs = manager.runtime().read().unwrap().reindex_interval_secs;

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Periodic rebuild task stopped");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {
                    match manager.trigger(RebuildReason::Periodic) {
                        TriggerOutcome::Accepted => {
                            debug!("Periodic rebuild triggered");
                        }
                        TriggerOutcome::AlreadyInProgress => {
                            debug!("Periodic rebuild skipped; a job is already running");
                        }
                    }
                }
            }
        }
    })
}
