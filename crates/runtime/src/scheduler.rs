//! Background task that ticks the [`CombatManager`] at a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::Instrument;

use crate::api::{Result, RuntimeError};
use crate::manager::CombatManager;

/// Handle to the running tick task.
#[derive(Debug)]
pub struct TickScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TickScheduler {
    /// Spawns the tick loop on the current tokio runtime.
    ///
    /// Each tick runs the manager synchronously; a slow tick delays the next
    /// one instead of queueing a burst.
    pub fn spawn(manager: Arc<CombatManager>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_ms = interval.as_millis() as u64, "combat ticker started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let processed = manager.tick();
                        if processed > 0 {
                            tracing::trace!(processed, "tick complete");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("combat ticker stopped");
        };

        let handle = tokio::spawn(task.instrument(tracing::info_span!("combat-tick")));
        Self {
            shutdown_tx,
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the loop after the tick in progress, if any, and waits for it.
    pub async fn shutdown(self) -> Result<()> {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown_tx.send(true);
        self.handle.await.map_err(RuntimeError::SchedulerJoin)
    }
}
