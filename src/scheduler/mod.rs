//! Background scheduler that runs checks on their polling cadence.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::runner::CheckRunner;
use crate::store::{Check, Store, StoreError};

/// Drives one probe loop per check, honoring each check's `interval_s`.
///
/// Loops are kept in sync with check CRUD: created checks get a loop,
/// updated checks get a fresh loop with the new cadence, deleted checks
/// stop theirs. Manual runs through the runner are unaffected.
pub struct Scheduler {
    store: Arc<Store>,
    runner: Arc<CheckRunner>,
    stop_chans: Arc<RwLock<HashMap<Uuid, broadcast::Sender<()>>>>,
}

enum LoopExit {
    /// Stopped through the scheduler; the registry entry is already gone.
    Stopped,
    /// The check disappeared from the store.
    Vanished,
}

impl Scheduler {
    pub fn new(store: Arc<Store>, runner: Arc<CheckRunner>) -> Self {
        Self {
            store,
            runner,
            stop_chans: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start loops for every check currently in the store.
    pub async fn start(&self) {
        let checks = self.store.list_checks();
        tracing::info!("starting scheduler with {} checks", checks.len());
        for check in checks {
            self.add_check(&check).await;
        }
    }

    /// Begin scheduling a check.
    pub async fn add_check(&self, check: &Check) {
        let mut stop_chans = self.stop_chans.write().await;
        if stop_chans.contains_key(&check.id) {
            return; // Already running
        }

        let (stop_tx, _) = broadcast::channel(1);
        stop_chans.insert(check.id, stop_tx.clone());
        drop(stop_chans);

        tracing::info!(
            "scheduler: watching check {} ({} every {}s)",
            check.id,
            check.target,
            check.interval_s
        );

        let runner = self.runner.clone();
        let check_id = check.id;
        let interval_s = check.interval_s.max(1);
        let stop_chans = self.stop_chans.clone();

        tokio::spawn(async move {
            let exit = run_check_loop(runner, check_id, interval_s, stop_tx.subscribe()).await;
            if let LoopExit::Vanished = exit {
                stop_chans.write().await.remove(&check_id);
            }
        });
    }

    /// Stop scheduling a check. A no-op for unknown ids.
    pub async fn remove_check(&self, id: Uuid) {
        let mut stop_chans = self.stop_chans.write().await;
        if let Some(stop_tx) = stop_chans.remove(&id) {
            let _ = stop_tx.send(());
            tracing::info!("scheduler: stopped check {}", id);
        }
    }
}

/// Run the probe loop for a single check until it is stopped or vanishes.
async fn run_check_loop(
    runner: Arc<CheckRunner>,
    check_id: Uuid,
    interval_s: u32,
    mut stop_rx: broadcast::Receiver<()>,
) -> LoopExit {
    let period = Duration::from_secs(u64::from(interval_s));

    // Delay the first tick a full period so a freshly created check is not
    // probed before anyone expects a result.
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                return LoopExit::Stopped;
            }
            _ = interval.tick() => {
                match runner.run(check_id).await {
                    Ok(result) => {
                        tracing::debug!(
                            "scheduled run of check {}: {}",
                            check_id,
                            result.status.as_str()
                        );
                    }
                    Err(StoreError::NotFound(_)) => {
                        return LoopExit::Vanished;
                    }
                    Err(e) => {
                        tracing::error!("scheduled run of check {} failed: {}", check_id, e);
                    }
                }
            }
        }
    }
}
