//! RetentionSweeper - periodic removal of old terminal records.
//!
//! Terminal records stay queryable for at least `retention` after their last
//! update. PENDING and RUNNING records are never touched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::ports::Clock;
use crate::store::StatusStore;

pub struct RetentionSweeper {
    store: Arc<StatusStore>,
    clock: Arc<dyn Clock>,
    retention: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<StatusStore>,
        clock: Arc<dyn Clock>,
        retention: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            retention,
            interval,
        }
    }

    /// One pass. Returns the number of records removed.
    pub fn sweep_once(&self) -> usize {
        let retention = chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::MAX);
        let Some(cutoff) = self.clock.now().checked_sub_signed(retention) else {
            return 0;
        };
        let removed = self.store.purge_terminal_before(cutoff);
        if removed > 0 {
            info!(removed, cutoff = %cutoff, "swept expired status records");
        }
        removed
    }

    /// Run `sweep_once` every `interval` until `shutdown` flips to true.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick fires immediately; nothing can be old yet
            ticker.tick().await;
            debug!(interval_ms = self.interval.as_millis() as u64, "retention sweeper started");

            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.sweep_once();
                    }
                }
            }
            debug!("retention sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionReport, TaskId, TaskType};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use ulid::Ulid;

    fn finished(store: &StatusStore) -> TaskId {
        let id = TaskId::from_ulid(Ulid::new());
        store.insert_pending(id, TaskType::DataCleanup, 5);
        store.mark_running(&id);
        store.set_terminal(&id, ExecutionReport::completed(json!("ok"), Duration::ZERO, true));
        id
    }

    #[test]
    fn records_survive_the_retention_window() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let store = Arc::new(StatusStore::new(clock.clone()));
        let sweeper = RetentionSweeper::new(
            Arc::clone(&store),
            clock.clone(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        let id = finished(&store);

        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(sweeper.sweep_once(), 0);
        assert!(store.get(&id).is_some());

        clock.advance(chrono::Duration::seconds(2));
        assert_eq!(sweeper.sweep_once(), 1);
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn spawned_loop_sweeps_and_stops() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let store = Arc::new(StatusStore::new(clock.clone()));
        finished(&store);
        clock.advance(chrono::Duration::hours(1));

        let (tx, rx) = watch::channel(false);
        let handle = RetentionSweeper::new(
            Arc::clone(&store),
            clock.clone(),
            Duration::from_secs(60),
            Duration::from_millis(10),
        )
        .spawn(rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.is_empty());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
