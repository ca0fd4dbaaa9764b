//! Periodic sync trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::orchestrator::SyncOrchestrator;

/// Runs [`SyncOrchestrator::run_all`] on a fixed interval until stopped.
pub struct SyncScheduler {
    orchestrator: Arc<SyncOrchestrator>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncScheduler {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            orchestrator,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the sync loop. The first run happens one interval after start.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync scheduler already running");
            return;
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        let running = Arc::clone(&self.running);
        let period = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Sync loop started (every {:?})", period);
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = orchestrator.run_all().await;
                        info!(
                            "Scheduled sync finished: upcoming +{}, latest +{}/~{}",
                            result.upcoming.added, result.latest.added, result.latest.updated
                        );
                    }
                }
            }
            info!("Sync loop stopped");
        });
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync scheduler not running");
            return;
        }

        info!("Stopping sync scheduler");
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SyncConfig;
    use crate::store::{MovieStore, MovieTable, SqliteMovieStore};
    use crate::testing::{fixtures, MockTorrentIndex};

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_interval_until_stopped() {
        let index = Arc::new(MockTorrentIndex::new());
        index.add_movie(fixtures::yts_movie("tt0000001", "Tick", 1)).await;
        let store = Arc::new(SqliteMovieStore::in_memory().unwrap());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            None,
            index.clone(),
            store.clone(),
            SyncConfig::default(),
            Arc::new(ManualClock::default()),
        ));

        let scheduler = SyncScheduler::new(orchestrator, Duration::from_secs(60));
        scheduler.start();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store.exists(MovieTable::Mini, "tt0000001").await.unwrap());

        scheduler.stop();
        assert!(!scheduler.is_running());
        let latest_calls = index.queries().await.len();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(index.queries().await.len(), latest_calls);
    }
}
