//! TTL Reaper Task
//!
//! Background task that periodically removes expired entries, so keys that are
//! written once and never read again still release their memory.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// A table the reaper can sweep.
///
/// The sweep runs in two phases so the write lock is never held for a full
/// scan: expired keys are collected under the read lock, then removed under
/// the write lock after re-checking each one at the same instant. An entry
/// whose TTL was refreshed in between survives.
#[async_trait]
pub trait Reap: Send + Sync + 'static {
    type Key: Send + 'static;

    /// Current timestamp from the store's clock.
    fn now(&self) -> i64;

    /// Keys whose expiry lies strictly before `now`.
    async fn collect_expired(&self, now: i64) -> Vec<Self::Key>;

    /// Removes those of `keys` still expired at `now`; returns how many went.
    async fn remove_expired(&self, keys: Vec<Self::Key>, now: i64) -> usize;
}

/// Runs one two-phase sweep over `target`.
pub async fn sweep<T: Reap + ?Sized>(target: &T) -> usize {
    let now = target.now();
    let expired = target.collect_expired(now).await;
    if expired.is_empty() {
        return 0;
    }
    target.remove_expired(expired, now).await
}

// == Reaper Handle ==
/// Owner side of a running reaper. Stopping is idempotent and also happens on drop.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop after its current sweep.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The task holds only a weak reference, so it also ends once the store it
/// serves is gone.
///
/// # Panics
/// Panics if called outside a Tokio runtime, like `tokio::spawn`.
pub fn spawn_reaper<T: Reap>(target: &Arc<T>, interval: Duration, label: &'static str) -> ReaperHandle {
    let target: Weak<T> = Arc::downgrade(target);
    let (shutdown, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!("Starting {} reaper with interval of {:?}", label, interval);

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stopped.changed() => break,
            }

            let Some(target) = target.upgrade() else {
                break;
            };
            let removed = sweep(target.as_ref()).await;

            if removed > 0 {
                info!("{} reaper: removed {} expired entries", label, removed);
            } else {
                debug!("{} reaper: no expired entries found", label);
            }
        }

        info!("{} reaper stopped", label);
    });

    ReaperHandle { shutdown, task }
}
