//! Live query subscriptions.
//!
//! A [`LiveQuery`] is a storage read that continuously re-delivers updated
//! results as the underlying table changes, rather than a one-shot fetch.
//! Each live query owns a background task that re-runs its query whenever the
//! database's revision channel is bumped and publishes the fresh snapshot
//! through a watch channel. Queries against the small local table are
//! sub-millisecond, so they run directly on the task.
//!
//! Dropping the `LiveQuery` stops its task; dropping the `Database` ends all
//! of them. A query error during refresh is logged and the previous snapshot
//! retained.

use crate::db::Database;
use crate::errors::AppResult;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// A continuously-updating query result.
///
/// Holds the latest snapshot; consumers either read it synchronously via
/// [`LiveQuery::snapshot`] or hold a [`watch::Receiver`] from
/// [`LiveQuery::subscribe`] for the lifetime they care about.
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Runs `query` once for the initial snapshot, then spawns a refresh task
    /// that re-runs it after every database change.
    ///
    /// The change subscription is taken before the initial run, so a write
    /// landing between the first snapshot and the task starting still
    /// triggers a refresh.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial query fails.
    pub(crate) fn spawn<F>(label: &'static str, db: &Database, query: F) -> AppResult<Self>
    where
        F: Fn() -> AppResult<T> + Send + 'static,
    {
        let mut changes = db.subscribe_changes();
        let initial = query()?;
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            loop {
                if changes.changed().await.is_err() {
                    // Database dropped; nothing further to deliver.
                    break;
                }
                match query() {
                    Ok(value) => {
                        tx.send_replace(value);
                    }
                    Err(e) => {
                        warn!("Live query '{}' failed to refresh: {}", label, e);
                    }
                }
            }
        });

        Ok(LiveQuery { rx, task })
    }

    /// The latest delivered snapshot.
    pub fn snapshot(&self) -> T {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }

    /// Waits for the next snapshot. Returns `false` once the query has
    /// stopped delivering.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_live_query_initial_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let live = LiveQuery::spawn("count", &db, || Ok(7u32)).unwrap();
        assert_eq!(live.snapshot(), 7);
    }

    #[tokio::test]
    async fn test_live_query_refreshes_on_change() {
        let db = Database::open_in_memory().unwrap();
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let mut live =
            LiveQuery::spawn("counter", &db, move || Ok(c.fetch_add(1, Ordering::SeqCst))).unwrap();
        assert_eq!(live.snapshot(), 0);

        db.mark_changed();
        let refreshed = tokio::time::timeout(Duration::from_secs(2), live.changed())
            .await
            .unwrap();
        assert!(refreshed);
        assert_eq!(live.snapshot(), 1);
    }

    #[tokio::test]
    async fn test_live_query_stops_when_database_dropped() {
        let db = Database::open_in_memory().unwrap();
        let mut live = LiveQuery::spawn("static", &db, || Ok(1u32)).unwrap();

        drop(db);
        let refreshed = tokio::time::timeout(Duration::from_secs(2), live.changed())
            .await
            .unwrap();
        assert!(!refreshed);
    }
}
