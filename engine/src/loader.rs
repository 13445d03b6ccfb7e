use crate::engine::{unix_now, SearchEngine};
use crate::store::ListingStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One polling cycle: fetch rows added strictly after `checkpoint`, index
/// them, return the next checkpoint.
///
/// The next checkpoint is captured *before* the fetch, so a row added while
/// the batch is processing gets picked up again next cycle — re-inserts are
/// no-ops, never missed rows. A failed fetch is logged and leaves the
/// checkpoint untouched; the cycle retries after the normal delay.
pub async fn run_cycle<S: ListingStore>(engine: &SearchEngine<S>, checkpoint: i64) -> i64 {
    let next = unix_now();
    match engine.store.listings_since(checkpoint).await {
        Ok(docs) => {
            if !docs.is_empty() {
                let fetched = docs.len();
                let added = engine.apply_batch(&docs);
                tracing::info!(fetched, added, checkpoint = next, "indexed listing batch");
            }
            next
        }
        Err(err) => {
            tracing::warn!(%err, "listing fetch failed, retrying next cycle");
            checkpoint
        }
    }
}

/// Handle to the background loader task.
pub struct LoaderHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LoaderHandle {
    /// Signal the loader and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the background loader: an immediate first cycle rebuilds the index
/// from the backing store (the index is never persisted), then the poll
/// loop runs until shutdown.
pub fn spawn_loader<S: ListingStore>(
    engine: Arc<SearchEngine<S>>,
    interval: Duration,
) -> LoaderHandle {
    let (shutdown, mut signal) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut checkpoint = 0;
        loop {
            checkpoint = run_cycle(&engine, checkpoint).await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = signal.changed() => break,
            }
        }
        tracing::debug!("loader stopped");
    });
    LoaderHandle { shutdown, task }
}
