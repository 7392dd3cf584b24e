pub mod clock;
pub mod storage;
pub mod types;

use crate::cache::clock::Clock;
use crate::cache::storage::SnapshotStore;
use crate::cache::types::Stamped;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// TTL memoization in front of an expensive computation.
///
/// Concurrent misses on the same key each run `compute`; the last writer wins.
/// There is no single-flight coordination. Entries are replaced whole, never
/// mutated in place.
pub struct CacheGate<T> {
    entries: RwLock<FxHashMap<String, Stamped<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn SnapshotStore<T>>>,
}

impl<T> CacheGate<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl,
            clock,
            store: None,
        }
    }

    /// Also read from and write through to `store`, so entries outlive the process.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore<T>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The fresh value for `key`, from memory or else the snapshot store.
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.is_fresh(now, self.ttl) {
                    return Some(entry.value.clone());
                }
            }
        }

        let store = self.store.as_ref()?;
        match store.load(key).await {
            Ok(Some(entry)) if entry.is_fresh(now, self.ttl) => {
                debug!(key, "promoting snapshot entry");
                let value = entry.value.clone();
                self.entries.write().await.insert(key.to_string(), entry);
                Some(value)
            }
            Ok(_) => None,
            Err(err) => {
                warn!(key, error = %err, "snapshot read failed");
                None
            }
        }
    }

    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.get_or_compute_if(key, compute, |_| true).await
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but a fresh value is only
    /// stored when `keep` accepts it. Rejected values are returned uncached.
    pub async fn get_or_compute_if<F, Fut, P>(&self, key: &str, compute: F, keep: P) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
        P: FnOnce(&T) -> bool,
    {
        if let Some(value) = self.get(key).await {
            info!(key, "cache hit");
            return value;
        }

        info!(key, "cache miss, computing");
        let value = compute().await;
        if keep(&value) {
            self.put(key, value.clone()).await;
        } else {
            debug!(key, "computed value rejected, not caching");
        }
        value
    }

    pub async fn put(&self, key: &str, value: T) {
        let entry = Stamped::new(value, self.clock.now_millis());

        if let Some(store) = &self.store {
            if let Err(err) = store.upsert(key, &entry).await {
                warn!(key, error = %err, "snapshot write failed");
            }
        }

        self.entries.write().await.insert(key.to_string(), entry);
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
