use crate::cache::types::Stamped;
use crate::error::StoreError;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

/// Durable home for cache entries, keyed by entry name.
#[async_trait]
pub trait SnapshotStore<T: Send + Sync + 'static>: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Stamped<T>>, StoreError>;

    /// Insert or replace the entry for `key`.
    async fn upsert(&self, key: &str, entry: &Stamped<T>) -> Result<(), StoreError>;
}

/// All entries in one bincode file, rewritten through a temp file and rename.
pub struct FileSnapshotStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _entry: PhantomData<fn() -> T>,
}

impl<T> FileSnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _entry: PhantomData,
        }
    }

    async fn read_all(&self) -> Result<FxHashMap<String, Stamped<T>>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FxHashMap::default());
            }
            Err(err) => return Err(err.into()),
        };

        match bincode::deserialize(&bytes) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(path = ?self.path, error = %err, "unreadable snapshot, starting fresh");
                Ok(FxHashMap::default())
            }
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for FileSnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn load(&self, key: &str) -> Result<Option<Stamped<T>>, StoreError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn upsert(&self, key: &str, entry: &Stamped<T>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), entry.clone());
        let serialized = bincode::serialize(&entries)?;

        let temp_path = self.path.with_extension("bin.tmp");
        tokio::fs::write(&temp_path, serialized).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}
