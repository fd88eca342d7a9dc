use crate::domain::ports::{Snapshot, TableStore};
use crate::domain::table::Table;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(1);

/// Serves repeated reads of the same table from memory for a short window.
/// Any write through the cache drops the cached copy of that table, so a
/// read after a write always goes back to the store.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Snapshot)>>,
}

impl<S: TableStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn invalidate(&self, name: &str) {
        self.entries.lock().await.remove(name);
    }
}

#[async_trait]
impl<S: TableStore> TableStore for CachedStore<S> {
    async fn read_table(&self, name: &str) -> Result<Snapshot> {
        if let Some((fetched_at, snapshot)) = self.entries.lock().await.get(name) {
            if fetched_at.elapsed() < self.ttl {
                tracing::trace!(table = name, "Serving cached table");
                return Ok(snapshot.clone());
            }
        }

        let snapshot = self.inner.read_table(name).await?;
        self.entries
            .lock()
            .await
            .insert(name.to_string(), (Instant::now(), snapshot.clone()));
        Ok(snapshot)
    }

    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let result = self
            .inner
            .write_table(name, table, expected_version, message)
            .await;
        // also after a failed write: a conflict means the cached copy is stale
        self.invalidate(name).await;
        result
    }
}
