use crate::domain::ports::{Snapshot, TableStore};
use crate::domain::table::Table;
use crate::utils::error::{HouseholdError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tables held in process memory. Each write bumps a counter that is handed
/// out as the version token, and a write carrying an outdated token is
/// rejected, which makes this the reference store for concurrent edits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<String, (Table, u64)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_table(self, name: &str, table: Table) -> Self {
        self.tables
            .lock()
            .await
            .insert(name.to_string(), (table, 1));
        self
    }

    /// Current content of a table, if it was ever written.
    pub async fn get(&self, name: &str) -> Option<Table> {
        self.tables
            .lock()
            .await
            .get(name)
            .map(|(table, _)| table.clone())
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn read_table(&self, name: &str) -> Result<Snapshot> {
        let tables = self.tables.lock().await;
        Ok(match tables.get(name) {
            Some((table, version)) => Snapshot {
                table: table.clone(),
                version: Some(version.to_string()),
            },
            None => Snapshot::default(),
        })
    }

    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let current = tables.get(name).map(|(_, version)| version.to_string());
        if current.as_deref() != expected_version {
            tracing::warn!(
                table = name,
                expected = ?expected_version,
                current = ?current,
                "Rejecting stale write"
            );
            return Err(HouseholdError::ConflictError {
                table: name.to_string(),
            });
        }

        let next = tables.get(name).map(|(_, version)| version + 1).unwrap_or(1);
        tables.insert(name.to_string(), (table.clone(), next));
        tracing::debug!(table = name, version = next, "{}", message);
        Ok(())
    }
}
