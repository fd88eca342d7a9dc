use crate::domain::table::Table;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A table as read from the store, with the backend's version token if it has one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub table: Table,
    pub version: Option<String>,
}

impl Snapshot {
    pub fn unversioned(table: Table) -> Self {
        Self {
            table,
            version: None,
        }
    }
}

/// Durable store of named tables. Writes replace the whole table.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Reads a table; a table that does not exist yet reads as empty.
    async fn read_table(&self, name: &str) -> Result<Snapshot>;

    /// Overwrites a table. `expected_version` is the token from the read this
    /// write is based on; backends that track versions reject stale writes
    /// with `ConflictError`, the others ignore it.
    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<()>;

    async fn read_columns(&self, name: &str, columns: &[&str]) -> Result<Table> {
        let snapshot = self.read_table(name).await?;
        Ok(snapshot.table.project(columns))
    }
}

#[async_trait]
impl<T: TableStore + ?Sized> TableStore for Box<T> {
    async fn read_table(&self, name: &str) -> Result<Snapshot> {
        (**self).read_table(name).await
    }

    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        (**self)
            .write_table(name, table, expected_version, message)
            .await
    }
}

