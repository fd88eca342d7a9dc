use crate::adapters::csv_codec::{read_csv, write_csv};
use crate::domain::ports::{Snapshot, TableStore};
use crate::domain::table::Table;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One CSV file per table under a base directory. No version tokens, so
/// the last write wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", name))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl TableStore for LocalStore {
    async fn read_table(&self, name: &str) -> Result<Snapshot> {
        let path = self.table_path(name);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Snapshot::unversioned(read_csv(&data)?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet, reading as empty", path.display());
                Ok(Snapshot::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        _expected_version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let path = self.table_path(name);
        let data = write_csv(table)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // rename so a failed write never leaves half a table behind
        let staging = path.with_extension("csv.tmp");
        tokio::fs::write(&staging, &data).await?;
        tokio::fs::rename(&staging, &path).await?;

        tracing::debug!(
            "Wrote {} rows to {} ({})",
            table.rows.len(),
            path.display(),
            message
        );
        Ok(())
    }
}
