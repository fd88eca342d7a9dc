//! Tables kept as CSV files in a GitHub repository, read and written through
//! the repository contents API. The blob `sha` serves as the version token,
//! so GitHub itself rejects a write based on a stale read.

use crate::adapters::csv_codec::{read_csv, write_csv};
use crate::domain::ports::{Snapshot, TableStore};
use crate::domain::table::Table;
use crate::utils::error::{HouseholdError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("household-ledger/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub directory: String,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct GitHubStore {
    settings: GitHubSettings,
    client: Client,
}

impl GitHubStore {
    pub fn new(settings: GitHubSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    fn contents_url(&self, name: &str) -> String {
        let directory = self.settings.directory.trim_matches('/');
        let file = if directory.is_empty() {
            format!("{}.csv", name)
        } else {
            format!("{}/{}.csv", directory, name)
        };
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.owner,
            self.settings.repo,
            file
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.settings.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }
}

async fn storage_error(response: reqwest::Response, action: &str) -> HouseholdError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    HouseholdError::StorageError {
        message: format!("{} failed with {}: {}", action, status, body.trim()),
    }
}

#[async_trait]
impl TableStore for GitHubStore {
    async fn read_table(&self, name: &str) -> Result<Snapshot> {
        let url = self.contents_url(name);
        tracing::debug!("Fetching {}", url);

        let mut request = self.request(reqwest::Method::GET, &url);
        if let Some(branch) = &self.settings.branch {
            request = request.query(&[("ref", branch)]);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!("{} not found, reading as empty", name);
                Ok(Snapshot::default())
            }
            status if status.is_success() => {
                let body: ContentResponse = response.json().await?;
                let encoded: String = body
                    .content
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let data = STANDARD.decode(encoded)?;
                Ok(Snapshot {
                    table: read_csv(&data)?,
                    version: Some(body.sha),
                })
            }
            _ => Err(storage_error(response, "Reading table").await),
        }
    }

    async fn write_table(
        &self,
        name: &str,
        table: &Table,
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let url = self.contents_url(name);
        let payload = UpdateRequest {
            message,
            content: STANDARD.encode(write_csv(table)?),
            sha: expected_version,
            branch: self.settings.branch.as_deref(),
        };

        tracing::debug!("Updating {} ({})", url, message);
        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::warn!("GitHub rejected stale write to {}", name);
                Err(HouseholdError::ConflictError {
                    table: name.to_string(),
                })
            }
            _ => Err(storage_error(response, "Writing table").await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Row;
    use httpmock::prelude::*;

    fn store(server: &MockServer) -> GitHubStore {
        GitHubStore::new(GitHubSettings {
            api_url: server.base_url(),
            owner: "casa".to_string(),
            repo: "ledger".to_string(),
            token: "secret".to_string(),
            directory: "data".to_string(),
            branch: None,
        })
    }

    #[tokio::test]
    async fn test_read_decodes_content_and_sha() {
        let server = MockServer::start();
        let encoded = STANDARD.encode("Item\nMilk\nEggs\n");
        // GitHub wraps base64 at 60 columns
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/casa/ledger/contents/data/Shopping.csv")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(serde_json::json!({
                "content": wrapped,
                "sha": "abc123"
            }));
        });

        let snapshot = store(&server).read_table("Shopping").await.unwrap();
        mock.assert();
        assert_eq!(snapshot.version.as_deref(), Some("abc123"));
        assert_eq!(snapshot.table.rows.len(), 2);
        assert_eq!(snapshot.table.rows[1].get("Item"), "Eggs");
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/casa/ledger/contents/data/Debts.csv");
            then.status(404);
        });

        let snapshot = store(&server).read_table("Debts").await.unwrap();
        assert!(snapshot.table.is_empty());
        assert!(snapshot.version.is_none());
    }

    #[tokio::test]
    async fn test_write_sends_sha_and_message() {
        let server = MockServer::start();
        let mut table = Table::new(["Item"]);
        table.push(Row::new().with("Item", "Milk"));
        let expected_content = STANDARD.encode("Item\nMilk\n");

        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/repos/casa/ledger/contents/data/Shopping.csv")
                .json_body(serde_json::json!({
                    "message": "Add shopping item: Milk",
                    "content": expected_content,
                    "sha": "abc123"
                }));
            then.status(200).json_body(serde_json::json!({"content": {"sha": "def456"}}));
        });

        store(&server)
            .write_table("Shopping", &table, Some("abc123"), "Add shopping item: Milk")
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_stale_write_is_a_conflict() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/repos/casa/ledger/contents/data/Debts.csv");
            then.status(409).json_body(serde_json::json!({"message": "sha mismatch"}));
        });

        let err = store(&server)
            .write_table("Debts", &Table::new(["Member"]), Some("old"), "Add debt")
            .await
            .unwrap_err();
        assert!(matches!(err, HouseholdError::ConflictError { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_storage_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/casa/ledger/contents/data/Chores.csv");
            then.status(500).body("boom");
        });

        let err = store(&server).read_table("Chores").await.unwrap_err();
        assert!(matches!(err, HouseholdError::StorageError { .. }));
    }
}
