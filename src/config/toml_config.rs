use crate::adapters::cached::CachedStore;
use crate::adapters::github::{GitHubSettings, GitHubStore};
use crate::adapters::local::LocalStore;
use crate::adapters::memory::MemoryStore;
use crate::core::household::{TableLayout, DEFAULT_HISTORY_LIMIT};
use crate::domain::model::Roster;
use crate::domain::ports::TableStore;
use crate::utils::error::{HouseholdError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_list_name, validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_unique_names, validate_url, Validate,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "household.toml";
pub const DEFAULT_DATA_PATH: &str = "./data";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_CACHE_TTL_SECS: u64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdConfig {
    pub household: HouseholdSection,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    /// Chore definitions used by `init` to seed the chore table.
    #[serde(default)]
    pub chores: Vec<ChoreSeed>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdSection {
    pub name: Option<String>,
    pub members: Vec<String>,
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Github,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
    pub path: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub github: Option<GitHubConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub directory: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub chores: String,
    pub shopping: String,
    pub debts: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        let layout = TableLayout::default();
        Self {
            chores: layout.chores,
            shopping: layout.shopping,
            debts: layout.debts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoreSeed {
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl HouseholdConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| HouseholdError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HouseholdError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable. Unset
    /// variables are left as they are and caught by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HouseholdError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn display_name(&self) -> &str {
        self.household.name.as_deref().unwrap_or("Household")
    }

    pub fn roster(&self) -> Result<Roster> {
        Roster::new(&self.household.members)
    }

    pub fn history_limit(&self) -> usize {
        self.household.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn layout(&self) -> TableLayout {
        TableLayout {
            chores: self.tables.chores.trim().to_string(),
            shopping: self.tables.shopping.trim().to_string(),
            debts: self.tables.debts.trim().to_string(),
            history_limit: self.history_limit(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.store.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn chore_seeds(&self) -> Vec<(String, u32)> {
        self.chores
            .iter()
            .map(|c| (c.name.trim().to_string(), c.points))
            .collect()
    }

    pub fn data_path(&self) -> &str {
        self.store.path.as_deref().unwrap_or(DEFAULT_DATA_PATH)
    }

    fn github_settings(&self) -> Result<GitHubSettings> {
        let github = validate_required_field("store.github", &self.store.github)?;
        Ok(GitHubSettings {
            api_url: github
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            owner: github.owner.clone(),
            repo: github.repo.clone(),
            token: github.token.clone(),
            directory: github.directory.clone().unwrap_or_default(),
            branch: github.branch.clone().filter(|b| !b.trim().is_empty()),
        })
    }

    /// Builds the configured backend, behind a read cache unless the TTL is 0.
    pub fn build_store(&self) -> Result<Box<dyn TableStore>> {
        let store: Box<dyn TableStore> = match self.store.backend {
            Backend::Local => {
                tracing::debug!("Using local CSV store at {}", self.data_path());
                Box::new(LocalStore::new(self.data_path()))
            }
            Backend::Github => {
                let settings = self.github_settings()?;
                tracing::debug!(
                    "Using GitHub store {}/{} ({})",
                    settings.owner,
                    settings.repo,
                    settings.api_url
                );
                Box::new(GitHubStore::new(settings))
            }
            Backend::Memory => {
                tracing::warn!("Using in-memory store, changes are lost on exit");
                Box::new(MemoryStore::new())
            }
        };

        let ttl = self.cache_ttl();
        if ttl.is_zero() {
            Ok(store)
        } else {
            Ok(Box::new(CachedStore::new(store, ttl)))
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_unique_names("household.members", &self.household.members)?;
        for member in &self.household.members {
            validate_list_name("household.members", member)?;
        }

        if let Some(limit) = self.household.history_limit {
            validate_positive_number("household.history_limit", limit, 1)?;
        }

        let tables = [
            ("tables.chores", &self.tables.chores),
            ("tables.shopping", &self.tables.shopping),
            ("tables.debts", &self.tables.debts),
        ];
        for (field, name) in tables {
            validate_non_empty_string(field, name)?;
            validate_path(field, name)?;
        }
        let names: Vec<String> = tables.iter().map(|(_, name)| name.to_string()).collect();
        validate_unique_names("tables", &names)?;

        for chore in &self.chores {
            validate_non_empty_string("chores.name", &chore.name)?;
            validate_list_name("chores.name", &chore.name)?;
        }
        let chore_names: Vec<String> = self.chores.iter().map(|c| c.name.clone()).collect();
        if !chore_names.is_empty() {
            validate_unique_names("chores.name", &chore_names)?;
        }

        match self.store.backend {
            Backend::Local => validate_path("store.path", self.data_path())?,
            Backend::Github => {
                let settings = self.github_settings()?;
                validate_url("store.github.api_url", &settings.api_url)?;
                for (field, value) in [
                    ("store.github.owner", &settings.owner),
                    ("store.github.repo", &settings.repo),
                    ("store.github.token", &settings.token),
                ] {
                    validate_non_empty_string(field, value)?;
                    if value.contains("${") {
                        return Err(HouseholdError::MissingConfigError {
                            field: format!("{} (environment variable {} is not set)", field, value),
                        });
                    }
                }
            }
            Backend::Memory => {}
        }

        Ok(())
    }
}

impl Validate for HouseholdConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
