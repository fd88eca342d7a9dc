use thiserror::Error;

#[derive(Error, Debug)]
pub enum HouseholdError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Fill in all fields: beneficiaries, a positive amount and a reason are required")]
    IncompleteForm,

    #[error("{field} cannot be empty")]
    EmptyInput { field: String },

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Unknown {kind}: {name}")]
    UnknownEntity { kind: EntityKind, name: String },

    #[error("Malformed table '{table}': {message}")]
    TableFormatError { table: String, message: String },

    #[error("Storage backend error: {message}")]
    StorageError { message: String },

    #[error("Table '{table}' was modified by someone else since it was read")]
    ConflictError { table: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Member,
    Chore,
    HistoryEntry,
    ShoppingItem,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Member => "member",
            EntityKind::Chore => "chore",
            EntityKind::HistoryEntry => "history entry",
            EntityKind::ShoppingItem => "shopping item",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Domain,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The user can fix the input and try again.
    Medium,
    /// The action was rejected; nothing was written.
    High,
    /// The tool cannot run until the environment is fixed.
    Critical,
}

impl HouseholdError {
    pub fn unknown_member(name: impl Into<String>) -> Self {
        HouseholdError::UnknownEntity {
            kind: EntityKind::Member,
            name: name.into(),
        }
    }

    pub fn unknown_chore(name: impl Into<String>) -> Self {
        HouseholdError::UnknownEntity {
            kind: EntityKind::Chore,
            name: name.into(),
        }
    }

    pub fn table_format(table: impl Into<String>, message: impl Into<String>) -> Self {
        HouseholdError::TableFormatError {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            HouseholdError::IncompleteForm
            | HouseholdError::EmptyInput { .. }
            | HouseholdError::InvalidAmount { .. } => ErrorCategory::Validation,
            HouseholdError::UnknownEntity { .. } => ErrorCategory::Domain,
            HouseholdError::CsvError(_)
            | HouseholdError::HttpError(_)
            | HouseholdError::Base64Error(_)
            | HouseholdError::TableFormatError { .. }
            | HouseholdError::StorageError { .. }
            | HouseholdError::ConflictError { .. } => ErrorCategory::Storage,
            HouseholdError::ConfigError { .. }
            | HouseholdError::MissingConfigError { .. }
            | HouseholdError::InvalidConfigValueError { .. }
            | HouseholdError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            HouseholdError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Domain => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HouseholdError::HttpError(_) | HouseholdError::ConflictError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HouseholdError::IncompleteForm => {
                "Fill in all fields to record the payment".to_string()
            }
            HouseholdError::EmptyInput { field } => format!("Please enter a {}", field),
            HouseholdError::InvalidAmount { value, .. } => {
                format!("'{}' is not a valid amount", value)
            }
            HouseholdError::UnknownEntity { kind, name } => {
                format!("There is no {} called '{}'", kind, name)
            }
            HouseholdError::ConflictError { .. } => {
                "Someone else changed the data at the same time; nothing was saved".to_string()
            }
            HouseholdError::HttpError(_) | HouseholdError::StorageError { .. } => {
                "Could not reach the shared store; nothing was saved".to_string()
            }
            HouseholdError::TableFormatError { table, .. } => {
                format!("The '{}' table could not be read", table)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the values you entered and try again",
            ErrorCategory::Domain => "Check the spelling against the configured names",
            ErrorCategory::Storage if self.is_retryable() => {
                "Reload the latest data and repeat the action"
            }
            ErrorCategory::Storage => "Check the store location and its table layout",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, HouseholdError>;
