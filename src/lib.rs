pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::HouseholdConfig;

pub use adapters::{CachedStore, GitHubStore, LocalStore, MemoryStore};
pub use core::{Household, TableLayout};
pub use domain::chores::{ChoreLedger, Standing};
pub use domain::debts::{DebtLedger, PaymentRequest};
pub use domain::model::{Member, Roster};
pub use domain::money::Money;
pub use domain::ports::TableStore;
pub use domain::shopping::ShoppingList;
pub use utils::error::{HouseholdError, Result};
