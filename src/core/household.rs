//! The household service: every user action is one read of the affected
//! table, one in-memory mutation, and one whole-table write carrying the
//! version token of that read.

use crate::core::{chore_sheet, debt_sheet, shopping_sheet};
use crate::domain::chores::{ChoreCompletionEvent, ChoreLedger, Standing};
use crate::domain::debts::{DebtLedger, DebtTransaction, PaymentRequest};
use crate::domain::model::{Roster, LIST_SEPARATOR};
use crate::domain::ports::TableStore;
use crate::domain::shopping::ShoppingList;
use crate::utils::error::{HouseholdError, Result};
use crate::utils::validation::{name_key, validate_list_name};
use chrono::{NaiveDateTime, Timelike};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Names of the three tables plus how much history the views show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub chores: String,
    pub shopping: String,
    pub debts: String,
    pub history_limit: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            chores: "Chores".to_string(),
            shopping: "Shopping".to_string(),
            debts: "Debts".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, truncated to the minute as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = chrono::Local::now().naive_local();
        now.with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub struct Household<S: TableStore> {
    store: S,
    roster: Roster,
    layout: TableLayout,
    clock: Box<dyn Clock>,
}

impl<S: TableStore> Household<S> {
    pub fn new(store: S, roster: Roster, layout: TableLayout) -> Self {
        Self {
            store,
            roster,
            layout,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load_chores(&self) -> Result<(ChoreLedger, Option<String>)> {
        let snapshot = self.store.read_table(&self.layout.chores).await?;
        let ledger = chore_sheet::decode(&self.layout.chores, &snapshot.table, &self.roster)?;
        Ok((ledger, snapshot.version))
    }

    async fn load_shopping(&self) -> Result<(ShoppingList, Option<String>)> {
        let snapshot = self.store.read_table(&self.layout.shopping).await?;
        Ok((shopping_sheet::decode(&snapshot.table), snapshot.version))
    }

    async fn load_debts(&self) -> Result<(DebtLedger, Option<String>)> {
        let snapshot = self.store.read_table(&self.layout.debts).await?;
        let ledger = debt_sheet::decode(&self.layout.debts, &snapshot.table, &self.roster)?;
        Ok((ledger, snapshot.version))
    }

    pub async fn chores(&self) -> Result<ChoreLedger> {
        Ok(self.load_chores().await?.0)
    }

    pub async fn standings(&self) -> Result<Vec<Standing>> {
        Ok(self.chores().await?.standings(&self.roster))
    }

    pub async fn shopping(&self) -> Result<ShoppingList> {
        Ok(self.load_shopping().await?.0)
    }

    pub async fn debts(&self) -> Result<DebtLedger> {
        Ok(self.load_debts().await?.0)
    }

    pub async fn record_chores<N: AsRef<str>>(
        &self,
        member: &str,
        chore_names: &[N],
    ) -> Result<ChoreCompletionEvent> {
        let (mut ledger, version) = self.load_chores().await?;
        let event = ledger
            .record_completion(&self.roster, member, chore_names, self.clock.now())?
            .clone();

        let message = format!("Update chores for {}", event.member);
        self.store
            .write_table(
                &self.layout.chores,
                &chore_sheet::encode(&ledger, &self.roster),
                version.as_deref(),
                &message,
            )
            .await?;
        tracing::info!(
            "🧹 {} completed {}",
            event.member,
            if event.chores.is_empty() {
                "nothing".to_string()
            } else {
                event.chores.join(LIST_SEPARATOR)
            }
        );
        Ok(event)
    }

    /// Deletes a history entry (0 = most recent) together with the points it
    /// granted.
    pub async fn revoke_chore_entry(&self, position: usize) -> Result<ChoreCompletionEvent> {
        let (mut ledger, version) = self.load_chores().await?;
        let event = ledger.revoke_completion(position)?;

        let message = format!("Revoke chores of {}", event.member);
        self.store
            .write_table(
                &self.layout.chores,
                &chore_sheet::encode(&ledger, &self.roster),
                version.as_deref(),
                &message,
            )
            .await?;
        tracing::info!("↩️ Revoked chore entry #{} of {}", position + 1, event.member);
        Ok(event)
    }

    pub async fn add_item(&self, item: &str) -> Result<()> {
        let (mut list, version) = self.load_shopping().await?;
        list.add(item)?;

        let message = format!("Add shopping item: {}", item.trim());
        self.write_shopping(&list, version, &message).await?;
        tracing::info!("🛒 Added '{}' to the shopping list", item.trim());
        Ok(())
    }

    /// Removes every item whose text matches. Returns how many entries went.
    pub async fn remove_items<N: AsRef<str>>(&self, items: &[N]) -> Result<usize> {
        let (mut list, version) = self.load_shopping().await?;
        let removed = list.remove_many(items);
        if removed == 0 {
            tracing::debug!("No shopping item matched, nothing to write");
            return Ok(0);
        }

        let names: Vec<&str> = items.iter().map(|i| i.as_ref().trim()).collect();
        let message = format!("Remove shopping items: {}", names.join(LIST_SEPARATOR));
        self.write_shopping(&list, version, &message).await?;
        tracing::info!("🛒 Removed {} shopping entries", removed);
        Ok(removed)
    }

    /// Removes items by their zero-based position in the current list.
    pub async fn remove_positions(&self, positions: &[usize]) -> Result<Vec<String>> {
        let (mut list, version) = self.load_shopping().await?;
        let removed = list.remove_positions(positions)?;
        if removed.is_empty() {
            return Ok(removed);
        }

        let message = format!("Remove shopping items: {}", removed.join(LIST_SEPARATOR));
        self.write_shopping(&list, version, &message).await?;
        tracing::info!("🛒 Removed {} shopping entries", removed.len());
        Ok(removed)
    }

    pub async fn clear_shopping(&self) -> Result<usize> {
        let (mut list, version) = self.load_shopping().await?;
        let count = list.len();
        list.clear();

        self.write_shopping(&list, version, "Clear shopping list").await?;
        tracing::info!("🛒 Cleared {} shopping entries", count);
        Ok(count)
    }

    async fn write_shopping(
        &self,
        list: &ShoppingList,
        version: Option<String>,
        message: &str,
    ) -> Result<()> {
        self.store
            .write_table(
                &self.layout.shopping,
                &shopping_sheet::encode(list),
                version.as_deref(),
                message,
            )
            .await
    }

    pub async fn record_payment(&self, request: &PaymentRequest) -> Result<DebtTransaction> {
        let (mut ledger, version) = self.load_debts().await?;
        let transaction = ledger
            .record_payment(&self.roster, request, self.clock.now())?
            .clone();

        let message = format!(
            "Add debt: {} paid {}",
            transaction.payer, transaction.amount
        );
        self.store
            .write_table(
                &self.layout.debts,
                &debt_sheet::encode(&ledger),
                version.as_deref(),
                &message,
            )
            .await?;
        tracing::info!(
            "💸 {} paid {} for {} ({})",
            transaction.payer,
            transaction.amount,
            transaction.beneficiaries_label(&self.roster),
            transaction.reason
        );
        Ok(transaction)
    }

    /// Writes a starting table for each of the three tables that does not
    /// exist yet. Returns the names of the tables it created.
    pub async fn init(&self, chores: &[(String, u32)]) -> Result<Vec<String>> {
        let mut seeded = Vec::new();

        let snapshot = self.store.read_table(&self.layout.chores).await?;
        if snapshot.table.columns.is_empty() {
            let mut seeds: Vec<(String, u32)> = Vec::with_capacity(chores.len());
            for (name, points) in chores {
                let name = name.trim();
                if name.is_empty() {
                    return Err(HouseholdError::EmptyInput {
                        field: "chore name".to_string(),
                    });
                }
                validate_list_name("chores.name", name)?;
                if seeds.iter().any(|(n, _)| name_key(n) == name_key(name)) {
                    return Err(HouseholdError::ConfigValidationError {
                        field: "chores".to_string(),
                        message: format!("chore '{}' is listed twice", name),
                    });
                }
                seeds.push((name.to_string(), *points));
            }
            self.store
                .write_table(
                    &self.layout.chores,
                    &chore_sheet::seed(&seeds, &self.roster),
                    snapshot.version.as_deref(),
                    "Initialize chores",
                )
                .await?;
            seeded.push(self.layout.chores.clone());
        }

        let snapshot = self.store.read_table(&self.layout.shopping).await?;
        if snapshot.table.columns.is_empty() {
            self.write_shopping(&ShoppingList::default(), snapshot.version, "Initialize shopping list")
                .await?;
            seeded.push(self.layout.shopping.clone());
        }

        let snapshot = self.store.read_table(&self.layout.debts).await?;
        if snapshot.table.columns.is_empty() {
            self.store
                .write_table(
                    &self.layout.debts,
                    &debt_sheet::encode(&DebtLedger::empty(&self.roster)),
                    snapshot.version.as_deref(),
                    "Initialize debts",
                )
                .await?;
            seeded.push(self.layout.debts.clone());
        }

        if !seeded.is_empty() {
            tracing::info!("📋 Initialized tables: {}", seeded.join(LIST_SEPARATOR));
        }
        Ok(seeded)
    }
}
