use crate::app::render;
use crate::config::cli::{ChoresCommand, Command, DebtsCommand, ShoppingCommand};
use crate::core::household::Household;
use crate::domain::debts::PaymentRequest;
use crate::domain::money::Money;
use crate::domain::ports::TableStore;
use crate::utils::error::{EntityKind, HouseholdError, Result};

/// Turns a 1-based position typed by the user into an index.
fn index_of(kind: EntityKind, position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| HouseholdError::UnknownEntity {
            kind,
            name: format!("#{}", position),
        })
}

/// Runs one command and returns the text to print.
pub async fn execute<S: TableStore>(
    household: &Household<S>,
    command: &Command,
    chore_seeds: &[(String, u32)],
) -> Result<String> {
    match command {
        Command::Init => {
            let seeded = household.init(chore_seeds).await?;
            Ok(if seeded.is_empty() {
                "All tables already exist\n".to_string()
            } else {
                format!("✅ Created {}\n", seeded.join(", "))
            })
        }
        Command::Chores(command) => chores(household, command).await,
        Command::Shopping(command) => shopping(household, command).await,
        Command::Debts(command) => debts(household, command).await,
    }
}

async fn chores<S: TableStore>(household: &Household<S>, command: &ChoresCommand) -> Result<String> {
    let limit = household.layout().history_limit;
    match command {
        ChoresCommand::Standings => Ok(render::standings(&household.standings().await?)),
        ChoresCommand::History => {
            let ledger = household.chores().await?;
            Ok(render::chore_history(ledger.recent_history(limit)))
        }
        ChoresCommand::Table => {
            let ledger = household.chores().await?;
            Ok(render::chore_table(&ledger, household.roster()))
        }
        ChoresCommand::Done { member, chores } => {
            let event = household.record_chores(member, chores.as_slice()).await?;
            let mut out = format!("✅ {} completed {}\n\n", event.member, event.chores.join(", "));
            out.push_str(&render::standings(&household.standings().await?));
            Ok(out)
        }
        ChoresCommand::Undo { position } => {
            let index = index_of(EntityKind::HistoryEntry, *position)?;
            let event = household.revoke_chore_entry(index).await?;
            Ok(format!(
                "↩️ Removed {}'s entry ({})\n",
                event.member,
                event.chores.join(", ")
            ))
        }
    }
}

async fn shopping<S: TableStore>(
    household: &Household<S>,
    command: &ShoppingCommand,
) -> Result<String> {
    match command {
        ShoppingCommand::List => Ok(render::shopping(&household.shopping().await?)),
        ShoppingCommand::Add { text } => {
            household.add_item(&text.join(" ")).await?;
            Ok(render::shopping(&household.shopping().await?))
        }
        ShoppingCommand::Remove { items, positions } => {
            let removed = if positions.is_empty() {
                household.remove_items(items.as_slice()).await?
            } else {
                let indices = positions
                    .iter()
                    .map(|p| index_of(EntityKind::ShoppingItem, *p))
                    .collect::<Result<Vec<_>>>()?;
                household.remove_positions(&indices).await?.len()
            };
            let mut out = if removed == 0 {
                "Nothing matched, the list is unchanged\n\n".to_string()
            } else {
                format!("🗑️ Removed {} item(s)\n\n", removed)
            };
            out.push_str(&render::shopping(&household.shopping().await?));
            Ok(out)
        }
        ShoppingCommand::Clear => {
            let count = household.clear_shopping().await?;
            Ok(format!("🗑️ Cleared {} item(s)\n", count))
        }
    }
}

async fn debts<S: TableStore>(household: &Household<S>, command: &DebtsCommand) -> Result<String> {
    let limit = household.layout().history_limit;
    match command {
        DebtsCommand::Balances => Ok(render::balances(&household.debts().await?)),
        DebtsCommand::History => {
            let ledger = household.debts().await?;
            Ok(render::debt_history(ledger.recent_history(limit), household.roster()))
        }
        DebtsCommand::Pay {
            payer,
            amount,
            beneficiaries,
            everyone,
            reason,
        } => {
            let beneficiaries = if *everyone {
                household
                    .roster()
                    .members()
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect()
            } else {
                beneficiaries.clone()
            };
            let request = PaymentRequest {
                payer: payer.clone(),
                amount: Money::parse(amount)?,
                beneficiaries,
                reason: reason.clone(),
            };
            let transaction = household.record_payment(&request).await?;

            let mut out = format!("✅ {}\n\n", render::transaction(&transaction, household.roster()));
            out.push_str(&render::balances(&household.debts().await?));
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::core::household::TableLayout;
    use crate::domain::model::Roster;

    async fn household() -> Household<MemoryStore> {
        let roster = Roster::new(["Andrea", "Marco", "Martino"]).unwrap();
        Household::new(MemoryStore::new(), roster, TableLayout::default())
    }

    fn seeds() -> Vec<(String, u32)> {
        vec![("Dishes".to_string(), 2)]
    }

    #[tokio::test]
    async fn test_init_then_done() {
        let household = household().await;
        let out = execute(&household, &Command::Init, &seeds()).await.unwrap();
        assert_eq!(out, "✅ Created Chores, Shopping, Debts\n");

        let done = Command::Chores(ChoresCommand::Done {
            member: "marco".to_string(),
            chores: vec!["dishes".to_string()],
        });
        let out = execute(&household, &done, &seeds()).await.unwrap();
        assert!(out.starts_with("✅ Marco completed Dishes\n"));
        assert!(out.contains("🥇 1. Marco"));
    }

    #[tokio::test]
    async fn test_position_zero_is_rejected() {
        let household = household().await;
        let undo = Command::Chores(ChoresCommand::Undo { position: 0 });
        assert!(matches!(
            execute(&household, &undo, &[]).await,
            Err(HouseholdError::UnknownEntity { .. })
        ));
    }

    #[tokio::test]
    async fn test_pay_for_everyone() {
        let household = household().await;
        let pay = Command::Debts(DebtsCommand::Pay {
            payer: "Andrea".to_string(),
            amount: "10".to_string(),
            beneficiaries: vec![],
            everyone: true,
            reason: "Pizza".to_string(),
        });
        let out = execute(&household, &pay, &[]).await.unwrap();
        assert!(out.starts_with("✅ Andrea paid 10.00 for Everyone: Pizza\n"));

        let ledger = household.debts().await.unwrap();
        let cents: Vec<i64> = ledger.balances().iter().map(|b| b.amount.cents()).collect();
        assert_eq!(cents, vec![666, -333, -333]);
    }

    #[tokio::test]
    async fn test_pay_without_reason_is_incomplete() {
        let household = household().await;
        let pay = Command::Debts(DebtsCommand::Pay {
            payer: "Andrea".to_string(),
            amount: "10".to_string(),
            beneficiaries: vec!["Marco".to_string()],
            everyone: false,
            reason: String::new(),
        });
        assert!(matches!(
            execute(&household, &pay, &[]).await,
            Err(HouseholdError::IncompleteForm)
        ));
    }
}
