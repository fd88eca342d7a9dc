//! Plain-text views printed by the command-line shell.

use crate::domain::chores::{ChoreCompletionEvent, ChoreLedger, Standing};
use crate::domain::debts::{DebtLedger, DebtTransaction};
use crate::domain::model::{format_timestamp, Roster, LIST_SEPARATOR};
use crate::domain::shopping::ShoppingList;
use std::fmt::Write;

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0)
}

pub fn standings(standings: &[Standing]) -> String {
    let width = name_width(standings.iter().map(|s| s.member.name()));
    let mut out = String::new();
    for s in standings {
        let _ = writeln!(
            out,
            "{} {}. {:<width$}  {} pts",
            s.medal,
            s.rank,
            s.member.name(),
            s.score,
            width = width
        );
    }
    out
}

pub fn chore_history(history: &[ChoreCompletionEvent]) -> String {
    if history.is_empty() {
        return "No chores recorded yet\n".to_string();
    }
    let mut out = String::new();
    for (i, event) in history.iter().enumerate() {
        let chores = if event.chores.is_empty() {
            "-".to_string()
        } else {
            event.chores.join(LIST_SEPARATOR)
        };
        let _ = writeln!(
            out,
            "{}. {}  {}: {}",
            i + 1,
            format_timestamp(&event.timestamp),
            event.member,
            chores
        );
    }
    out
}

/// Chore grid: one row per chore, one column per member.
pub fn chore_table(ledger: &ChoreLedger, roster: &Roster) -> String {
    let chore_width = name_width(ledger.chores().iter().map(|c| c.name.as_str())).max(5);
    let mut out = String::new();

    let _ = write!(out, "{:<width$}  {:>6}", "Chore", "Points", width = chore_width);
    for member in roster.members() {
        let _ = write!(out, "  {:>w$}", member.name(), w = member.name().chars().count());
    }
    out.push('\n');

    for chore in ledger.chores() {
        let _ = write!(
            out,
            "{:<width$}  {:>6}",
            chore.name,
            chore.points,
            width = chore_width
        );
        for member in roster.members() {
            let _ = write!(
                out,
                "  {:>w$}",
                chore.completions_by(member),
                w = member.name().chars().count()
            );
        }
        out.push('\n');
    }
    out
}

pub fn shopping(list: &ShoppingList) -> String {
    let items = list.list();
    if items.is_empty() {
        return "The shopping list is empty\n".to_string();
    }
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", i + 1, item);
    }
    out
}

pub fn balances(ledger: &DebtLedger) -> String {
    let width = name_width(ledger.balances().iter().map(|b| b.member.name()));
    let mut out = String::new();
    for balance in ledger.balances() {
        let _ = writeln!(
            out,
            "{:<width$}  {:>10}",
            balance.member.name(),
            balance.amount.signed(),
            width = width
        );
    }
    out
}

pub fn transaction(transaction: &DebtTransaction, roster: &Roster) -> String {
    format!(
        "{} paid {} for {}: {}",
        transaction.payer,
        transaction.amount,
        transaction.beneficiaries_label(roster),
        transaction.reason
    )
}

pub fn debt_history(history: &[DebtTransaction], roster: &Roster) -> String {
    if history.is_empty() {
        return "No payments recorded yet\n".to_string();
    }
    let mut out = String::new();
    for tx in history {
        let _ = writeln!(
            out,
            "{}  {}",
            format_timestamp(&tx.timestamp),
            transaction(tx, roster)
        );
    }
    out
}
