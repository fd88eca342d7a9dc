//! `Chores` table layout: the chore grid on the left, a blank separator
//! column, then the completion history on the right.

use crate::domain::chores::{Chore, ChoreCompletionEvent, ChoreLedger};
use crate::domain::model::{format_timestamp, parse_timestamp, split_list, Roster, LIST_SEPARATOR};
use crate::domain::table::{Row, Table};
use crate::utils::error::{HouseholdError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const CHORE: &str = "Chore";
pub const POINTS: &str = "Points";
pub const SEPARATOR: &str = "";
pub const MEMBER: &str = "Member";
pub const WHEN: &str = "When";
pub const CHORES: &str = "Chores";

pub fn columns(roster: &Roster) -> Vec<String> {
    let mut columns = vec![CHORE.to_string(), POINTS.to_string()];
    columns.extend(roster.members().iter().map(|m| m.name().to_string()));
    columns.extend([SEPARATOR, MEMBER, WHEN, CHORES].map(String::from));
    columns
}

/// Whole non-negative number, tolerating sheet exports such as `5.0` or `5,0`.
fn parse_whole(raw: &str) -> Option<u32> {
    let value = Decimal::from_str(&raw.replace(',', ".")).ok()?;
    if value.fract().is_zero() {
        value.to_u32()
    } else {
        None
    }
}

fn parse_points(table: &str, chore: &str, raw: &str) -> Result<u32> {
    parse_whole(raw).ok_or_else(|| {
        HouseholdError::table_format(
            table,
            format!("chore '{}' must be worth a whole number of points, got '{}'", chore, raw),
        )
    })
}

fn parse_count(table: &str, chore: &str, member: &str, raw: &str) -> Result<u32> {
    if raw.is_empty() {
        return Ok(0);
    }
    parse_whole(raw).ok_or_else(|| {
        HouseholdError::table_format(
            table,
            format!("chore '{}' has count '{}' for {}", chore, raw, member),
        )
    })
}

pub fn decode(name: &str, table: &Table, roster: &Roster) -> Result<ChoreLedger> {
    if table.is_empty() {
        return Ok(ChoreLedger::default());
    }
    for required in [CHORE, POINTS] {
        if !table.has_column(required) {
            return Err(HouseholdError::table_format(
                name,
                format!("missing '{}' column", required),
            ));
        }
    }

    let mut chores: Vec<Chore> = Vec::new();
    let mut history = Vec::new();

    for row in &table.rows {
        let chore_name = row.get(CHORE);
        if !chore_name.is_empty() {
            if chores.iter().any(|c| c.name == chore_name) {
                return Err(HouseholdError::table_format(
                    name,
                    format!("chore '{}' is listed twice", chore_name),
                ));
            }
            let mut chore = Chore::new(chore_name, parse_points(name, chore_name, row.get(POINTS))?);
            for member in roster.members() {
                let count = parse_count(name, chore_name, member.name(), row.get(member.name()))?;
                if count > 0 {
                    chore.completions.insert(member.clone(), count);
                }
            }
            chores.push(chore);
        }

        if row.is_blank_in(&[MEMBER, WHEN, CHORES]) {
            continue;
        }
        let member = roster.resolve(row.get(MEMBER)).map_err(|_| {
            HouseholdError::table_format(
                name,
                format!("history names unknown member '{}'", row.get(MEMBER)),
            )
        })?;
        let timestamp = parse_timestamp(row.get(WHEN)).ok_or_else(|| {
            HouseholdError::table_format(name, format!("unreadable time '{}'", row.get(WHEN)))
        })?;
        history.push(ChoreCompletionEvent {
            member,
            timestamp,
            chores: split_list(row.get(CHORES)),
        });
    }

    tracing::debug!(
        table = name,
        chores = chores.len(),
        events = history.len(),
        "Decoded chore table"
    );
    Ok(ChoreLedger::new(chores, history))
}

pub fn encode(ledger: &ChoreLedger, roster: &Roster) -> Table {
    let mut table = Table::new(columns(roster));
    let chores = ledger.chores();
    let history = ledger.history();

    for i in 0..chores.len().max(history.len()) {
        let mut row = Row::new();
        if let Some(chore) = chores.get(i) {
            row.set(CHORE, chore.name.clone());
            row.set(POINTS, chore.points.to_string());
            for member in roster.members() {
                row.set(member.name(), chore.completions_by(member).to_string());
            }
        }
        if let Some(event) = history.get(i) {
            row.set(MEMBER, event.member.name());
            row.set(WHEN, format_timestamp(&event.timestamp));
            row.set(CHORES, event.chores.join(LIST_SEPARATOR));
        }
        table.push(row);
    }
    table
}

/// Chore grid for a fresh household, all counts at zero.
pub fn seed(chores: &[(String, u32)], roster: &Roster) -> Table {
    let ledger = ChoreLedger::new(
        chores
            .iter()
            .map(|(name, points)| Chore::new(name.clone(), *points))
            .collect(),
        Vec::new(),
    );
    encode(&ledger, roster)
}
