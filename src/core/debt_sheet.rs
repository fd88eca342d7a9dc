//! `Debts` table layout: one `[Member, Balance]` row per roster member at the
//! top left, a blank separator column, then the transaction history.

use crate::domain::debts::{Balance, DebtLedger, DebtTransaction};
use crate::domain::model::{format_timestamp, parse_timestamp, split_list, Roster, LIST_SEPARATOR};
use crate::domain::money::Money;
use crate::domain::table::{Row, Table};
use crate::utils::error::{HouseholdError, Result};

pub const MEMBER: &str = "Member";
pub const BALANCE: &str = "Balance";
pub const SEPARATOR: &str = "";
pub const PAYER: &str = "Payer";
pub const AMOUNT: &str = "Amount";
pub const BENEFICIARIES: &str = "Beneficiaries";
pub const WHEN: &str = "When";
pub const REASON: &str = "Reason";

const HISTORY_COLUMNS: [&str; 5] = [PAYER, AMOUNT, BENEFICIARIES, WHEN, REASON];

pub fn columns() -> Vec<String> {
    [MEMBER, BALANCE, SEPARATOR]
        .into_iter()
        .chain(HISTORY_COLUMNS)
        .map(String::from)
        .collect()
}

fn parse_money(table: &str, what: &str, raw: &str) -> Result<Money> {
    if raw.is_empty() {
        return Ok(Money::ZERO);
    }
    Money::parse(raw)
        .map_err(|_| HouseholdError::table_format(table, format!("{} '{}' is not an amount", what, raw)))
}

/// Balances come from the first roster-size rows only.
pub fn decode_balances(name: &str, table: &Table, roster: &Roster) -> Result<Vec<Balance>> {
    let mut balances = Vec::new();
    for row in table.rows.iter().take(roster.len()) {
        let member_name = row.get(MEMBER);
        if member_name.is_empty() {
            continue;
        }
        let member = roster.resolve(member_name).map_err(|_| {
            HouseholdError::table_format(name, format!("balance for unknown member '{}'", member_name))
        })?;
        let amount = parse_money(name, "balance", row.get(BALANCE))?;
        balances.push(Balance { member, amount });
    }
    Ok(balances)
}

fn decode_transaction(name: &str, row: &Row, roster: &Roster) -> Result<DebtTransaction> {
    let payer = roster.resolve(row.get(PAYER)).map_err(|_| {
        HouseholdError::table_format(name, format!("payment by unknown member '{}'", row.get(PAYER)))
    })?;
    let beneficiaries = roster
        .resolve_set(split_list(row.get(BENEFICIARIES)).as_slice())
        .map_err(|e| HouseholdError::table_format(name, e.to_string()))?;
    let timestamp = parse_timestamp(row.get(WHEN)).ok_or_else(|| {
        HouseholdError::table_format(name, format!("unreadable time '{}'", row.get(WHEN)))
    })?;

    Ok(DebtTransaction {
        payer,
        amount: parse_money(name, "amount", row.get(AMOUNT))?,
        beneficiaries,
        timestamp,
        reason: row.get(REASON).to_string(),
    })
}

pub fn decode(name: &str, table: &Table, roster: &Roster) -> Result<DebtLedger> {
    if table.is_empty() {
        return Ok(DebtLedger::empty(roster));
    }
    if !table.has_column(MEMBER) || !table.has_column(BALANCE) {
        return Err(HouseholdError::table_format(
            name,
            format!("missing '{}' or '{}' column", MEMBER, BALANCE),
        ));
    }

    let balances = decode_balances(name, table, roster)?;
    let mut history = Vec::new();
    for row in &table.rows {
        if row.is_blank_in(&HISTORY_COLUMNS) {
            continue;
        }
        if row.get(PAYER).is_empty() {
            tracing::warn!(table = name, "Skipping history row without a payer");
            continue;
        }
        history.push(decode_transaction(name, row, roster)?);
    }

    let ledger = DebtLedger::new(roster, balances, history);
    if !ledger.is_balanced() {
        tracing::warn!(
            table = name,
            total = %ledger.total(),
            "Stored balances do not sum to zero"
        );
    }
    Ok(ledger)
}

pub fn encode(ledger: &DebtLedger) -> Table {
    let mut table = Table::new(columns());
    let balances = ledger.balances();
    let history = ledger.history();

    for i in 0..balances.len().max(history.len()) {
        let mut row = Row::new();
        if let Some(balance) = balances.get(i) {
            row.set(MEMBER, balance.member.name());
            row.set(BALANCE, balance.amount.to_string());
        }
        if let Some(tx) = history.get(i) {
            row.set(PAYER, tx.payer.name());
            row.set(AMOUNT, tx.amount.to_string());
            row.set(
                BENEFICIARIES,
                tx.beneficiaries
                    .iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR),
            );
            row.set(WHEN, format_timestamp(&tx.timestamp));
            row.set(REASON, tx.reason.clone());
        }
        table.push(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::debts::PaymentRequest;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(["Andrea", "Marco", "Martino"]).unwrap()
    }

    fn sheet() -> Table {
        let mut table = Table::new(columns());
        table.push(
            Row::new()
                .with(MEMBER, "Andrea")
                .with(BALANCE, "30")
                .with(PAYER, "Andrea")
                .with(AMOUNT, "30,00")
                .with(BENEFICIARIES, "Marco, Martino")
                .with(WHEN, "02/06/2024, 20:30")
                .with(REASON, "Groceries"),
        );
        table.push(Row::new().with(MEMBER, "Marco").with(BALANCE, "-15"));
        table.push(Row::new().with(MEMBER, "Martino").with(BALANCE, "-15.00"));
        // a name below the balance block is not a balance
        table.push(Row::new().with(MEMBER, "Notes").with(BALANCE, "oops"));
        table
    }

    #[test]
    fn test_decode_balances_and_history() {
        let roster = roster();
        let ledger = decode("Debts", &sheet(), &roster).unwrap();

        let amounts: Vec<i64> = ledger.balances().iter().map(|b| b.amount.cents()).collect();
        assert_eq!(amounts, vec![3000, -1500, -1500]);
        assert!(ledger.is_balanced());

        assert_eq!(ledger.history().len(), 1);
        let tx = &ledger.history()[0];
        assert_eq!(tx.amount, Money::from_cents(3000));
        assert_eq!(tx.beneficiaries.len(), 2);
        assert_eq!(tx.reason, "Groceries");
    }

    #[test]
    fn test_encode_then_decode_after_payment() {
        let roster = roster();
        let mut ledger = decode("Debts", &sheet(), &roster).unwrap();
        let ts = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ledger
            .record_payment(
                &roster,
                &PaymentRequest {
                    payer: "Martino".to_string(),
                    amount: Money::from_cents(1000),
                    beneficiaries: vec!["Andrea".into(), "Marco".into(), "Martino".into()],
                    reason: "Pizza, drinks".to_string(),
                },
                ts,
            )
            .unwrap();

        let table = encode(&ledger);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].get(BENEFICIARIES), "Andrea, Marco, Martino");
        assert_eq!(table.rows[0].get(REASON), "Pizza, drinks");
        assert_eq!(table.rows[1].get(BALANCE), "-18.33");
        assert_eq!(table.rows[2].get(BALANCE), "-8.33");

        let reread = decode("Debts", &table, &roster).unwrap();
        assert_eq!(reread, ledger);
    }

    #[test]
    fn test_decode_rejects_unknown_balance_member() {
        let mut table = sheet();
        table.rows[1].set(MEMBER, "Giulia");
        assert!(matches!(
            decode("Debts", &table, &roster()),
            Err(HouseholdError::TableFormatError { .. })
        ));
    }

    #[test]
    fn test_decode_empty_table_starts_at_zero() {
        let ledger = decode("Debts", &Table::default(), &roster()).unwrap();
        assert_eq!(ledger.balances().len(), 3);
        assert_eq!(ledger.total(), Money::ZERO);
    }
}
