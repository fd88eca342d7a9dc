use crate::domain::table::{Row, Table};
use crate::utils::error::{HouseholdError, Result};

/// Parses CSV with a header line. Short rows are allowed; empty cells are
/// left out of the row.
pub fn read_csv(data: &[u8]) -> Result<Table> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Table::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table {
        columns,
        rows: Vec::new(),
    };
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (column, value) in table.columns.iter().zip(record.iter()) {
            if !value.trim().is_empty() {
                row.set(column.clone(), value.trim());
            }
        }
        table.rows.push(row);
    }
    Ok(table)
}

pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for record in table.records() {
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| HouseholdError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_cells_survive() {
        let mut table = Table::new(["Payer", "", "Reason"]);
        table.push(
            Row::new()
                .with("Payer", "Andrea")
                .with("Reason", "Pizza, \"big\" one"),
        );

        let bytes = write_csv(&table).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Payer,,Reason\n"));
        assert!(text.contains("\"Pizza, \"\"big\"\" one\""));

        let parsed = read_csv(&bytes).unwrap();
        assert_eq!(parsed.columns, vec!["Payer", "", "Reason"]);
        assert_eq!(parsed.rows[0].get("Reason"), "Pizza, \"big\" one");
        assert_eq!(parsed.rows[0].cells.len(), 2);
    }

    #[test]
    fn test_short_rows_and_empty_input() {
        let parsed = read_csv(b"Item,Note\nMilk\nEggs,fresh\n").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get("Item"), "Milk");
        assert_eq!(parsed.rows[1].get("Note"), "fresh");

        assert!(read_csv(b"  \n").unwrap().columns.is_empty());
    }
}
