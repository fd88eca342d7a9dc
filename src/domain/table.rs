use std::collections::HashMap;

/// One row of a named table, keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed cell value, `""` for missing columns.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(|v| v.trim()).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }

    pub fn is_blank_in(&self, columns: &[&str]) -> bool {
        columns.iter().all(|c| self.get(c).is_empty())
    }
}

/// A whole named table: ordered headers plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Row::is_blank)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Keeps only the named columns, in the given order.
    pub fn project(&self, columns: &[&str]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                cells: columns
                    .iter()
                    .filter_map(|c| row.cells.get(*c).map(|v| (c.to_string(), v.clone())))
                    .collect(),
            })
            .collect();

        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Cells in header order, `""` where a row has no value.
    pub fn records(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(|c| row.cells.get(c).map(String::as_str).unwrap_or(""))
                .collect()
        })
    }
}
