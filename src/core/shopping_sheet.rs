use crate::domain::shopping::ShoppingList;
use crate::domain::table::{Row, Table};

pub const ITEM: &str = "Item";

/// Blank rows are dropped here, which is what finally compacts removed items.
pub fn decode(table: &Table) -> ShoppingList {
    ShoppingList::new(
        table
            .rows
            .iter()
            .map(|row| row.get(ITEM))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn encode(list: &ShoppingList) -> Table {
    let mut table = Table::new([ITEM]);
    for entry in list.entries() {
        table.push(Row::new().with(ITEM, entry.clone()));
    }
    table
}
