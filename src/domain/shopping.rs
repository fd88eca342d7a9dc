use crate::utils::error::{EntityKind, HouseholdError, Result};

/// Pending shopping items, newest first.
///
/// Removal blanks entries in place; blanks disappear the next time the list
/// is read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    entries: Vec<String>,
}

impl ShoppingList {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Raw entries including blanked ones, for persisting.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn list(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    pub fn add(&mut self, item: &str) -> Result<()> {
        let item = item.trim();
        if item.is_empty() {
            return Err(HouseholdError::EmptyInput {
                field: "shopping item".to_string(),
            });
        }
        self.entries.insert(0, item.to_string());
        Ok(())
    }

    /// Blanks every entry matching one of `items`. Returns how many entries
    /// were blanked.
    pub fn remove_many<S: AsRef<str>>(&mut self, items: &[S]) -> usize {
        let mut removed = 0;
        for entry in self.entries.iter_mut() {
            let text = entry.trim();
            if !text.is_empty() && items.iter().any(|i| i.as_ref().trim() == text) {
                entry.clear();
                removed += 1;
            }
        }
        removed
    }

    /// Blanks the entries at the given positions of `list()`, so one copy of
    /// a duplicated item can be removed alone. Any out of range position
    /// rejects the whole call.
    pub fn remove_positions(&mut self, positions: &[usize]) -> Result<Vec<String>> {
        let visible: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.trim().is_empty())
            .map(|(idx, _)| idx)
            .collect();

        if let Some(bad) = positions.iter().find(|p| **p >= visible.len()) {
            return Err(HouseholdError::UnknownEntity {
                kind: EntityKind::ShoppingItem,
                name: format!("#{}", bad + 1),
            });
        }

        let mut removed = Vec::new();
        for &position in positions {
            let entry = &mut self.entries[visible[position]];
            if !entry.is_empty() {
                removed.push(entry.trim().to_string());
                entry.clear();
            }
        }
        Ok(removed)
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.clear();
        }
    }
}
