use std::collections::HashMap;

use super::Value;

/// A single row of form data: a flat mapping from column name to [`Value`].
///
/// Not every column is present on every row. Lookups never fail; an absent
/// column is simply `None`, and every test degrades that to a falsy result.
#[derive(Debug, Clone, Default)]
pub struct Row {
    data: HashMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, consuming and returning the row for chaining.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value.into());
        self
    }

    /// Insert a column value (mutable reference version).
    pub fn insert(&mut self, column: &str, value: Value) {
        self.data.insert(column.to_owned(), value);
    }

    /// Look up a column value.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }
}
