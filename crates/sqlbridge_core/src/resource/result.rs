//! Materialized query results.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

/// A materialized tabular result.
///
/// Column names are kept in display order and need not be unique. Rows are
/// not required to be rectangular: a row may carry fewer cells than there
/// are columns, and accessors treat the missing cells as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// Creates a result from column names and rows.
    ///
    /// ```rust
    /// use sqlbridge_core::ResultSet;
    ///
    /// let rs = ResultSet::new(["id", "name"], [["1", "alice"], ["2", "bob"]]);
    /// assert_eq!(rs.row_count(), 2);
    /// assert_eq!(rs.cell(1, 1), Some("bob"));
    /// ```
    pub fn new<C, R, S>(
        columns: impl IntoIterator<Item = C>,
        rows: impl IntoIterator<Item = R>,
    ) -> Self
    where
        C: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Creates a result with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a result with columns but no rows.
    pub fn with_columns<C: Into<String>>(columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if every row has exactly one cell per column.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.columns.len())
    }

    /// Returns the cell at `row`, `col`.
    ///
    /// Returns `None` when either index is outside the result or when the
    /// row is too short to hold column `col`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        if col >= self.columns.len() {
            return None;
        }
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Converts every row into an ordered column-to-value mapping.
    ///
    /// Short rows omit their trailing columns rather than padding them.
    pub fn to_mappings(&self) -> Vec<RowMap> {
        self.rows
            .iter()
            .map(|row| {
                let mut map = RowMap::with_capacity(row.len().min(self.columns.len()));
                for (name, value) in self.columns.iter().zip(row) {
                    map.insert(name.clone(), value.clone());
                }
                map
            })
            .collect()
    }
}

/// One row as an insertion-ordered mapping from column name to value.
///
/// Inserting a key that already exists keeps its original position and
/// replaces the value, so duplicate column names resolve to the last cell.
/// Lookups go through a key index, so building a wide row stays linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl RowMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: String, value: String) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for RowMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RowMap::new();
        for (k, v) in iter {
            map.insert(k.into(), v.into());
        }
        map
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
