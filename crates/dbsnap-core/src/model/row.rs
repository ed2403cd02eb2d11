use crate::errors::{DbSnapError, Result};
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Column and primary-key names shared by every row of one snapshot
#[derive(Debug, PartialEq, Eq)]
pub struct RowLayout {
    source_name: String,
    column_names: Vec<String>,
    primary_key_names: Vec<String>,
    /// `None` when no key is declared or a declared key column is absent.
    primary_key_indexes: Option<Vec<usize>>,
}

impl RowLayout {
    pub fn new(
        source_name: impl Into<String>,
        column_names: Vec<String>,
        primary_key_names: Vec<String>,
    ) -> Self {
        let primary_key_indexes = if primary_key_names.is_empty() {
            None
        } else {
            primary_key_names
                .iter()
                .map(|pk| position_of(&column_names, pk))
                .collect::<Option<Vec<usize>>>()
        };
        Self {
            source_name: source_name.into(),
            column_names,
            primary_key_names,
            primary_key_indexes,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn primary_key_names(&self) -> &[String] {
        &self.primary_key_names
    }

    pub fn primary_key_indexes(&self) -> Option<&[usize]> {
        self.primary_key_indexes.as_deref()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        position_of(&self.column_names, column)
    }
}

pub(crate) fn position_of(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n.eq_ignore_ascii_case(name))
}

/// One row of a snapshot: a value per column, in column order
#[derive(Debug, Clone)]
pub struct Row {
    layout: Arc<RowLayout>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(layout: Arc<RowLayout>, values: Vec<Value>) -> Self {
        Self { layout, values }
    }

    pub(crate) fn relayout(self, layout: Arc<RowLayout>) -> Self {
        Self {
            layout,
            values: self.values,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        self.layout.column_names()
    }

    pub fn primary_key_names(&self) -> &[String] {
        self.layout.primary_key_names()
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, len)`.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(DbSnapError::IndexOutOfRange {
            index,
            size: self.values.len(),
        })
    }

    /// Look a value up by column name, case-insensitively.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for an unknown name.
    pub fn value_named(&self, column: &str) -> Result<&Value> {
        self.layout
            .index_of(column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| DbSnapError::ColumnNotFound {
                table: self.layout.source_name().to_string(),
                column: column.to_string(),
            })
    }

    /// The primary-key tuple, in key order.
    ///
    /// `None` when the source has no usable key.
    pub fn primary_key_values(&self) -> Option<Vec<&Value>> {
        self.layout
            .primary_key_indexes()
            .map(|indexes| indexes.iter().filter_map(|i| self.values.get(*i)).collect())
    }

    /// Compare the row to expected values, column by column.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` when the lengths differ, `TypeMismatch` (with the
    /// column index) when a value cannot be compared with its expectation.
    pub fn has_values(&self, expected: &[Value]) -> Result<bool> {
        super::column::first_mismatch(&self.values, expected).map(|m| m.is_none())
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.column_names() == other.column_names()
    }
}

impl Eq for Row {}

/// Serialized as an object keyed by column name, in column order
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.column_names().iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
